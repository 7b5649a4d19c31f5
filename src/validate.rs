//! Input/output format validation.
//!
//! Raw values come straight from the command line. Missing input values fall
//! back to what the detector found; missing output values fall back to the
//! resolved input values ("same format out as in").

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::{CompressionCodec, SerializationFormat};
use crate::detect::Detection;
use crate::error::{CompactionError, Result};

/// Codecs that may be named explicitly. Lzo is recognized but not legal.
pub const LEGAL_COMPRESSIONS: [CompressionCodec; 4] = [
    CompressionCodec::None,
    CompressionCodec::Snappy,
    CompressionCodec::Gzip,
    CompressionCodec::Bzip2,
];

/// Output combinations that pass the legal-set checks but that the write
/// path cannot produce.
const UNWRITABLE_OUTPUTS: [(SerializationFormat, CompressionCodec); 2] = [
    (SerializationFormat::Parquet, CompressionCodec::Bzip2),
    (SerializationFormat::Avro, CompressionCodec::Bzip2),
];

/// Optional user choices, as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRequest {
    pub input_serialization: Option<String>,
    pub input_compression: Option<String>,
    pub output_serialization: Option<String>,
    pub output_compression: Option<String>,
}

/// Resolved and validated formats for both sides of the compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidatedFormats {
    pub input_serialization: SerializationFormat,
    pub input_compression: CompressionCodec,
    pub output_serialization: SerializationFormat,
    pub output_compression: CompressionCodec,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PlanValidator;

impl PlanValidator {
    /// Checks input compression, input serialization, output compression and
    /// output serialization in that order, stopping at the first violation.
    pub fn validate(&self, request: &FormatRequest, detection: &Detection) -> Result<ValidatedFormats> {
        let input_compression = legal_compression(
            request.input_compression.as_deref(),
            detection.compression,
            "Invalid input compression format specified!",
        )?;
        let input_serialization = legal_serialization(
            request.input_serialization.as_deref(),
            detection.serialization,
            "Invalid input serialization format specified!",
        )?;
        let output_compression = legal_compression(
            request.output_compression.as_deref(),
            input_compression,
            "Invalid output compression format specified!",
        )?;
        let output_serialization = legal_serialization(
            request.output_serialization.as_deref(),
            input_serialization,
            "Invalid output serialization format specified!",
        )?;

        check_writable(output_serialization, output_compression)?;

        Ok(ValidatedFormats {
            input_serialization,
            input_compression,
            output_serialization,
            output_compression,
        })
    }
}

fn legal_compression(raw: Option<&str>, fallback: CompressionCodec, message: &str) -> Result<CompressionCodec> {
    let codec = match raw {
        Some(value) => value.parse::<CompressionCodec>().map_err(|e| {
            warn!(value, error = %e, "rejected compression");
            CompactionError::invalid_format(message)
        })?,
        None => fallback,
    };
    if LEGAL_COMPRESSIONS.contains(&codec) {
        Ok(codec)
    } else {
        Err(CompactionError::invalid_format(message))
    }
}

/// Every [`SerializationFormat`] variant is legal, so parsing is the whole check.
fn legal_serialization(
    raw: Option<&str>,
    fallback: SerializationFormat,
    message: &str,
) -> Result<SerializationFormat> {
    match raw {
        Some(value) => value.parse::<SerializationFormat>().map_err(|e| {
            warn!(value, error = %e, "rejected serialization");
            CompactionError::invalid_format(message)
        }),
        None => Ok(fallback),
    }
}

fn check_writable(serialization: SerializationFormat, compression: CompressionCodec) -> Result<()> {
    if UNWRITABLE_OUTPUTS.contains(&(serialization, compression)) {
        return Err(CompactionError::UnsupportedCombination { serialization, compression });
    }
    Ok(())
}
