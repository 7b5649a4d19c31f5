//! Hand-off to the external bulk data engine.
//!
//! The planner never rewrites data itself. It resolves a [`CompactionJob`]
//! (inputs, source format, partition count, output location, output format and
//! the compression properties the engine consults) and submits it to a
//! [`BulkEngine`]. [`ManifestEngine`] writes the job as JSON for a launcher to
//! pick up.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::common::{path_str, CompressionCodec, SerializationFormat};
use crate::error::{CompactionError, Result};
use crate::plan::CompactionPlan;

pub const SHOULD_COMPRESS_OUTPUT: &str = "spark.hadoop.mapred.output.compress";
pub const OUTPUT_COMPRESSION_CODEC: &str = "spark.hadoop.mapred.output.compression.codec";
pub const COMPRESSION_TYPE: &str = "spark.hadoop.mapred.output.compression.type";
pub const PARQUET_COMPRESSION_CODEC: &str = "spark.sql.parquet.compression.codec";
pub const SPARK_AVRO_COMPRESSION_CODEC: &str = "spark.sql.avro.compression.codec";
pub const AVRO_COMPRESSION_CODEC: &str = "avro.output.codec";

const BLOCK: &str = "BLOCK";

/// The compression settings the engine reads when writing output.
///
/// `None` fields are left unset so the engine's own defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputCompressionProperties {
    pub compress_output: Option<bool>,
    pub codec_class: Option<String>,
    pub compression_type: Option<String>,
    pub parquet_codec: Option<String>,
    pub spark_avro_codec: Option<String>,
    pub avro_codec: Option<String>,
}

impl OutputCompressionProperties {
    pub fn for_codec(codec: CompressionCodec) -> Self {
        let compressed = |class: &str, name: &str| Self {
            compress_output: Some(true),
            codec_class: Some(format!("org.apache.hadoop.io.compress.{}", class)),
            compression_type: Some(BLOCK.to_string()),
            parquet_codec: Some(name.to_string()),
            spark_avro_codec: Some(name.to_string()),
            avro_codec: Some(name.to_string()),
        };
        match codec {
            CompressionCodec::None => Self {
                compress_output: Some(false),
                parquet_codec: Some("uncompressed".to_string()),
                ..Self::default()
            },
            CompressionCodec::Snappy => compressed("SnappyCodec", "snappy"),
            CompressionCodec::Gzip => compressed("GzipCodec", "gzip"),
            CompressionCodec::Bzip2 => compressed("BZip2Codec", "bzip2"),
            // Never a legal output codec; nothing is set.
            CompressionCodec::Lzo => Self::default(),
        }
    }

    /// Property-name to value map, as the engine's configuration expects it.
    pub fn to_properties(&self) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        let mut set = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                props.insert(key.to_string(), v);
            }
        };
        set(SHOULD_COMPRESS_OUTPUT, self.compress_output.map(|b| b.to_string()));
        set(OUTPUT_COMPRESSION_CODEC, self.codec_class.clone());
        set(COMPRESSION_TYPE, self.compression_type.clone());
        set(PARQUET_COMPRESSION_CODEC, self.parquet_codec.clone());
        set(SPARK_AVRO_COMPRESSION_CODEC, self.spark_avro_codec.clone());
        set(AVRO_COMPRESSION_CODEC, self.avro_codec.clone());
        props
    }
}

/// Everything the bulk engine needs to run one compaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompactionJob {
    pub app_name: String,
    /// Comma-joined concrete input files.
    pub input_paths: String,
    pub source_format: String,
    pub partitions: u64,
    pub output_path: String,
    pub output_serialization: SerializationFormat,
    pub output_compression: CompressionCodec,
    pub properties: BTreeMap<String, String>,
}

impl CompactionJob {
    pub fn from_plan(app_name: &str, plan: &CompactionPlan) -> Self {
        Self {
            app_name: app_name.to_string(),
            input_paths: plan.input_paths.clone(),
            source_format: plan.input_serialization.source_format_tag().to_string(),
            partitions: plan.split_size,
            output_path: path_str(&plan.output_path),
            output_serialization: plan.output_serialization,
            output_compression: plan.output_compression,
            properties: OutputCompressionProperties::for_codec(plan.output_compression).to_properties(),
        }
    }
}

/// Sink for resolved compaction jobs.
pub trait BulkEngine {
    fn submit(&self, job: &CompactionJob) -> Result<()>;
}

/// Writes the job description as pretty JSON to a file or to stdout.
#[derive(Debug, Clone, Default)]
pub struct ManifestEngine {
    target: Option<PathBuf>,
}

impl ManifestEngine {
    pub fn new(target: Option<PathBuf>) -> Self {
        Self { target }
    }

    fn write_to<W: Write>(job: &CompactionJob, mut out: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut out, job)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}

impl BulkEngine for ManifestEngine {
    fn submit(&self, job: &CompactionJob) -> Result<()> {
        match &self.target {
            Some(path) => {
                let file = File::create(path).map_err(|e| CompactionError::fs(path, e))?;
                Self::write_to(job, file)?;
                info!(manifest = %path.display(), partitions = job.partitions, "wrote compaction job manifest");
            }
            None => Self::write_to(job, io::stdout().lock())?,
        }
        Ok(())
    }
}
