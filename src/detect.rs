//! # Format & Compression Detection
//!
//! Infers the single serialization format and compression codec that
//! characterize an input corpus, from file names alone.
//!
//! - **Serialization**: the first non-hidden entry ending in `.parquet` or `.avro`
//!   decides. Anything else is treated as plain text.
//! - **Compression**: each entry's own serialization suffix is stripped and the
//!   remainder is matched against [`CodecExtensions`]. The first recognized codec
//!   decides for the whole corpus.

use std::path::Path;

use tracing::{debug, info};

use crate::common::{path_str, CompressionCodec, FileEntry, SerializationFormat};
use crate::error::{CompactionError, Result};
use crate::fsx::FileSystem;

/// Suffixes that identify a structured serialization format, in match order.
const SERIALIZATION_EXTENSIONS: [SerializationFormat; 2] =
    [SerializationFormat::Parquet, SerializationFormat::Avro];

/// File-extension rules used to sniff a codec from a path.
#[derive(Debug, Clone)]
pub struct CodecExtensions {
    rules: Vec<(String, CompressionCodec)>,
}

impl CodecExtensions {
    pub fn new(rules: Vec<(String, CompressionCodec)>) -> Self {
        Self { rules }
    }

    /// Adds a rule. Later rules never shadow earlier ones.
    pub fn with_rule(mut self, suffix: impl Into<String>, codec: CompressionCodec) -> Self {
        self.rules.push((suffix.into(), codec));
        self
    }

    pub fn codec_for(&self, path: &str) -> Option<CompressionCodec> {
        self.rules
            .iter()
            .find(|(suffix, _)| path.ends_with(suffix.as_str()))
            .map(|&(_, codec)| codec)
    }
}

impl Default for CodecExtensions {
    /// Only codecs that have a legal name are sniffed by default.
    fn default() -> Self {
        Self::new(vec![
            (".bz2".to_string(), CompressionCodec::Bzip2),
            (".gz".to_string(), CompressionCodec::Gzip),
            (".snappy".to_string(), CompressionCodec::Snappy),
        ])
    }
}

/// What the detector found, together with the entries it inspected.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub serialization: SerializationFormat,
    pub compression: CompressionCodec,
    pub entries: Vec<FileEntry>,
}

impl Detection {
    pub fn data_entries(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter().filter(|e| !e.is_hidden())
    }

    /// Comma-joined non-hidden paths, the input list the bulk engine reads.
    pub fn resolved_input_paths(&self) -> String {
        self.data_entries()
            .map(|e| path_str(&e.path))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Resolves an input location into the entries that should be sniffed.
///
/// A location that resolves to a single directory is expanded into its children:
/// a bare directory is not itself a data file.
pub fn expand_input<F: FileSystem>(fs: &F, input: &Path) -> Result<Vec<FileEntry>> {
    let entries = fs.status(input)?;
    if entries.is_empty() {
        return Err(CompactionError::EmptyInput { path: input.to_path_buf() });
    }
    if entries.len() == 1 && entries[0].is_dir {
        return fs.list(&entries[0].path);
    }
    Ok(entries)
}

pub struct FormatDetector<'a> {
    codecs: &'a CodecExtensions,
}

impl<'a> FormatDetector<'a> {
    pub fn new(codecs: &'a CodecExtensions) -> Self {
        Self { codecs }
    }

    pub fn detect(&self, entries: &[FileEntry]) -> Detection {
        let data: Vec<&FileEntry> = entries.iter().filter(|e| !e.is_hidden()).collect();

        let serialization = data
            .iter()
            .find_map(|e| serialization_of(&path_str(&e.path)))
            .unwrap_or_default();

        let compression = data
            .iter()
            .find_map(|e| {
                let full = path_str(&e.path);
                let stripped = strip_serialization(&full);
                let codec = self.codecs.codec_for(stripped);
                debug!(path = %full, sniffed = stripped, codec = ?codec, "codec sniff");
                codec
            })
            .unwrap_or_default();

        info!(
            entries = entries.len(),
            data_entries = data.len(),
            %serialization,
            %compression,
            "detected input format"
        );

        Detection { serialization, compression, entries: entries.to_vec() }
    }
}

fn serialization_of(path: &str) -> Option<SerializationFormat> {
    SERIALIZATION_EXTENSIONS
        .into_iter()
        .find(|format| format.extension().is_some_and(|ext| path.ends_with(ext)))
}

/// The path with its serialization suffix removed, or the full path if it has none.
fn strip_serialization(path: &str) -> &str {
    SERIALIZATION_EXTENSIONS
        .iter()
        .filter_map(|format| format.extension())
        .find_map(|ext| path.strip_suffix(ext))
        .unwrap_or(path)
}
