//! Common types shared by the detector, estimator, validator and sizing engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A single entry returned by the listing service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size_on_disk: u64,
    pub is_dir: bool,
}

impl FileEntry {
    pub fn file(path: impl Into<PathBuf>, size_on_disk: u64) -> Self {
        Self { path: path.into(), size_on_disk, is_dir: false }
    }

    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), size_on_disk: 0, is_dir: true }
    }

    /// Final path component, or the whole path when it has none.
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_else(|| self.path.to_str().unwrap_or(""))
    }

    /// Hidden entries (`_SUCCESS`, `.crc` files, ...) never count as data.
    pub fn is_hidden(&self) -> bool {
        is_hidden_name(self.name())
    }
}

pub(crate) fn is_hidden_name(name: &str) -> bool {
    name.starts_with('_') || name.starts_with('.')
}

pub(crate) fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// On-disk record encoding of the corpus.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SerializationFormat {
    Avro,
    Parquet,
    #[default]
    Text,
}

impl SerializationFormat {
    pub const ALL: [SerializationFormat; 3] =
        [SerializationFormat::Avro, SerializationFormat::Parquet, SerializationFormat::Text];

    pub fn as_str(&self) -> &'static str {
        match self {
            SerializationFormat::Avro => "avro",
            SerializationFormat::Parquet => "parquet",
            SerializationFormat::Text => "text",
        }
    }

    /// File suffix that identifies the format, if it has one.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            SerializationFormat::Avro => Some(".avro"),
            SerializationFormat::Parquet => Some(".parquet"),
            SerializationFormat::Text => None,
        }
    }

    /// Source format tag understood by the bulk data engine's reader.
    pub fn source_format_tag(&self) -> &'static str {
        match self {
            SerializationFormat::Avro => "com.databricks.spark.avro",
            SerializationFormat::Parquet => "parquet",
            SerializationFormat::Text => "text",
        }
    }
}

impl fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SerializationFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "avro" => Ok(SerializationFormat::Avro),
            "parquet" => Ok(SerializationFormat::Parquet),
            "text" => Ok(SerializationFormat::Text),
            other => Err(format!("unknown serialization format '{}'", other)),
        }
    }
}

/// Byte-level compression applied to stored files.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    #[default]
    None,
    Snappy,
    Gzip,
    Bzip2,
    Lzo,
}

impl CompressionCodec {
    pub const ALL: [CompressionCodec; 5] = [
        CompressionCodec::None,
        CompressionCodec::Snappy,
        CompressionCodec::Gzip,
        CompressionCodec::Bzip2,
        CompressionCodec::Lzo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionCodec::None => "none",
            CompressionCodec::Snappy => "snappy",
            CompressionCodec::Gzip => "gzip",
            CompressionCodec::Bzip2 => "bzip2",
            CompressionCodec::Lzo => "lzo",
        }
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(CompressionCodec::None),
            "snappy" => Ok(CompressionCodec::Snappy),
            "gzip" => Ok(CompressionCodec::Gzip),
            "bzip2" => Ok(CompressionCodec::Bzip2),
            "lzo" => Ok(CompressionCodec::Lzo),
            other => Err(format!("unknown compression codec '{}'", other)),
        }
    }
}

/// Compound key into the ratio table. An absent codec means the format's base ratio.
pub type RatioKey = (SerializationFormat, Option<CompressionCodec>);

/// One tier of the size-range compaction policy.
///
/// Field names match the `size_ranges_for_compaction` entries of the JSON configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SizeRangeRule {
    #[serde(rename = "min_size_in_gb")]
    pub min_gb: f64,
    /// `0` means the tier is open-ended and extends to the current corpus size.
    #[serde(rename = "max_size_in_gb")]
    pub max_gb: f64,
    #[serde(rename = "size_after_compaction_in_mb")]
    pub target_size_mb: f64,
}

impl SizeRangeRule {
    pub fn new(min_gb: f64, max_gb: f64, target_size_mb: f64) -> Self {
        Self { min_gb, max_gb, target_size_mb }
    }
}
