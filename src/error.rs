use std::path::PathBuf;

use crate::common::{CompressionCodec, SerializationFormat};

/// The primary error type for all operations in the `compaction-planner` crate.
///
/// Every variant is fatal to the invocation that produced it. Nothing is retried:
/// the inputs are deterministic snapshots, so a retry would see the same data.
#[derive(Debug, thiserror::Error)]
pub enum CompactionError {
    /// An input or output serialization/compression value is outside its legal set.
    #[error("{message}")]
    InvalidFormat { message: String },

    /// The listing service failed to enumerate, size, or query block size for a path.
    #[error("filesystem error on path '{}': {source}", .path.display())]
    FileSystemAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The size-range strategy found no tier covering the corpus size.
    #[error("no size range tier matches a corpus of {corpus_size_gb:.4} GB")]
    UnresolvedTier { corpus_size_gb: f64 },

    /// The output format and codec pass validation but cannot be written.
    #[error("output serialization '{serialization}' does not support compression '{compression}'")]
    UnsupportedCombination {
        serialization: SerializationFormat,
        compression: CompressionCodec,
    },

    /// The output location reported a block size that cannot be used for sizing.
    #[error("invalid output block size {size}")]
    InvalidBlockSize { size: u64 },

    /// A ratio was requested for a combination the table does not declare.
    #[error("no compression ratio declared for {format} with codec {codec:?}")]
    UnknownRatio {
        format: SerializationFormat,
        codec: Option<CompressionCodec>,
    },

    /// The input location resolved to no entries at all.
    #[error("input path '{}' matched no files or directories", .path.display())]
    EmptyInput { path: PathBuf },

    /// The configuration is readable but semantically wrong.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON could not be read (configuration) or written (plan, job manifest).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the plan or the job manifest failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompactionError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompactionError::FileSystemAccess { path: path.into(), source }
    }

    pub(crate) fn invalid_format(message: impl Into<String>) -> Self {
        CompactionError::InvalidFormat { message: message.into() }
    }
}

/// The result type used throughout the crate.
pub type Result<T> = std::result::Result<T, CompactionError>;
