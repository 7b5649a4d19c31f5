//! Corpus size estimation.
//!
//! Stored bytes are normalized to an estimated logical size by multiplying with
//! the ratio for the input format and codec. This is a heuristic, not a
//! measurement: it is only as accurate as the static ratio table.

use serde::Serialize;
use tracing::info;

use crate::common::{CompressionCodec, FileEntry, SerializationFormat};
use crate::error::Result;
use crate::fsx::FileSystem;
use crate::ratio::CompressionRatioTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpusEstimate {
    /// Stored (compressed) bytes over all non-hidden entries.
    pub on_disk_bytes: u64,
    pub estimated_bytes: u64,
}

pub struct CorpusSizeEstimator<'a> {
    ratios: &'a CompressionRatioTable,
}

impl<'a> CorpusSizeEstimator<'a> {
    pub fn new(ratios: &'a CompressionRatioTable) -> Self {
        Self { ratios }
    }

    /// Sums consumed space as reported by the listing service. Directory
    /// entries are summarized recursively.
    pub fn estimate<F: FileSystem>(
        &self,
        fs: &F,
        entries: &[FileEntry],
        format: SerializationFormat,
        codec: CompressionCodec,
    ) -> Result<CorpusEstimate> {
        let mut on_disk_bytes = 0u64;
        for entry in entries.iter().filter(|e| !e.is_hidden()) {
            on_disk_bytes += fs.content_summary(&entry.path)?;
        }
        self.normalize(on_disk_bytes, format, codec)
    }

    /// Same as [`estimate`](Self::estimate) but trusts the sizes already on the entries.
    pub fn estimate_entries(
        &self,
        entries: &[FileEntry],
        format: SerializationFormat,
        codec: CompressionCodec,
    ) -> Result<CorpusEstimate> {
        let on_disk_bytes = entries
            .iter()
            .filter(|e| !e.is_hidden())
            .map(|e| e.size_on_disk)
            .sum();
        self.normalize(on_disk_bytes, format, codec)
    }

    fn normalize(
        &self,
        on_disk_bytes: u64,
        format: SerializationFormat,
        codec: CompressionCodec,
    ) -> Result<CorpusEstimate> {
        let ratio = self.ratios.ratio(format, Some(codec))?;
        let estimated_bytes = (on_disk_bytes as f64 * ratio) as u64;
        info!(on_disk_bytes, ratio, estimated_bytes, "estimated corpus size");
        Ok(CorpusEstimate { on_disk_bytes, estimated_bytes })
    }
}
