//! # Planner pipeline
//!
//! Threads one invocation through the sizing stages. Each stage consumes the
//! value the previous one produced, so the ordering is carried by the function
//! signatures rather than by fields that have to be filled in the right order:
//!
//! 1. [`expand_input`] lists the input location.
//! 2. [`FormatDetector`] infers format and codec -> [`Detection`].
//! 3. [`PlanValidator`] resolves explicit choices -> [`ValidatedFormats`].
//! 4. [`CorpusSizeEstimator`] sizes the corpus -> [`CorpusEstimate`].
//! 5. [`SizingEngine`] computes the split size -> [`CompactionPlan`].

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::common::{CompressionCodec, SerializationFormat, SizeRangeRule};
use crate::detect::{expand_input, CodecExtensions, Detection, FormatDetector};
use crate::error::Result;
use crate::estimate::{CorpusEstimate, CorpusSizeEstimator};
use crate::fsx::FileSystem;
use crate::ratio::CompressionRatioTable;
use crate::sizing::{SizingEngine, SizingStrategy, StrategyKind};
use crate::validate::{FormatRequest, PlanValidator, ValidatedFormats};

/// What the caller asks for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub formats: FormatRequest,
    pub strategy: StrategyKind,
    /// Ordered tiers for [`StrategyKind::SizeRange`]; ignored otherwise.
    pub tiers: Vec<SizeRangeRule>,
}

/// The outcome of one planning run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompactionPlan {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub input_serialization: SerializationFormat,
    pub input_compression: CompressionCodec,
    pub output_serialization: SerializationFormat,
    pub output_compression: CompressionCodec,
    /// Comma-joined non-hidden input files.
    pub input_paths: String,
    /// Raw bytes consumed by the input location, hidden files included.
    pub corpus_size_bytes: u64,
    pub estimated_input_size_bytes: u64,
    pub output_block_size_bytes: u64,
    pub strategy: StrategyKind,
    pub split_size: u64,
}

pub struct Planner<'a, F: FileSystem> {
    fs: F,
    ratios: &'a CompressionRatioTable,
    codecs: &'a CodecExtensions,
    validator: PlanValidator,
}

impl<'a, F: FileSystem> Planner<'a, F> {
    pub fn new(fs: F, ratios: &'a CompressionRatioTable, codecs: &'a CodecExtensions) -> Self {
        Self { fs, ratios, codecs, validator: PlanValidator }
    }

    pub fn detect(&self, request: &PlanRequest) -> Result<Detection> {
        let entries = expand_input(&self.fs, &request.input_path)?;
        Ok(FormatDetector::new(self.codecs).detect(&entries))
    }

    pub fn plan(&self, request: &PlanRequest) -> Result<CompactionPlan> {
        let detection = self.detect(request)?;
        let formats = self.validator.validate(&request.formats, &detection)?;
        let estimate = CorpusSizeEstimator::new(self.ratios).estimate(
            &self.fs,
            &detection.entries,
            formats.input_serialization,
            formats.input_compression,
        )?;
        self.size(request, &detection, formats, estimate)
    }

    fn size(
        &self,
        request: &PlanRequest,
        detection: &Detection,
        formats: ValidatedFormats,
        estimate: CorpusEstimate,
    ) -> Result<CompactionPlan> {
        let output_block_size_bytes = self.fs.default_block_size(&request.output_path)?;
        let corpus_size_bytes = self.raw_corpus_size(detection)?;
        let strategy = match request.strategy {
            StrategyKind::BlockSize => {
                SizingStrategy::BlockSize { block_size_bytes: output_block_size_bytes }
            }
            StrategyKind::SizeRange => {
                SizingStrategy::SizeRange { corpus_size_bytes, tiers: request.tiers.clone() }
            }
        };

        let split_size = SizingEngine::new(self.ratios).split_size(
            estimate.estimated_bytes,
            formats.output_serialization,
            formats.output_compression,
            &strategy,
        )?;

        info!(
            input = %request.input_path.display(),
            output = %request.output_path.display(),
            input_format = %formats.input_serialization,
            input_codec = %formats.input_compression,
            output_format = %formats.output_serialization,
            output_codec = %formats.output_compression,
            split_size,
            "compaction plan ready"
        );

        Ok(CompactionPlan {
            input_path: request.input_path.clone(),
            output_path: request.output_path.clone(),
            input_serialization: formats.input_serialization,
            input_compression: formats.input_compression,
            output_serialization: formats.output_serialization,
            output_compression: formats.output_compression,
            input_paths: detection.resolved_input_paths(),
            corpus_size_bytes,
            estimated_input_size_bytes: estimate.estimated_bytes,
            output_block_size_bytes,
            strategy: request.strategy,
            split_size,
        })
    }

    /// Space consumed by everything the input resolved to, hidden files included.
    fn raw_corpus_size(&self, detection: &Detection) -> Result<u64> {
        let mut total = 0u64;
        for entry in &detection.entries {
            total += self.fs.content_summary(&entry.path)?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::FileEntry;
    use crate::error::CompactionError;
    use std::path::Path;

    const GIB: u64 = 1024 * 1024 * 1024;
    const BLOCK: u64 = 128 * 1024 * 1024;

    /// In-memory listing: one directory of files with fixed sizes.
    struct FakeFs {
        dir: PathBuf,
        files: Vec<FileEntry>,
        block_size: u64,
    }

    impl FakeFs {
        fn new(dir: &str, files: &[(&str, u64)], block_size: u64) -> Self {
            let dir = PathBuf::from(dir);
            let files = files.iter().map(|&(name, size)| FileEntry::file(dir.join(name), size)).collect();
            Self { dir, files, block_size }
        }
    }

    impl FileSystem for FakeFs {
        fn status(&self, path: &Path) -> Result<Vec<FileEntry>> {
            if path == self.dir {
                return Ok(vec![FileEntry::dir(path)]);
            }
            Ok(self.files.iter().filter(|f| f.path == path).cloned().collect())
        }

        fn list(&self, _path: &Path) -> Result<Vec<FileEntry>> {
            Ok(self.files.clone())
        }

        fn content_summary(&self, path: &Path) -> Result<u64> {
            if path == self.dir {
                return Ok(self.files.iter().map(|f| f.size_on_disk).sum());
            }
            Ok(self.files.iter().filter(|f| f.path == path).map(|f| f.size_on_disk).sum())
        }

        fn default_block_size(&self, _path: &Path) -> Result<u64> {
            Ok(self.block_size)
        }
    }

    fn request(strategy: StrategyKind) -> PlanRequest {
        PlanRequest {
            input_path: PathBuf::from("/warehouse/events"),
            output_path: PathBuf::from("/warehouse/events_compacted"),
            strategy,
            ..PlanRequest::default()
        }
    }

    #[test]
    fn block_size_plan_for_ten_gib_of_text() -> Result<()> {
        let fs = FakeFs::new("/warehouse/events", &[("part-0", 5 * GIB), ("part-1", 5 * GIB), ("_SUCCESS", 0)], BLOCK);
        let (ratios, codecs) = (CompressionRatioTable::default(), CodecExtensions::default());
        let plan = Planner::new(&fs, &ratios, &codecs).plan(&request(StrategyKind::BlockSize))?;

        assert_eq!(plan.input_serialization, SerializationFormat::Text);
        assert_eq!(plan.input_compression, CompressionCodec::None);
        assert_eq!(plan.estimated_input_size_bytes, 10 * GIB);
        assert_eq!(plan.output_block_size_bytes, BLOCK);
        assert_eq!(plan.split_size, 81);
        assert_eq!(plan.input_paths, "/warehouse/events/part-0,/warehouse/events/part-1");
        Ok(())
    }

    #[test]
    fn size_range_plan_uses_raw_corpus_size() -> Result<()> {
        let fs = FakeFs::new("/warehouse/events", &[("part-0.snappy.parquet", 50 * GIB)], BLOCK);
        let (ratios, codecs) = (CompressionRatioTable::default(), CodecExtensions::default());
        let mut req = request(StrategyKind::SizeRange);
        req.tiers = vec![SizeRangeRule::new(0.0, 10.0, 500.0), SizeRangeRule::new(10.0, 0.0, 2000.0)];

        let plan = Planner::new(&fs, &ratios, &codecs).plan(&req)?;
        assert_eq!(plan.input_serialization, SerializationFormat::Parquet);
        assert_eq!(plan.input_compression, CompressionCodec::Snappy);
        assert_eq!(plan.corpus_size_bytes, 50 * GIB);
        assert_eq!(plan.split_size, 26);
        Ok(())
    }

    #[test]
    fn empty_directory_still_plans_one_split() -> Result<()> {
        let fs = FakeFs::new("/warehouse/events", &[("_SUCCESS", 0)], BLOCK);
        let (ratios, codecs) = (CompressionRatioTable::default(), CodecExtensions::default());
        let plan = Planner::new(&fs, &ratios, &codecs).plan(&request(StrategyKind::BlockSize))?;
        assert_eq!(plan.estimated_input_size_bytes, 0);
        assert_eq!(plan.split_size, 1);
        assert_eq!(plan.input_paths, "");
        Ok(())
    }

    #[test]
    fn zero_block_size_is_rejected_before_splitting() {
        let fs = FakeFs::new("/warehouse/events", &[("part-0", GIB)], 0);
        let (ratios, codecs) = (CompressionRatioTable::default(), CodecExtensions::default());
        let err = Planner::new(&fs, &ratios, &codecs).plan(&request(StrategyKind::BlockSize)).unwrap_err();
        assert!(matches!(err, CompactionError::InvalidBlockSize { size: 0 }));
    }

    #[test]
    fn validation_runs_before_sizing() {
        // Size-range with no tiers would fail too; validation must win.
        let fs = FakeFs::new("/warehouse/events", &[("part-0", GIB)], BLOCK);
        let (ratios, codecs) = (CompressionRatioTable::default(), CodecExtensions::default());
        let mut req = request(StrategyKind::SizeRange);
        req.formats.output_compression = Some("lzo".to_string());
        let err = Planner::new(&fs, &ratios, &codecs).plan(&req).unwrap_err();
        assert!(matches!(err, CompactionError::InvalidFormat { .. }));
    }

    #[test]
    fn planning_is_repeatable() -> Result<()> {
        let fs = FakeFs::new("/warehouse/events", &[("a.gz", 3 * GIB), ("b.gz", 7 * GIB)], BLOCK);
        let (ratios, codecs) = (CompressionRatioTable::default(), CodecExtensions::default());
        let planner = Planner::new(&fs, &ratios, &codecs);
        let req = request(StrategyKind::BlockSize);
        assert_eq!(planner.plan(&req)?, planner.plan(&req)?);
        Ok(())
    }
}
