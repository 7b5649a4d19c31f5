//! # Compaction Sizing Engine
//!
//! Turns an estimated corpus size into the number of output partitions
//! ("split size") the bulk data engine should coalesce into.
//!
//! Two strategies are available:
//! - **Block size** (default): one partition per output block, plus one.
//! - **Size range**: a tiered policy mapping corpus size buckets to a target
//!   post-compaction file size.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::common::{CompressionCodec, SerializationFormat, SizeRangeRule};
use crate::error::{CompactionError, Result};
use crate::ratio::CompressionRatioTable;

/// Bytes to MiB. Kept as the exact literal the tier boundaries were tuned against.
pub const BYTES_TO_MB: f64 = 0.00000095367432;
/// MB to GB. Approximate on purpose, see [`BYTES_TO_MB`].
pub const MB_TO_GB: f64 = 0.0009756;

/// Strategy selector as it appears on the command line and in plans.
#[derive(ValueEnum, Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// One partition per output filesystem block.
    #[default]
    #[value(alias = "block_size")]
    BlockSize,
    /// Tiered size ranges from the configuration file.
    #[value(alias = "size_range")]
    SizeRange,
}

/// A strategy together with the inputs it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum SizingStrategy {
    BlockSize { block_size_bytes: u64 },
    SizeRange { corpus_size_bytes: u64, tiers: Vec<SizeRangeRule> },
}

impl SizingStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            SizingStrategy::BlockSize { .. } => StrategyKind::BlockSize,
            SizingStrategy::SizeRange { .. } => StrategyKind::SizeRange,
        }
    }
}

pub struct SizingEngine<'a> {
    ratios: &'a CompressionRatioTable,
}

impl<'a> SizingEngine<'a> {
    pub fn new(ratios: &'a CompressionRatioTable) -> Self {
        Self { ratios }
    }

    pub fn split_size(
        &self,
        estimated_input_size_bytes: u64,
        output_format: SerializationFormat,
        output_codec: CompressionCodec,
        strategy: &SizingStrategy,
    ) -> Result<u64> {
        let split = match strategy {
            SizingStrategy::BlockSize { block_size_bytes } => {
                let output_ratio = self.ratios.ratio(output_format, Some(output_codec))?;
                block_size_split(estimated_input_size_bytes, output_ratio, *block_size_bytes)?
            }
            SizingStrategy::SizeRange { corpus_size_bytes, tiers } => {
                size_range_split(*corpus_size_bytes, tiers)?
            }
        };
        info!(strategy = ?strategy.kind(), split_size = split, "computed split size");
        Ok(split)
    }
}

/// `floor((estimated / output_ratio) / block_size) + 1`.
///
/// The `+ 1` guarantees at least one partition and leans towards files
/// slightly smaller than a block.
pub fn block_size_split(estimated_bytes: u64, output_ratio: f64, block_size_bytes: u64) -> Result<u64> {
    if block_size_bytes == 0 {
        return Err(CompactionError::InvalidBlockSize { size: block_size_bytes });
    }
    let blocks = (estimated_bytes as f64 / output_ratio) / block_size_bytes as f64;
    Ok(blocks.floor() as u64 + 1)
}

/// Evaluates every tier in order; the last matching tier decides.
///
/// A tier with `max_gb == 0` is open-ended: its upper bound becomes the corpus
/// size itself, so it matches whenever the lower bound does. Overlapping tiers
/// are resolved last-match-wins. The winning tier must have a positive target.
pub fn size_range_split(corpus_size_bytes: u64, tiers: &[SizeRangeRule]) -> Result<u64> {
    let size_mb = corpus_size_bytes as f64 * BYTES_TO_MB;
    let size_gb = size_mb * MB_TO_GB;
    debug!(size_mb, size_gb, tiers = tiers.len(), "evaluating size range tiers");

    let mut matched: Option<&SizeRangeRule> = None;
    for tier in tiers {
        let max_gb = if tier.max_gb == 0.0 { size_gb } else { tier.max_gb };
        let hit = tier.min_gb <= size_gb && size_gb <= max_gb;
        debug!(min_gb = tier.min_gb, max_gb = tier.max_gb, target_mb = tier.target_size_mb, hit, "tier");
        if hit {
            matched = Some(tier);
        }
    }

    let tier = matched.ok_or(CompactionError::UnresolvedTier { corpus_size_gb: size_gb })?;
    if !(tier.target_size_mb > 0.0) {
        return Err(CompactionError::Config(format!(
            "size range tier {}..{} GB has a non-positive target of {} MB",
            tier.min_gb, tier.max_gb, tier.target_size_mb
        )));
    }
    let partitions = (size_mb / tier.target_size_mb).round() as u64;
    Ok(partitions.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: u64 = 1024 * 1024 * 1024;

    #[test]
    fn ten_gib_into_128_mib_blocks() -> Result<()> {
        assert_eq!(block_size_split(10 * GIB, 1.0, 128 * 1024 * 1024)?, 81);
        Ok(())
    }

    #[test]
    fn block_size_split_is_at_least_one() -> Result<()> {
        assert_eq!(block_size_split(0, 1.0, 128 * 1024 * 1024)?, 1);
        assert_eq!(block_size_split(1, 6.8, 1)?, 1);
        Ok(())
    }

    #[test]
    fn zero_block_size_is_rejected() {
        assert!(matches!(block_size_split(GIB, 1.0, 0), Err(CompactionError::InvalidBlockSize { size: 0 })));
    }

    #[test]
    fn output_ratio_shrinks_the_split() -> Result<()> {
        let table = CompressionRatioTable::default();
        let engine = SizingEngine::new(&table);
        let strategy = SizingStrategy::BlockSize { block_size_bytes: 128 * 1024 * 1024 };
        // Parquet (2.0) * gzip (2.5): 10 GiB / 5.0 = 2 GiB = 16 blocks.
        let split = engine.split_size(10 * GIB, SerializationFormat::Parquet, CompressionCodec::Gzip, &strategy)?;
        assert_eq!(split, 17);
        Ok(())
    }

    fn tiers() -> Vec<SizeRangeRule> {
        vec![SizeRangeRule::new(0.0, 10.0, 500.0), SizeRangeRule::new(10.0, 0.0, 2000.0)]
    }

    #[test]
    fn open_ended_tier_matches_large_corpus() -> Result<()> {
        assert_eq!(size_range_split(50 * GIB, &tiers())?, 26);
        Ok(())
    }

    #[test]
    fn bounded_tier_matches_small_corpus() -> Result<()> {
        // 2 GiB = 2048 MB -> round(2048 / 500) = 4
        assert_eq!(size_range_split(2 * GIB, &tiers())?, 4);
        Ok(())
    }

    #[test]
    fn last_matching_tier_wins() -> Result<()> {
        let overlapping = vec![
            SizeRangeRule::new(0.0, 100.0, 1000.0),
            SizeRangeRule::new(0.0, 0.0, 4000.0),
            SizeRangeRule::new(200.0, 0.0, 10.0),
        ];
        // 20 GiB = 20480 MB; the first two tiers match, the second is last.
        assert_eq!(size_range_split(20 * GIB, &overlapping)?, 5);
        Ok(())
    }

    #[test]
    fn no_matching_tier_is_an_error() {
        let gap = vec![SizeRangeRule::new(100.0, 200.0, 1000.0)];
        assert!(matches!(
            size_range_split(GIB, &gap),
            Err(CompactionError::UnresolvedTier { .. })
        ));
        assert!(matches!(size_range_split(GIB, &[]), Err(CompactionError::UnresolvedTier { .. })));
    }

    #[test]
    fn non_positive_target_is_rejected() {
        for target in [0.0, -5.0, f64::NAN] {
            let tier = vec![SizeRangeRule::new(0.0, 0.0, target)];
            assert!(
                matches!(size_range_split(GIB, &tier), Err(CompactionError::Config(_))),
                "target {target} accepted"
            );
        }
    }

    #[test]
    fn non_positive_target_only_matters_when_it_wins() -> Result<()> {
        let tiers = vec![SizeRangeRule::new(0.0, 0.0, 0.0), SizeRangeRule::new(0.0, 0.0, 512.0)];
        // 1 GiB = 1024 MB -> round(1024 / 512) = 2
        assert_eq!(size_range_split(GIB, &tiers)?, 2);
        Ok(())
    }

    #[test]
    fn tiny_corpus_still_gets_one_partition() -> Result<()> {
        assert_eq!(size_range_split(1024, &tiers())?, 1);
        Ok(())
    }

    #[test]
    fn engine_is_pure() -> Result<()> {
        let table = CompressionRatioTable::default();
        let engine = SizingEngine::new(&table);
        let strategy = SizingStrategy::SizeRange { corpus_size_bytes: 50 * GIB, tiers: tiers() };
        let a = engine.split_size(0, SerializationFormat::Text, CompressionCodec::None, &strategy)?;
        let b = engine.split_size(0, SerializationFormat::Text, CompressionCodec::None, &strategy)?;
        assert_eq!(a, b);
        Ok(())
    }
}
