//! Static expected size-inflation factors by serialization format and codec.
//!
//! A ratio estimates how much larger the logical (uncompressed, baseline) form
//! of a corpus is than the bytes stored on disk. The numbers are heuristics:
//! they assume uniform compressibility across the corpus.

use std::collections::HashMap;

use crate::common::{CompressionCodec, RatioKey, SerializationFormat};
use crate::error::{CompactionError, Result};

pub const AVRO_RATIO: f64 = 1.6;
pub const PARQUET_RATIO: f64 = 2.0;
pub const TEXT_RATIO: f64 = 1.0;

pub const SNAPPY_RATIO: f64 = 1.7; // ~40% compression on text
pub const LZO_RATIO: f64 = 2.0; // ~50%
pub const GZIP_RATIO: f64 = 2.5; // ~60%
pub const BZIP2_RATIO: f64 = 3.33; // ~70%

/// Immutable lookup table built once and passed by reference to the
/// estimator and the sizing engine.
#[derive(Debug, Clone)]
pub struct CompressionRatioTable {
    ratios: HashMap<RatioKey, f64>,
}

impl CompressionRatioTable {
    /// Builds the cross product of the given base and codec ratios.
    ///
    /// `ratio(f, None)` and `ratio(f, Some(CompressionCodec::None))` are both the
    /// base ratio of `f`; every other codec multiplies the base.
    pub fn new(
        bases: &[(SerializationFormat, f64)],
        codecs: &[(CompressionCodec, f64)],
    ) -> Self {
        let mut ratios = HashMap::new();
        for &(format, base) in bases {
            ratios.insert((format, None), base);
            ratios.insert((format, Some(CompressionCodec::None)), base);
            for &(codec, multiplier) in codecs {
                if codec != CompressionCodec::None {
                    ratios.insert((format, Some(codec)), base * multiplier);
                }
            }
        }
        Self { ratios }
    }

    pub fn ratio(&self, format: SerializationFormat, codec: Option<CompressionCodec>) -> Result<f64> {
        self.ratios
            .get(&(format, codec))
            .copied()
            .ok_or(CompactionError::UnknownRatio { format, codec })
    }
}

impl Default for CompressionRatioTable {
    fn default() -> Self {
        Self::new(
            &[
                (SerializationFormat::Avro, AVRO_RATIO),
                (SerializationFormat::Parquet, PARQUET_RATIO),
                (SerializationFormat::Text, TEXT_RATIO),
            ],
            &[
                (CompressionCodec::None, 1.0),
                (CompressionCodec::Snappy, SNAPPY_RATIO),
                (CompressionCodec::Lzo, LZO_RATIO),
                (CompressionCodec::Gzip, GZIP_RATIO),
                (CompressionCodec::Bzip2, BZIP2_RATIO),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(format: SerializationFormat) -> f64 {
        match format {
            SerializationFormat::Avro => AVRO_RATIO,
            SerializationFormat::Parquet => PARQUET_RATIO,
            SerializationFormat::Text => TEXT_RATIO,
        }
    }

    fn multiplier(codec: CompressionCodec) -> f64 {
        match codec {
            CompressionCodec::None => 1.0,
            CompressionCodec::Snappy => SNAPPY_RATIO,
            CompressionCodec::Gzip => GZIP_RATIO,
            CompressionCodec::Bzip2 => BZIP2_RATIO,
            CompressionCodec::Lzo => LZO_RATIO,
        }
    }

    #[test]
    fn no_codec_is_the_base_ratio() -> Result<()> {
        let table = CompressionRatioTable::default();
        for format in SerializationFormat::ALL {
            assert_eq!(table.ratio(format, None)?, base(format));
            assert_eq!(table.ratio(format, Some(CompressionCodec::None))?, base(format));
        }
        Ok(())
    }

    #[test]
    fn codec_ratio_multiplies_the_base() -> Result<()> {
        let table = CompressionRatioTable::default();
        for format in SerializationFormat::ALL {
            for codec in CompressionCodec::ALL {
                let expected = base(format) * multiplier(codec);
                assert_eq!(table.ratio(format, Some(codec))?, expected, "{format}/{codec}");
            }
        }
        assert!((table.ratio(SerializationFormat::Parquet, Some(CompressionCodec::Snappy))? - 3.4).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn undeclared_combination_is_an_error() {
        let table = CompressionRatioTable::new(
            &[(SerializationFormat::Text, TEXT_RATIO)],
            &[(CompressionCodec::Gzip, GZIP_RATIO)],
        );
        assert!(table.ratio(SerializationFormat::Text, Some(CompressionCodec::Gzip)).is_ok());
        assert!(matches!(
            table.ratio(SerializationFormat::Avro, None),
            Err(CompactionError::UnknownRatio { format: SerializationFormat::Avro, codec: None })
        ));
        assert!(table.ratio(SerializationFormat::Text, Some(CompressionCodec::Snappy)).is_err());
    }
}
