// benches/planning_benchmark.rs
use compaction_planner::common::{CompressionCodec, FileEntry, SerializationFormat, SizeRangeRule};
use compaction_planner::detect::{CodecExtensions, FormatDetector};
use compaction_planner::estimate::CorpusSizeEstimator;
use compaction_planner::ratio::CompressionRatioTable;
use compaction_planner::sizing::{size_range_split, SizingEngine, SizingStrategy};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// A listing shaped like a typical small-file directory: many tiny parts,
/// a few hidden markers, and a codec that only shows up late.
fn synthetic_listing(n: usize) -> Vec<FileEntry> {
    let mut entries = Vec::with_capacity(n + 2);
    entries.push(FileEntry::file("/warehouse/events/_SUCCESS", 0));
    entries.push(FileEntry::file("/warehouse/events/.part-00000.crc", 16));
    for i in 0..n {
        let name = if i + 1 == n {
            format!("/warehouse/events/part-{:05}.snappy.parquet", i)
        } else {
            format!("/warehouse/events/part-{:05}.parquet", i)
        };
        entries.push(FileEntry::file(name, 512 * 1024 + i as u64));
    }
    entries
}

fn bench_detect_and_estimate(c: &mut Criterion) {
    let ratios = CompressionRatioTable::default();
    let codecs = CodecExtensions::default();
    let mut group = c.benchmark_group("detect_and_estimate");

    for n in [1_000usize, 10_000, 100_000] {
        let listing = synthetic_listing(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &listing, |b, listing| {
            b.iter(|| {
                let detection = FormatDetector::new(&codecs).detect(black_box(listing));
                CorpusSizeEstimator::new(&ratios)
                    .estimate_entries(listing, detection.serialization, detection.compression)
                    .map(|e| e.estimated_bytes)
            })
        });
    }
    group.finish();
}

fn bench_sizing(c: &mut Criterion) {
    let ratios = CompressionRatioTable::default();
    let engine = SizingEngine::new(&ratios);
    let block = SizingStrategy::BlockSize { block_size_bytes: 128 * 1024 * 1024 };
    let tiers: Vec<SizeRangeRule> = (0..64)
        .map(|i| SizeRangeRule::new(i as f64 * 10.0, (i + 1) as f64 * 10.0, 256.0 + i as f64))
        .chain(std::iter::once(SizeRangeRule::new(640.0, 0.0, 4096.0)))
        .collect();

    c.bench_function("block_size_split", |b| {
        b.iter(|| {
            engine.split_size(
                black_box(10 * 1024 * 1024 * 1024),
                SerializationFormat::Parquet,
                CompressionCodec::Snappy,
                &block,
            )
        })
    });
    c.bench_function("size_range_split_65_tiers", |b| {
        b.iter(|| size_range_split(black_box(300 * 1024 * 1024 * 1024), &tiers))
    });
}

criterion_group!(benches, bench_detect_and_estimate, bench_sizing);
criterion_main!(benches);
