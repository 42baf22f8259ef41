//! Benchmarks for fuzzy connectedness tracking.
//!
//! Run with: cargo bench -p fuzzy-track
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p fuzzy-track -- --save-baseline main
//! 2. After changes: cargo bench -p fuzzy-track -- --baseline main

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use fuzzy_affinity::{
    AffinityConfig, AffinityModel, EdgeSample, Feature, FeatureFunction, ModelAffinity,
    ParametricModel, WeightedFeature,
};
use fuzzy_track::FuzzyTracker;
use fuzzy_types::{Dimensions, QueueBackend, SeedSet, Spacing, TrackConfig, Volume, VoxelCoord};

// =============================================================================
// Test Volume Generation
// =============================================================================

/// Bright ball on a dark background with a mild intensity ramp.
fn create_ball(size: usize) -> Volume {
    let dims = Dimensions::new(size, size, size);
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let values = dims
        .iter()
        .map(|c| {
            let centre = size as f64 / 2.0;
            let dx = f64::from(c.x) - centre;
            let dy = f64::from(c.y) - centre;
            let dz = f64::from(c.z) - centre;
            let r = dz.mul_add(dz, dx.mul_add(dx, dy * dy)).sqrt();
            let base = if r < centre * 0.7 { 180.0 } else { 40.0 };
            (base + f64::from(c.x) * 0.5) as u8
        })
        .collect();
    Volume::from_u8(dims, Spacing::new(1.0, 1.0, 1.5), values).expect("valid ball volume")
}

fn centre_seed(size: usize) -> SeedSet {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let c = (size / 2) as i32;
    std::iter::once(VoxelCoord::new(c, c, c)).collect()
}

fn contrast(e: &EdgeSample) -> u16 {
    (255 - (e.high() - e.low())) * 257
}

fn parametric() -> ModelAffinity {
    let model = ParametricModel::new(vec![
        WeightedFeature::new(Feature::Difference, FeatureFunction::gaussian(0.0, 20.0), 1.0),
        WeightedFeature::new(Feature::High, FeatureFunction::gaussian(180.0, 40.0), 0.8),
    ])
    .expect("valid parametric model");
    ModelAffinity::new(AffinityModel::Parametric(model), AffinityConfig::default())
        .expect("valid affinity config")
}

// =============================================================================
// Backend Benchmarks
// =============================================================================

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("Backends");
    group.sample_size(20);

    for size in [16, 32] {
        let volume = create_ball(size);
        let seeds = centre_seed(size);
        group.throughput(Throughput::Elements(volume.dims().len() as u64));

        for backend in QueueBackend::ALL {
            group.bench_with_input(
                BenchmarkId::new(backend.name(), format!("{size}^3")),
                &(&volume, &seeds),
                |b, (volume, seeds)| {
                    let config = TrackConfig::default().with_backend(backend);
                    b.iter(|| {
                        FuzzyTracker::new(black_box(volume), contrast, config)
                            .track(black_box(seeds))
                    });
                },
            );
        }
    }

    group.finish();
}

// =============================================================================
// Memoization Benchmarks
// =============================================================================

fn bench_memoize(c: &mut Criterion) {
    let mut group = c.benchmark_group("Memoization");
    group.sample_size(20);

    let volume = create_ball(32);
    let seeds = centre_seed(32);
    group.throughput(Throughput::Elements(volume.dims().len() as u64));

    for memoize in [true, false] {
        let label = if memoize { "cached" } else { "recomputed" };
        group.bench_function(BenchmarkId::new("parametric", label), |b| {
            let config = TrackConfig::default().with_memoize(memoize);
            b.iter(|| {
                FuzzyTracker::new(black_box(&volume), parametric(), config)
                    .track(black_box(&seeds))
            });
        });
    }

    group.finish();
}

// =============================================================================
// Export Benchmarks
// =============================================================================

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("Export");

    let volume = create_ball(32);
    let empty = SeedSet::new();
    group.throughput(Throughput::Elements(volume.dims().len() as u64));

    group.bench_function("in_plane_32^3", |b| {
        b.iter(|| {
            FuzzyTracker::new(black_box(&volume), contrast, TrackConfig::default())
                .track(black_box(&empty))
        });
    });

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_backends, bench_memoize, bench_export);
criterion_main!(benches);
