//! End-to-end tracking scenarios on small hand-checked volumes.

#![allow(clippy::unwrap_used)]

use fuzzy_affinity::{
    AdditiveModel, AffinityConfig, AffinityModel, EdgeSample, Feature, FeatureFunction,
    Membership, ModelAffinity, ModelField, WeightedFeature,
};
use fuzzy_track::FuzzyTracker;
use fuzzy_types::{
    Dimensions, ExportAxes, MAX_STRENGTH, QueueBackend, SeedSet, Spacing, StrengthMap,
    TrackConfig, Volume, VoxelCoord,
};

fn contrast(e: &EdgeSample) -> u16 {
    255 - (e.high() - e.low())
}

fn seeds(coords: &[(i32, i32, i32)]) -> SeedSet {
    coords.iter().map(|&c| VoxelCoord::from(c)).collect()
}

/// 5x5 slice with a bright column at x = 2, optionally open at the bottom row.
fn barrier(open: bool) -> Volume {
    let dims = Dimensions::new(5, 5, 1);
    let values = dims
        .iter()
        .map(|c| {
            if c.x == 2 && !(open && c.y == 4) {
                230
            } else {
                100
            }
        })
        .collect();
    Volume::from_u8(dims, Spacing::default(), values).unwrap()
}

fn track_all_backends(volume: &Volume, seeds: &SeedSet) -> StrengthMap {
    let mut maps: Vec<StrengthMap> = QueueBackend::ALL
        .iter()
        .map(|&backend| {
            let config = TrackConfig::default().with_backend(backend);
            FuzzyTracker::new(volume, contrast, config).track(seeds).unwrap()
        })
        .collect();
    let first = maps.remove(0);
    for other in &maps {
        assert_eq!(&first, other);
    }
    first
}

// =============================================================================
// Barrier
// =============================================================================

#[test]
fn closed_barrier_caps_far_side() {
    let volume = barrier(false);
    let map = track_all_backends(&volume, &seeds(&[(0, 0, 0)]));
    for (coord, strength) in volume.dims().iter().zip(map.as_slice()) {
        let expected = match coord {
            VoxelCoord { x: 0, y: 0, .. } => MAX_STRENGTH,
            VoxelCoord { x: 0 | 1, .. } => 255,
            _ => 125,
        };
        assert_eq!(*strength, expected, "at {coord}");
    }
}

#[test]
fn open_barrier_lets_strength_through() {
    let volume = barrier(true);
    let map = track_all_backends(&volume, &seeds(&[(0, 0, 0)]));
    for (coord, strength) in volume.dims().iter().zip(map.as_slice()) {
        let expected = match coord {
            VoxelCoord { x: 0, y: 0, .. } => MAX_STRENGTH,
            VoxelCoord { x: 2, y: 0..=3, .. } => 125,
            _ => 255,
        };
        assert_eq!(*strength, expected, "at {coord}");
    }
}

// =============================================================================
// Uniform grid
// =============================================================================

#[test]
fn opposite_corner_seeds_saturate_uniform_grid() {
    let dims = Dimensions::new(4, 3, 3);
    let volume = Volume::from_u16(dims, Spacing::default(), vec![700; dims.len()]).unwrap();
    let evaluator = |e: &EdgeSample| if e.a == e.b { MAX_STRENGTH } else { 0 };
    let mut tracker = FuzzyTracker::new(&volume, evaluator, TrackConfig::default());
    let map = tracker.track(&seeds(&[(0, 0, 0), (3, 2, 2)])).unwrap();
    assert!(map.as_slice().iter().all(|&s| s == MAX_STRENGTH));
    assert_eq!(map.reached_count(), dims.len());
}

#[test]
fn unreachable_voxels_stay_zero() {
    let dims = Dimensions::new(3, 1, 1);
    let volume = Volume::from_u8(dims, Spacing::default(), vec![1, 2, 1]).unwrap();
    let evaluator = |e: &EdgeSample| if e.a == e.b { MAX_STRENGTH } else { 0 };
    let mut tracker = FuzzyTracker::new(&volume, evaluator, TrackConfig::default());
    let map = tracker.track(&seeds(&[(0, 0, 0)])).unwrap();
    assert_eq!(map.as_slice(), &[MAX_STRENGTH, 0, 0]);
}

// =============================================================================
// Memoization
// =============================================================================

#[test]
fn recomputing_matches_cached_run() {
    let volume = barrier(true);
    let s = seeds(&[(4, 4, 0), (0, 2, 0)]);
    let cached = FuzzyTracker::new(&volume, contrast, TrackConfig::default())
        .track(&s)
        .unwrap();
    let config = TrackConfig::default().with_memoize(false);
    let recomputed = FuzzyTracker::new(&volume, contrast, config).track(&s).unwrap();
    assert_eq!(cached, recomputed);
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn no_seeds_exports_in_plane_affinities() {
    let volume = barrier(false);
    let mut tracker = FuzzyTracker::new(&volume, contrast, TrackConfig::default());
    let map = tracker.track(&SeedSet::new()).unwrap();
    let at = |x, y| map.strength_at(VoxelCoord::new(x, y, 0)).unwrap();
    // Left of the barrier: the y edge is uniform.
    assert_eq!(at(1, 0), 255);
    // Barrier column: its x and y edges.
    assert_eq!(at(2, 0), 255);
    // Corner with neither edge.
    assert_eq!(at(4, 4), 0);
    // Bottom row left of the barrier: only the x edge into it.
    assert_eq!(at(1, 4), 125);
}

#[test]
fn export_respects_axes() {
    let dims = Dimensions::new(2, 2, 2);
    let values = vec![10, 10, 10, 10, 60, 60, 60, 60];
    let volume = Volume::from_u8(dims, Spacing::default(), values).unwrap();
    let config = TrackConfig::default().with_export_axes(ExportAxes {
        x: false,
        y: false,
        z: true,
    });
    let map = FuzzyTracker::new(&volume, contrast, config)
        .track(&SeedSet::new())
        .unwrap();
    assert_eq!(map.as_slice(), &[205, 205, 205, 205, 0, 0, 0, 0]);
}

// =============================================================================
// Model-based evaluator
// =============================================================================

#[test]
fn additive_model_with_prior_reports_quality() {
    let dims = Dimensions::new(4, 1, 1);
    let volume = Volume::from_u8(dims, Spacing::default(), vec![50, 52, 51, 50]).unwrap();
    // Prior strongly favors the left half.
    let prior = ModelField::new(dims, Spacing::default(), vec![65534, 65534, 0, 0]).unwrap();
    let model = AdditiveModel::new()
        .with_gradient(WeightedFeature::new(
            Feature::Difference,
            FeatureFunction::new(Membership::Box, 0.0, 20.0),
            1.0,
        ))
        .with_prior_field(prior)
        .with_prior_weight(1.0);
    let config = AffinityConfig::default()
        .with_threshold_percent(60.0)
        .with_diagnostics(true);
    let evaluator = ModelAffinity::new(AffinityModel::from(model), config).unwrap();

    let mut tracker = FuzzyTracker::new(&volume, evaluator, TrackConfig::default());
    let map = tracker.track(&seeds(&[(0, 0, 0)])).unwrap();
    // Edges touching the zero-prior side fall to 1/2 and are cut.
    assert_eq!(map.as_slice(), &[MAX_STRENGTH, MAX_STRENGTH, 0, 0]);

    let evaluator = tracker.into_evaluator();
    assert!(evaluator.diagnostics().unwrap().evaluations() > 0);
    let report = evaluator.quality_report(&map).unwrap();
    assert_eq!(report.object_voxels, 2);
    // All prior mass lies inside the object.
    approx::assert_relative_eq!(report.f_s, 1.0);
}

#[test]
fn foreground_only_mode_across_backends() {
    let dims = Dimensions::new(4, 1, 1);
    let volume = Volume::from_u8(dims, Spacing::default(), vec![100, 10, 100, 100]).unwrap();
    for backend in QueueBackend::ALL {
        let config = TrackConfig::default()
            .with_backend(backend)
            .with_foreground_only(50);
        let map = FuzzyTracker::new(&volume, contrast, config)
            .track(&seeds(&[(0, 0, 0), (3, 0, 0)]))
            .unwrap();
        assert_eq!(map.as_slice(), &[MAX_STRENGTH, 0, 255, MAX_STRENGTH]);
    }
}
