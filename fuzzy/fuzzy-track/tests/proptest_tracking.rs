//! Property-based tests for the tracker against a brute-force max-min
//! oracle.
//!
//! Run with: cargo test -p fuzzy-track -- proptest

#![allow(clippy::unwrap_used)]

use fuzzy_affinity::EdgeSample;
use fuzzy_track::FuzzyTracker;
use fuzzy_types::{
    Dimensions, Direction, MAX_STRENGTH, QueueBackend, SeedSet, Spacing, StrengthMap, TrackConfig,
    Volume, VoxelCoord,
};
use proptest::prelude::*;

const DIMS: Dimensions = Dimensions::new(3, 3, 3);

// =============================================================================
// Helpers
// =============================================================================

/// Symmetric evaluator with plenty of ties and some zero edges.
fn affinity(a: u16, b: u16) -> u16 {
    let diff = a.abs_diff(b);
    if diff > 6 { 0 } else { (7 - diff) * 1000 }
}

fn evaluator(e: &EdgeSample) -> u16 {
    affinity(e.a, e.b)
}

fn volume(values: Vec<u8>) -> Volume {
    Volume::from_u8(DIMS, Spacing::default(), values).unwrap()
}

fn track(volume: &Volume, seeds: &SeedSet, backend: QueueBackend) -> StrengthMap {
    let config = TrackConfig::default()
        .with_backend(backend)
        .with_anisotropy_correction(false);
    FuzzyTracker::new(volume, evaluator, config)
        .track(seeds)
        .unwrap()
}

/// Relaxes every edge until nothing changes.
fn oracle(volume: &Volume, seeds: &SeedSet) -> Vec<u16> {
    let mut s = vec![0u16; DIMS.len()];
    for seed in seeds.iter() {
        s[DIMS.index(seed).unwrap()] = MAX_STRENGTH;
    }
    let mut changed = true;
    while changed {
        changed = false;
        for (i, coord) in DIMS.iter().enumerate() {
            for direction in Direction::ALL {
                let Some(j) = DIMS.index(coord.step(direction)) else {
                    continue;
                };
                let candidate = s[i].min(affinity(volume.value(i), volume.value(j)));
                if candidate > s[j] {
                    s[j] = candidate;
                    changed = true;
                }
            }
        }
    }
    s
}

fn values() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..16, DIMS.len())
}

fn seed_coords() -> impl Strategy<Value = Vec<(i32, i32, i32)>> {
    prop::collection::vec((0i32..3, 0i32..3, 0i32..3), 1..4)
}

fn seed_set(coords: &[(i32, i32, i32)]) -> SeedSet {
    coords.iter().map(|&c| VoxelCoord::from(c)).collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn proptest_matches_oracle(values in values(), coords in seed_coords()) {
        let volume = volume(values);
        let seeds = seed_set(&coords);
        let map = track(&volume, &seeds, QueueBackend::SinglyLinked);
        let expected = oracle(&volume, &seeds);
        prop_assert_eq!(map.as_slice(), expected.as_slice());
    }

    #[test]
    fn proptest_backends_identical(values in values(), coords in seed_coords()) {
        let volume = volume(values);
        let seeds = seed_set(&coords);
        let singly = track(&volume, &seeds, QueueBackend::SinglyLinked);
        let doubly = track(&volume, &seeds, QueueBackend::DoublyLinked);
        let hashed = track(&volume, &seeds, QueueBackend::HashedHeap);
        prop_assert_eq!(&singly, &doubly);
        prop_assert_eq!(&singly, &hashed);
    }

    #[test]
    fn proptest_seeds_are_max(values in values(), coords in seed_coords()) {
        let volume = volume(values);
        let seeds = seed_set(&coords);
        let map = track(&volume, &seeds, QueueBackend::DoublyLinked);
        for seed in seeds.iter() {
            prop_assert_eq!(map.strength_at(seed), Some(MAX_STRENGTH));
        }
    }

    #[test]
    fn proptest_superposition(values in values(), coords in seed_coords()) {
        let volume = volume(values);
        let together = track(&volume, &seed_set(&coords), QueueBackend::HashedHeap);
        let mut merged = StrengthMap::new(DIMS).unwrap();
        for &c in &coords {
            let single = track(&volume, &seed_set(&[c]), QueueBackend::HashedHeap);
            merged.merge_max(&single).unwrap();
        }
        prop_assert_eq!(together, merged);
    }
}
