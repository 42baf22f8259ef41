//! Fuzzy connectedness tracking on 3D voxel volumes.
//!
//! The strength of connectedness of a voxel to a seed set is the largest,
//! over all face-connected paths from a seed, of the weakest edge affinity
//! along the path. [`FuzzyTracker`] computes it for every voxel with a
//! label-correcting max-min Dijkstra: voxels are popped from a
//! [`PriorityStore`](fuzzy_queue::PriorityStore) in non-increasing strength
//! order and their six neighbors are raised to `min(strength, affinity)`.
//!
//! - The store is chosen by [`TrackConfig::backend`](fuzzy_types::TrackConfig)
//!   or passed explicitly to [`FuzzyTracker::track_with`]; every backend
//!   yields the same strength map.
//! - Affinities come from any [`AffinityEvaluator`](fuzzy_affinity::AffinityEvaluator)
//!   and are memoized per edge unless caching is disabled or its allocation
//!   fails.
//! - Adjacency along each axis is scaled by voxel spacing when anisotropy
//!   correction is on.
//! - Foreground-only mode keeps voxels darker than a threshold out of the
//!   propagation.
//! - A run without seeds exports edge affinities instead.
//!
//! # Example
//!
//! ```
//! use fuzzy_affinity::EdgeSample;
//! use fuzzy_track::FuzzyTracker;
//! use fuzzy_types::{
//!     Dimensions, MAX_STRENGTH, QueueBackend, SeedSet, Spacing, TrackConfig, Volume, VoxelCoord,
//! };
//!
//! // Two bright regions split by a dark column.
//! let dims = Dimensions::new(5, 2, 1);
//! let values = vec![200, 200, 0, 200, 200, 200, 200, 0, 200, 200];
//! let volume = Volume::from_u8(dims, Spacing::default(), values).unwrap();
//! let contrast = |e: &EdgeSample| 255 - (e.high() - e.low());
//!
//! let config = TrackConfig::default().with_backend(QueueBackend::DoublyLinked);
//! let mut tracker = FuzzyTracker::new(&volume, contrast, config);
//! let seeds: SeedSet = [VoxelCoord::new(0, 0, 0)].into_iter().collect();
//! let strengths = tracker.track(&seeds).unwrap();
//!
//! assert_eq!(strengths.strength_at(VoxelCoord::new(0, 0, 0)), Some(MAX_STRENGTH));
//! assert_eq!(strengths.strength_at(VoxelCoord::new(1, 1, 0)), Some(255));
//! assert_eq!(strengths.strength_at(VoxelCoord::new(4, 0, 0)), Some(55));
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod cache;
mod entry;
mod export;
mod tracker;

pub use entry::QueueEntry;
pub use tracker::FuzzyTracker;
