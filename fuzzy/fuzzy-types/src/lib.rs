//! Core types for fuzzy connectedness on 3D voxel grids.
//!
//! This crate holds the data model shared by the priority stores, the
//! affinity models and the tracker:
//!
//! - [`VoxelCoord`], [`Direction`], [`Axis`]: lattice addressing
//! - [`Dimensions`], [`Spacing`], [`AdjacencyScales`]: grid geometry
//! - [`Volume`]: read-only 8- or 16-bit intensities
//! - [`StrengthMap`]: per-voxel connectedness in `[0, MAX_STRENGTH]`
//! - [`SeedSet`], [`SeedMask`], [`Registration`]: seed input
//! - [`TrackConfig`]: run configuration
//! - [`FuzzyError`]: the error type of every fuzzy crate
//!
//! # Example
//!
//! ```
//! use fuzzy_types::{Dimensions, Spacing, Volume, VoxelCoord};
//!
//! let dims = Dimensions::new(4, 4, 2);
//! let volume = Volume::from_u8(dims, Spacing::new(1.0, 1.0, 2.5), vec![0; dims.len()]).unwrap();
//! assert_eq!(volume.value_at(VoxelCoord::new(3, 3, 1)), Some(0));
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod error;
mod grid;
mod registration;
mod seeds;
mod strength;
mod volume;
mod voxel;

pub use config::{ExportAxes, QueueBackend, TrackConfig};
pub use error::{AllocationTarget, FuzzyError, FuzzyResult, try_filled};
pub use grid::{AdjacencyScales, Dimensions, Spacing};
pub use registration::{Registration, Rotation};
pub use seeds::{SeedMask, SeedSet};
pub use strength::{MAX_STRENGTH, StrengthMap};
pub use volume::{Samples, Volume};
pub use voxel::{Axis, Direction, VoxelCoord};

// Re-export nalgebra so dependents build registrations with the same version.
pub use nalgebra;
