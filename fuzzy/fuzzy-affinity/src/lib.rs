//! Pairwise affinity models for fuzzy connectedness.
//!
//! An affinity is the strength, in `[0, MAX_STRENGTH]`, with which two
//! face-adjacent voxels "hang together". The tracker asks an
//! [`AffinityEvaluator`] for the affinity of every edge it relaxes; any
//! closure `FnMut(&EdgeSample) -> u16` qualifies, and [`ModelAffinity`]
//! wraps the trained models in this crate:
//!
//! - [`ParametricModel`]: product of membership functions over intensity
//!   features
//! - [`HistogramModel`]: trained `(high, low)` histogram, optionally against
//!   a background histogram
//! - [`CovarianceModel`]: Mahalanobis distance to object and/or background
//!   statistics
//! - [`AdditiveModel`]: normalized weighted sum of intensity, gradient, prior
//!   field, joint table and multi-tissue terms
//! - [`DualModel`]: two intensity windows combined with a separation term
//!
//! Model outputs are multiplied by the edge's adjacency and cut to 0 below
//! the configured threshold.
//!
//! # Example
//!
//! ```
//! use fuzzy_affinity::{
//!     AffinityConfig, AffinityEvaluator, AffinityModel, DualModel, EdgeSample, FeatureFunction,
//!     ModelAffinity,
//! };
//! use fuzzy_types::VoxelCoord;
//!
//! let dual = DualModel::new(
//!     FeatureFunction::gaussian(80.0, 15.0),
//!     FeatureFunction::gaussian(200.0, 15.0),
//!     25.0,
//! )
//! .unwrap();
//! let mut affinity =
//!     ModelAffinity::new(AffinityModel::Dual(dual), AffinityConfig::default()).unwrap();
//!
//! let edge = EdgeSample::new(200, 200, VoxelCoord::origin(), VoxelCoord::new(0, 1, 0));
//! assert_eq!(affinity.affinity(&edge), 65534);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod additive;
mod covariance;
mod diagnostics;
mod dual;
mod evaluator;
mod feature;
mod field;
mod histogram;
mod joint;
mod model;
mod parametric;
mod tissue;

pub use additive::{AdditiveModel, IntensityWindow};
pub use covariance::{CovarianceModel, GaussianStats};
pub use diagnostics::{DiagnosticSums, QualityReport};
pub use dual::DualModel;
pub use evaluator::{AffinityEvaluator, EdgeSample};
pub use feature::{
    Feature, FeatureFunction, Membership, RELATIVE_DIFFERENCE_SCALE, WeightedFeature, gaussian,
};
pub use field::ModelField;
pub use histogram::HistogramModel;
pub use joint::{FEATURE_MAP_LEVELS, FeatureMap, JointHistogram, JointTable};
pub use model::{AffinityConfig, AffinityModel, ModelAffinity};
pub use parametric::ParametricModel;
pub use tissue::{Tissue, TissueKind, TissueSet};
