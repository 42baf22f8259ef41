//! Running sums over evaluated edges and the segmentation quality report.

use fuzzy_types::{MAX_STRENGTH, StrengthMap};

use crate::field::ModelField;

/// Running sums kept by an evaluator with diagnostics enabled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticSums {
    evaluations: u64,
    prior_sum: f64,
    affinity_sum: f64,
}

impl DiagnosticSums {
    pub(crate) fn record(&mut self, prior: f64, affinity: u16) {
        self.evaluations += 1;
        self.prior_sum += prior;
        self.affinity_sum += f64::from(affinity) / f64::from(MAX_STRENGTH);
    }

    /// Edges evaluated.
    #[must_use]
    pub const fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Sum of the prior-field contribution over evaluated edges.
    #[must_use]
    pub const fn prior_sum(&self) -> f64 {
        self.prior_sum
    }

    /// Sum of returned affinities, each normalized to `[0, 1]`.
    #[must_use]
    pub const fn affinity_sum(&self) -> f64 {
        self.affinity_sum
    }
}

/// Agreement between a strength map and a prior field.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualityReport {
    /// Voxels with positive strength.
    pub object_voxels: usize,
    /// Mean prior contribution per object voxel.
    pub f_b: f64,
    /// Mean normalized affinity per object voxel.
    pub f_t: f64,
    /// Prior mass inside the object over prior mass outside it plus the
    /// object's full-prior mass.
    pub f_s: f64,
}

impl QualityReport {
    /// Builds the report from a finished run.
    ///
    /// The ratios are 0 when the object is empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(sums: &DiagnosticSums, strengths: &StrengthMap, prior: &ModelField) -> Self {
        let dims = strengths.dims();
        let (mut object, mut inside, mut outside) = (0usize, 0.0, 0.0);
        for (index, coord) in dims.iter().enumerate() {
            let p = f64::from(prior.value_at(coord));
            if strengths.get(index) > 0 {
                object += 1;
                inside += p;
            } else {
                outside += p;
            }
        }
        if object == 0 {
            return Self {
                object_voxels: 0,
                f_b: 0.0,
                f_t: 0.0,
                f_s: 0.0,
            };
        }
        let q = object as f64;
        outside += f64::from(MAX_STRENGTH) * q;
        Self {
            object_voxels: object,
            f_b: sums.prior_sum / q,
            f_t: sums.affinity_sum / q,
            f_s: inside / outside,
        }
    }
}
