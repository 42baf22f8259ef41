//! Weighted-sum model with spatial priors.
//!
//! The additive model normalizes every enabled term by the total weight, so
//! an edge that fully matches every term has affinity 1. Terms that depend
//! on one endpoint only (voxel intensity, prior field, tissue membership)
//! are accumulated separately for the two endpoints and the weaker side
//! wins after adjacency scaling.

use fuzzy_types::{FuzzyError, FuzzyResult, MAX_STRENGTH, Spacing};

use crate::evaluator::EdgeSample;
use crate::feature::{Feature, FeatureFunction, WeightedFeature};
use crate::field::ModelField;
use crate::joint::JointTable;
use crate::model::Terms;
use crate::tissue::TissueSet;

#[allow(clippy::cast_lossless)]
const FULL: f64 = MAX_STRENGTH as f64;

/// Intensity window applied to the lower and higher intensity of an edge.
///
/// A value's grade is the better of the two window functions. The window
/// term is the smaller of the enabled low and high terms.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntensityWindow {
    /// The two window functions.
    pub functions: [FeatureFunction; 2],
    /// Weight of the term on the lower intensity, if enabled.
    pub low_weight: Option<f64>,
    /// Weight of the term on the higher intensity, if enabled.
    pub high_weight: Option<f64>,
}

impl IntensityWindow {
    fn grade(&self, value: u16) -> f64 {
        let v = f64::from(value);
        self.functions[0].grade(v).max(self.functions[1].grade(v))
    }

    fn weight(&self) -> f64 {
        self.low_weight.unwrap_or(0.0) + self.high_weight.unwrap_or(0.0)
    }
}

/// A term and its weight.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Weighted<T> {
    term: T,
    weight: f64,
}

/// Normalized weighted sum of intensity, gradient and prior terms.
///
/// # Example
///
/// ```
/// use fuzzy_affinity::{AdditiveModel, Feature, FeatureFunction, WeightedFeature};
///
/// let model = AdditiveModel::new()
///     .with_gradient(WeightedFeature::new(
///         Feature::Difference,
///         FeatureFunction::gaussian(0.0, 50.0),
///         1.0,
///     ))
///     .with_voxel(FeatureFunction::gaussian(100.0, 30.0), 1.0);
/// model.validate().unwrap();
/// assert_eq!(model.total_weight(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdditiveModel {
    window: Option<IntensityWindow>,
    gradient: Vec<WeightedFeature>,
    voxel: Option<Weighted<FeatureFunction>>,
    prior: Option<ModelField>,
    prior_weight: f64,
    directedness: Option<ModelField>,
    joint: Option<Weighted<JointTable>>,
    tissues: Option<Weighted<TissueSet>>,
}

impl AdditiveModel {
    /// Creates a model with no terms.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the intensity window.
    #[must_use]
    pub fn with_window(mut self, window: IntensityWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Adds a gradient feature (`Difference`, `Sum` or `RelativeDifference`).
    #[must_use]
    pub fn with_gradient(mut self, feature: WeightedFeature) -> Self {
        self.gradient.push(feature);
        self
    }

    /// Enables the per-endpoint intensity term.
    #[must_use]
    pub fn with_voxel(mut self, function: FeatureFunction, weight: f64) -> Self {
        self.voxel = Some(Weighted {
            term: function,
            weight,
        });
        self
    }

    /// Attaches the prior probability field.
    #[must_use]
    pub fn with_prior_field(mut self, field: ModelField) -> Self {
        self.prior = Some(field);
        self
    }

    /// Weight of the per-endpoint prior term; 0 disables the term but keeps
    /// the field available to the joint histogram.
    #[must_use]
    pub const fn with_prior_weight(mut self, weight: f64) -> Self {
        self.prior_weight = weight;
        self
    }

    /// Attaches a directedness field that raises the `Difference` term.
    #[must_use]
    pub fn with_directedness(mut self, field: ModelField) -> Self {
        self.directedness = Some(field);
        self
    }

    /// Enables the joint lookup term.
    #[must_use]
    pub fn with_joint(mut self, table: JointTable, weight: f64) -> Self {
        self.joint = Some(Weighted {
            term: table,
            weight,
        });
        self
    }

    /// Enables the multi-tissue term.
    #[must_use]
    pub fn with_tissues(mut self, tissues: TissueSet, weight: f64) -> Self {
        self.tissues = Some(Weighted {
            term: tissues,
            weight,
        });
        self
    }

    /// Prior field, if any.
    #[must_use]
    pub const fn prior_field(&self) -> Option<&ModelField> {
        self.prior.as_ref()
    }

    /// Sum of the weights of every enabled term.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        let mut total = self.window.as_ref().map_or(0.0, IntensityWindow::weight);
        total += self.gradient.iter().map(|f| f.weight).sum::<f64>();
        total += self.voxel.as_ref().map_or(0.0, |v| v.weight);
        if self.prior.is_some() {
            total += self.prior_weight;
        }
        total += self.joint.as_ref().map_or(0.0, |j| j.weight);
        total += self.tissues.as_ref().map_or(0.0, |t| t.weight);
        total
    }

    fn needs_prior(&self) -> bool {
        self.prior_weight != 0.0
            || matches!(
                self.joint,
                Some(Weighted {
                    term: JointTable::Histogram(_),
                    ..
                })
            )
    }

    /// Checks that the enabled terms are complete and consistent.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::InvalidConfig`] when the prior term or a joint
    /// histogram is enabled without a prior field, a gradient term uses an
    /// intensity feature, a membership function is unusable, or the total
    /// weight is zero.
    pub fn validate(&self) -> FuzzyResult<()> {
        if self.needs_prior() && self.prior.is_none() {
            return Err(FuzzyError::invalid_config(
                "prior term or joint histogram enabled without a prior field",
            ));
        }
        if let Some(window) = &self.window {
            for f in &window.functions {
                f.validate()?;
            }
            if window.low_weight.is_none() && window.high_weight.is_none() {
                return Err(FuzzyError::invalid_config(
                    "intensity window has neither a low nor a high term",
                ));
            }
        }
        for g in &self.gradient {
            if matches!(g.feature, Feature::High | Feature::Low) {
                return Err(FuzzyError::invalid_config(format!(
                    "{:?} is an intensity feature, not a gradient feature",
                    g.feature
                )));
            }
            g.function.validate()?;
        }
        if let Some(voxel) = &self.voxel {
            voxel.term.validate()?;
        }
        let total = self.total_weight();
        if !total.is_finite() || total == 0.0 {
            return Err(FuzzyError::invalid_config(format!(
                "additive model total weight must be non-zero, got {total}"
            )));
        }
        Ok(())
    }

    pub(crate) fn bind_volume_spacing(&mut self, spacing: Spacing) -> FuzzyResult<()> {
        if let Some(prior) = &mut self.prior {
            prior.bind_volume_spacing(spacing)?;
        }
        if let Some(dir) = &mut self.directedness {
            dir.bind_volume_spacing(spacing)?;
        }
        Ok(())
    }

    fn gradient_grade(&self, g: &WeightedFeature, edge: &EdgeSample) -> f64 {
        let mut grade = g.grade(edge.high(), edge.low());
        if g.feature == Feature::Difference && edge.a != edge.b {
            if let Some(dir) = &self.directedness {
                let dv = 0.5 / FULL
                    * (f64::from(dir.value_at(edge.from)) + f64::from(dir.value_at(edge.to)));
                let with_gradient = (edge.a > edge.b) == !edge.background;
                grade = if with_gradient {
                    grade.max(1.0 - 2.0 * dv)
                } else {
                    grade.max(2.0 * dv - 1.0)
                };
            }
        }
        grade
    }

    pub(crate) fn evaluate(&self, edge: &EdgeSample) -> Terms {
        let unit = 1.0 / self.total_weight();
        let prior_unit = unit / FULL;
        let (high, low) = (edge.high(), edge.low());

        let mut shared = 0.0;
        if let Some(window) = &self.window {
            let low_term = window.low_weight.map(|w| unit * w * window.grade(low));
            let high_term = window.high_weight.map(|w| unit * w * window.grade(high));
            shared = match (low_term, high_term) {
                (Some(l), Some(h)) => l.min(h),
                (Some(t), None) | (None, Some(t)) => t,
                (None, None) => 0.0,
            };
        }
        for g in &self.gradient {
            shared += unit * g.weight * self.gradient_grade(g, edge);
        }

        let prior_values = self
            .prior
            .as_ref()
            .map(|p| (p.value_at(edge.from), p.value_at(edge.to)));
        if let Some(joint) = &self.joint {
            let value = match &joint.term {
                JointTable::Histogram(hist) => {
                    let (pa, pb) = prior_values.unwrap_or((0, 0));
                    hist.lookup(high, low, u32::from(pa) + u32::from(pb))
                }
                JointTable::FeatureMap(map) => map.lookup(low, high),
            };
            shared += prior_unit * joint.weight * f64::from(value);
        }

        let (mut ta, mut tb) = (shared, shared);
        if let Some(voxel) = &self.voxel {
            ta += unit * voxel.weight * voxel.term.grade(f64::from(edge.a));
            tb += unit * voxel.weight * voxel.term.grade(f64::from(edge.b));
        }
        let mut prior_term = 0.0;
        if self.prior_weight != 0.0 {
            if let Some((pa, pb)) = prior_values {
                let side = |p: u16| {
                    let p = f64::from(p);
                    if edge.background { FULL - p } else { p }
                };
                let (fa, fb) = (
                    prior_unit * self.prior_weight * side(pa),
                    prior_unit * self.prior_weight * side(pb),
                );
                ta += fa;
                tb += fb;
                prior_term = 0.5 * (fa + fb);
            }
        }
        if let Some(tissues) = &self.tissues {
            ta += unit * tissues.weight * tissues.term.membership(edge.a, edge.background);
            tb += unit * tissues.weight * tissues.term.membership(edge.b, edge.background);
        }

        Terms {
            a: ta,
            b: tb,
            prior: prior_term,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::feature::Membership;
    use crate::joint::{FeatureMap, JointHistogram};
    use crate::tissue::{Tissue, TissueKind};
    use approx::assert_relative_eq;
    use fuzzy_types::{Dimensions, VoxelCoord};

    fn edge(a: u16, b: u16) -> EdgeSample {
        EdgeSample::new(a, b, VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 0, 0))
    }

    fn flat_gradient(weight: f64) -> WeightedFeature {
        // Box wide enough to grade every difference 1.
        WeightedFeature::new(
            Feature::Difference,
            FeatureFunction::new(Membership::Box, 0.0, 1.0e6),
            weight,
        )
    }

    fn prior_field(values: [u16; 2]) -> ModelField {
        ModelField::new(Dimensions::new(2, 1, 1), Spacing::default(), values.to_vec()).unwrap()
    }

    #[test]
    fn test_prior_required() {
        let model = AdditiveModel::new().with_prior_weight(1.0);
        assert!(model.validate().unwrap_err().is_invalid_config());

        let hist = JointHistogram::new([vec![0], vec![0], vec![0]], vec![1]).unwrap();
        let model = AdditiveModel::new().with_joint(JointTable::Histogram(hist), 1.0);
        assert!(model.validate().unwrap_err().is_invalid_config());

        let model = AdditiveModel::new()
            .with_prior_field(prior_field([0, 0]))
            .with_prior_weight(1.0);
        model.validate().unwrap();
    }

    #[test]
    fn test_rejects_intensity_gradient_and_zero_weight() {
        let bad = WeightedFeature::new(Feature::High, FeatureFunction::gaussian(0.0, 1.0), 1.0);
        assert!(AdditiveModel::new().with_gradient(bad).validate().is_err());
        assert!(AdditiveModel::new().validate().is_err());
    }

    #[test]
    fn test_full_match_is_one() {
        let model = AdditiveModel::new()
            .with_gradient(flat_gradient(2.0))
            .with_voxel(FeatureFunction::new(Membership::Box, 50.0, 1000.0), 1.0);
        let t = model.evaluate(&edge(40, 60));
        assert_relative_eq!(t.a, 1.0);
        assert_relative_eq!(t.b, 1.0);
    }

    #[test]
    fn test_endpoint_terms_split() {
        let model = AdditiveModel::new()
            .with_gradient(flat_gradient(1.0))
            .with_voxel(FeatureFunction::new(Membership::Box, 10.0, 2.0), 1.0);
        let t = model.evaluate(&edge(10, 90));
        assert_relative_eq!(t.a, 1.0);
        assert_relative_eq!(t.b, 0.5);
    }

    #[test]
    fn test_window_takes_min_of_enabled_terms() {
        let window = IntensityWindow {
            functions: [
                FeatureFunction::new(Membership::Box, 10.0, 4.0),
                FeatureFunction::new(Membership::Box, 50.0, 4.0),
            ],
            low_weight: Some(1.0),
            high_weight: Some(1.0),
        };
        let model = AdditiveModel::new().with_window(window);
        // Both in a window: min(0.5, 0.5).
        assert_relative_eq!(model.evaluate(&edge(10, 50)).a, 0.5);
        // High out of both windows.
        assert_relative_eq!(model.evaluate(&edge(10, 30)).a, 0.0);

        let high_only = AdditiveModel::new().with_window(IntensityWindow {
            low_weight: None,
            ..window
        });
        assert_relative_eq!(high_only.evaluate(&edge(0, 50)).a, 1.0);
    }

    #[test]
    fn test_prior_inverted_for_background() {
        let model = AdditiveModel::new()
            .with_prior_field(prior_field([65534, 0]))
            .with_prior_weight(1.0);
        let fg = model.evaluate(&edge(5, 5));
        assert_relative_eq!(fg.a, 1.0);
        assert_relative_eq!(fg.b, 0.0);
        assert_relative_eq!(fg.prior, 0.5);

        let bg = model.evaluate(&edge(5, 5).with_background(true));
        assert_relative_eq!(bg.a, 0.0);
        assert_relative_eq!(bg.b, 1.0);
    }

    #[test]
    fn test_directedness_raises_difference() {
        let gradient = WeightedFeature::new(
            Feature::Difference,
            FeatureFunction::new(Membership::Box, 0.0, 2.0),
            1.0,
        );
        let model = AdditiveModel::new()
            .with_gradient(gradient)
            .with_directedness(prior_field([0, 0]));
        // dv = 0: falling edges (a > b) on the object side get 1 - 2dv = 1.
        assert_relative_eq!(model.evaluate(&edge(90, 10)).a, 1.0);
        // Rising edges get max(0, -1) = 0.
        assert_relative_eq!(model.evaluate(&edge(10, 90)).a, 0.0);
        // Background flips the direction.
        assert_relative_eq!(model.evaluate(&edge(10, 90).with_background(true)).a, 1.0);
    }

    #[test]
    fn test_joint_feature_map() {
        let map = FeatureMap::new(2, 1, vec![0, 65534, 0]).unwrap();
        let model = AdditiveModel::new().with_joint(JointTable::FeatureMap(map), 1.0);
        assert_relative_eq!(model.evaluate(&edge(1, 0)).a, 1.0);
        assert_relative_eq!(model.evaluate(&edge(1, 1)).a, 0.0);
    }

    #[test]
    fn test_joint_histogram_reads_prior_sum() {
        let hist = JointHistogram::new(
            [
                vec![i64::MAX, i64::MAX],
                vec![i64::MAX, i64::MAX],
                vec![100, i64::MAX],
            ],
            vec![0, 65534, 0, 0, 0, 0, 0, 0],
        )
        .unwrap();
        let model = AdditiveModel::new()
            .with_prior_field(prior_field([60, 60]))
            .with_joint(JointTable::Histogram(hist), 1.0);
        model.validate().unwrap();
        // Prior sum 120 lands in the second bin.
        assert_relative_eq!(model.evaluate(&edge(3, 3)).a, 1.0);
    }

    #[test]
    fn test_tissue_term() {
        let tissues = TissueSet::new(
            vec![
                Tissue::new(100.0, 5.0, TissueKind::Gaussian),
                Tissue::new(0.0, 5.0, TissueKind::Darkest),
            ],
            1,
        )
        .unwrap();
        let model = AdditiveModel::new().with_tissues(tissues, 1.0);
        let t = model.evaluate(&edge(100, 0));
        assert_relative_eq!(t.a, 1.0);
        assert!(t.b < 1e-6);
        let bg = model.evaluate(&edge(100, 0).with_background(true));
        assert_relative_eq!(bg.b, 1.0);
    }
}
