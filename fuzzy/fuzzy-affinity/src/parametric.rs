//! Product-of-memberships model.

use fuzzy_types::FuzzyResult;

use crate::feature::WeightedFeature;

/// Multiplies one factor per feature: `w * m(f) + 1 - max(w, 0)`.
///
/// A weight of 1 makes the factor the bare membership grade; a weight of 0
/// makes it 1 so the feature has no effect; a negative weight lowers the
/// affinity of pairs the feature matches.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParametricModel {
    features: Vec<WeightedFeature>,
}

impl ParametricModel {
    /// Creates the model.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a membership function is unusable.
    pub fn new(features: Vec<WeightedFeature>) -> FuzzyResult<Self> {
        for f in &features {
            f.function.validate()?;
        }
        Ok(Self { features })
    }

    /// Configured features.
    #[must_use]
    pub fn features(&self) -> &[WeightedFeature] {
        &self.features
    }

    /// Unscaled affinity in `[0, 1]` for a pair.
    #[must_use]
    pub fn evaluate(&self, high: u16, low: u16) -> f64 {
        self.features
            .iter()
            .map(|f| f.weight * f.grade(high, low) + 1.0 - f.weight.max(0.0))
            .product()
    }
}
