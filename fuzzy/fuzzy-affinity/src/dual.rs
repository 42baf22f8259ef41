//! Two-window model with a separation term.

use fuzzy_types::FuzzyResult;

use crate::feature::{FeatureFunction, gaussian};

/// Geometric mean of an intensity-window term and a gradient term.
///
/// Each window scores a pair by the smaller of its grades for `high` and
/// `low`; the better window wins. The gradient term is a zero-centered
/// Gaussian of `high - low`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DualModel {
    first: FeatureFunction,
    second: FeatureFunction,
    gradient_width: f64,
}

impl DualModel {
    /// Creates the model. Both windows are evaluated as Gaussians.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an unusable level or width.
    pub fn new(
        first: FeatureFunction,
        second: FeatureFunction,
        gradient_width: f64,
    ) -> FuzzyResult<Self> {
        first.validate()?;
        second.validate()?;
        FeatureFunction::gaussian(0.0, gradient_width).validate()?;
        Ok(Self {
            first,
            second,
            gradient_width,
        })
    }

    fn window(f: &FeatureFunction, high: u16, low: u16) -> f64 {
        let g = |v: u16| gaussian((f64::from(v) - f.level) / f.width);
        g(high).min(g(low))
    }

    /// Unscaled affinity in `[0, 1]` for a pair.
    #[must_use]
    pub fn evaluate(&self, high: u16, low: u16) -> f64 {
        let window =
            Self::window(&self.first, high, low).max(Self::window(&self.second, high, low));
        let separation = gaussian(f64::from(high - low) / self.gradient_width);
        (window * separation).sqrt()
    }
}
