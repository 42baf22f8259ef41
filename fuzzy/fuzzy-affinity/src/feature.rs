//! Intensity-pair features and membership functions.

use fuzzy_types::{FuzzyError, FuzzyResult};

/// A scalar derived from the higher and lower intensity of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Feature {
    /// The higher intensity.
    High,
    /// The lower intensity.
    Low,
    /// `high - low`.
    Difference,
    /// `high + low`.
    Sum,
    /// `(high - low) / (high + low)`, 0 when both are 0.
    RelativeDifference,
}

/// Factor applied to [`Feature::RelativeDifference`] inside the covariance
/// model so it shares the integer range of the other features.
pub const RELATIVE_DIFFERENCE_SCALE: f64 = 65535.0;

impl Feature {
    /// All features in their conventional order.
    pub const ALL: [Self; 5] = [
        Self::High,
        Self::Low,
        Self::Difference,
        Self::Sum,
        Self::RelativeDifference,
    ];

    /// Evaluates the feature for an ordered intensity pair.
    ///
    /// # Example
    ///
    /// ```
    /// use fuzzy_affinity::Feature;
    ///
    /// assert_eq!(Feature::Difference.value(30, 10), 20.0);
    /// assert_eq!(Feature::RelativeDifference.value(30, 10), 0.5);
    /// assert_eq!(Feature::RelativeDifference.value(0, 0), 0.0);
    /// ```
    #[must_use]
    #[inline]
    pub fn value(self, high: u16, low: u16) -> f64 {
        let (h, l) = (f64::from(high), f64::from(low));
        match self {
            Self::High => h,
            Self::Low => l,
            Self::Difference => h - l,
            Self::Sum => h + l,
            Self::RelativeDifference => {
                if high == 0 && low == 0 {
                    0.0
                } else {
                    (h - l) / (h + l)
                }
            }
        }
    }
}

/// Shape of a membership function over `xrel = (value - level) / width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Membership {
    /// `exp(-xrel² / 2)`.
    #[default]
    Gaussian,
    /// `xrel + 1/2` clamped to `[0, 1]`.
    Ramp,
    /// 1 inside `|xrel| <= 1/2`, 0 outside.
    Box,
}

impl Membership {
    /// Membership grade of a normalized offset.
    #[must_use]
    #[inline]
    pub fn grade(self, xrel: f64) -> f64 {
        match self {
            Self::Gaussian => gaussian(xrel),
            Self::Ramp => (xrel + 0.5).clamp(0.0, 1.0),
            Self::Box => {
                if (-0.5..=0.5).contains(&xrel) {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Unnormalized Gaussian `exp(-x² / 2)`.
#[must_use]
#[inline]
pub fn gaussian(x: f64) -> f64 {
    (-0.5 * x * x).exp()
}

/// A membership function with its center and width.
///
/// # Example
///
/// ```
/// use fuzzy_affinity::{FeatureFunction, Membership};
///
/// let f = FeatureFunction::new(Membership::Box, 100.0, 20.0);
/// assert_eq!(f.grade(109.0), 1.0);
/// assert_eq!(f.grade(111.0), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureFunction {
    /// Shape.
    pub membership: Membership,
    /// Center.
    pub level: f64,
    /// Width; must be positive.
    pub width: f64,
}

impl FeatureFunction {
    /// Creates a membership function.
    #[must_use]
    pub const fn new(membership: Membership, level: f64, width: f64) -> Self {
        Self {
            membership,
            level,
            width,
        }
    }

    /// Gaussian membership function.
    #[must_use]
    pub const fn gaussian(level: f64, width: f64) -> Self {
        Self::new(Membership::Gaussian, level, width)
    }

    /// Grade of `value`.
    #[must_use]
    #[inline]
    pub fn grade(&self, value: f64) -> f64 {
        self.membership.grade((value - self.level) / self.width)
    }

    /// Checks that level and width are usable.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::InvalidConfig`] for a non-positive width or a
    /// non-finite level.
    pub fn validate(&self) -> FuzzyResult<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(FuzzyError::invalid_config(format!(
                "membership width must be positive, got {}",
                self.width
            )));
        }
        if !self.level.is_finite() {
            return Err(FuzzyError::invalid_config("membership level must be finite"));
        }
        Ok(())
    }
}

/// A feature with a membership function and a weight.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedFeature {
    /// The feature evaluated on the intensity pair.
    pub feature: Feature,
    /// Membership function applied to the feature value.
    pub function: FeatureFunction,
    /// Weight of this term.
    pub weight: f64,
}

impl WeightedFeature {
    /// Creates a weighted feature term.
    #[must_use]
    pub const fn new(feature: Feature, function: FeatureFunction, weight: f64) -> Self {
        Self {
            feature,
            function,
            weight,
        }
    }

    /// Membership grade of this feature for the pair.
    #[must_use]
    #[inline]
    pub fn grade(&self, high: u16, low: u16) -> f64 {
        self.function.grade(self.feature.value(high, low))
    }
}
