//! Multi-tissue intensity membership.

use fuzzy_types::{FuzzyError, FuzzyResult};

use crate::feature::gaussian;

/// How a tissue's membership behaves beyond its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TissueKind {
    /// Gaussian on both sides.
    #[default]
    Gaussian,
    /// Full membership above the level (the brightest tissue).
    Brightest,
    /// Full membership below the level (the darkest tissue).
    Darkest,
}

/// One tissue class.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tissue {
    /// Mean intensity.
    pub level: f64,
    /// Spread; must be positive.
    pub width: f64,
    /// Shape.
    pub kind: TissueKind,
}

impl Tissue {
    /// Creates a tissue class.
    #[must_use]
    pub const fn new(level: f64, width: f64, kind: TissueKind) -> Self {
        Self { level, width, kind }
    }

    /// Membership of an intensity in this tissue.
    #[must_use]
    #[inline]
    pub fn membership(&self, value: f64) -> f64 {
        let xrel = (value - self.level) / self.width;
        match self.kind {
            TissueKind::Brightest if xrel > 0.0 => 1.0,
            TissueKind::Darkest if xrel < 0.0 => 1.0,
            _ => gaussian(xrel),
        }
    }
}

/// Tissue classes split into a foreground prefix and a background suffix.
///
/// # Example
///
/// ```
/// use fuzzy_affinity::{Tissue, TissueKind, TissueSet};
///
/// let set = TissueSet::new(
///     vec![
///         Tissue::new(100.0, 10.0, TissueKind::Gaussian),
///         Tissue::new(300.0, 10.0, TissueKind::Brightest),
///     ],
///     1,
/// )
/// .unwrap();
/// assert_eq!(set.membership(100, false), 1.0);
/// assert_eq!(set.membership(900, true), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TissueSet {
    tissues: Vec<Tissue>,
    foreground: usize,
}

impl TissueSet {
    /// Creates a set whose first `foreground` tissues belong to the object.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::InvalidConfig`] if `foreground` exceeds the
    /// number of tissues or a width is not positive.
    pub fn new(tissues: Vec<Tissue>, foreground: usize) -> FuzzyResult<Self> {
        if foreground > tissues.len() {
            return Err(FuzzyError::invalid_config(format!(
                "{foreground} foreground tissues requested but only {} defined",
                tissues.len()
            )));
        }
        if let Some(t) = tissues
            .iter()
            .find(|t| !(t.width.is_finite() && t.width > 0.0) || !t.level.is_finite())
        {
            return Err(FuzzyError::invalid_config(format!(
                "tissue at level {} has invalid width {}",
                t.level, t.width
            )));
        }
        Ok(Self {
            tissues,
            foreground,
        })
    }

    /// Foreground tissues.
    #[must_use]
    pub fn foreground(&self) -> &[Tissue] {
        &self.tissues[..self.foreground]
    }

    /// Background tissues.
    #[must_use]
    pub fn background(&self) -> &[Tissue] {
        &self.tissues[self.foreground..]
    }

    /// Best membership of `value` among the foreground tissues, or among the
    /// background tissues when `background` is set. 0 for an empty subset.
    #[must_use]
    pub fn membership(&self, value: u16, background: bool) -> f64 {
        let subset = if background {
            self.background()
        } else {
            self.foreground()
        };
        subset
            .iter()
            .map(|t| t.membership(f64::from(value)))
            .fold(0.0, f64::max)
    }
}
