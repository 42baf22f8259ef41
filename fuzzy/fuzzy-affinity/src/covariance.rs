//! Gaussian feature-space model with Mahalanobis distances.

use fuzzy_types::{FuzzyError, FuzzyResult};
use nalgebra::{DMatrix, DVector};

use crate::feature::{Feature, RELATIVE_DIFFERENCE_SCALE};

/// Mean and inverse covariance of a training class.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaussianStats {
    mean: DVector<f64>,
    inv_covariance: DMatrix<f64>,
}

impl GaussianStats {
    /// Builds statistics from a mean and a covariance matrix.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::InvalidConfig`] if the matrix is not square,
    /// does not match the mean, or is singular.
    pub fn from_covariance(mean: DVector<f64>, covariance: DMatrix<f64>) -> FuzzyResult<Self> {
        check_shape(&mean, &covariance)?;
        let inv_covariance = covariance
            .try_inverse()
            .ok_or_else(|| FuzzyError::invalid_config("covariance matrix is singular"))?;
        Ok(Self {
            mean,
            inv_covariance,
        })
    }

    /// Uses an already inverted covariance matrix.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::InvalidConfig`] on a shape mismatch.
    pub fn from_inverse(mean: DVector<f64>, inv_covariance: DMatrix<f64>) -> FuzzyResult<Self> {
        check_shape(&mean, &inv_covariance)?;
        Ok(Self {
            mean,
            inv_covariance,
        })
    }

    /// Number of features.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Squared Mahalanobis distance of `x` from the mean.
    #[must_use]
    pub fn mahalanobis(&self, x: &DVector<f64>) -> f64 {
        let d = x - &self.mean;
        d.dot(&(&self.inv_covariance * &d))
    }
}

fn check_shape(mean: &DVector<f64>, matrix: &DMatrix<f64>) -> FuzzyResult<()> {
    let n = mean.len();
    if n == 0 || matrix.nrows() != n || matrix.ncols() != n {
        return Err(FuzzyError::invalid_config(format!(
            "covariance must be {n}x{n} for {n} features, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    Ok(())
}

/// Affinity from the distance of the pair's feature vector to an object
/// class, a background class, or both.
///
/// With forward statistics only the affinity is `exp(-d/2)`; with reverse
/// only it is `1 - exp(-d_r/2)`; with both it is `1 / (1 + exp((d - d_r)/2))`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CovarianceModel {
    features: Vec<Feature>,
    forward: Option<GaussianStats>,
    reverse: Option<GaussianStats>,
}

impl CovarianceModel {
    /// Creates the model over `features`, in the order the statistics use.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::InvalidConfig`] if no statistics are given or
    /// their dimension differs from the feature count.
    pub fn new(
        features: Vec<Feature>,
        forward: Option<GaussianStats>,
        reverse: Option<GaussianStats>,
    ) -> FuzzyResult<Self> {
        if forward.is_none() && reverse.is_none() {
            return Err(FuzzyError::invalid_config(
                "covariance model needs object or background statistics",
            ));
        }
        for stats in forward.iter().chain(reverse.iter()) {
            if stats.dim() != features.len() {
                return Err(FuzzyError::invalid_config(format!(
                    "covariance statistics have {} features, model has {}",
                    stats.dim(),
                    features.len()
                )));
            }
        }
        Ok(Self {
            features,
            forward,
            reverse,
        })
    }

    fn feature_vector(&self, high: u16, low: u16) -> DVector<f64> {
        DVector::from_iterator(
            self.features.len(),
            self.features.iter().map(|&f| match f {
                Feature::RelativeDifference => f.value(high, low) * RELATIVE_DIFFERENCE_SCALE,
                _ => f.value(high, low),
            }),
        )
    }

    /// Unscaled affinity in `[0, 1]` for a pair.
    #[must_use]
    pub fn evaluate(&self, high: u16, low: u16) -> f64 {
        let x = self.feature_vector(high, low);
        match (&self.forward, &self.reverse) {
            (Some(fwd), None) => (-0.5 * fwd.mahalanobis(&x)).exp(),
            (None, Some(rev)) => 1.0 - (-0.5 * rev.mahalanobis(&x)).exp(),
            (Some(fwd), Some(rev)) => {
                1.0 / (1.0 + (0.5 * (fwd.mahalanobis(&x) - rev.mahalanobis(&x))).exp())
            }
            (None, None) => 0.0,
        }
    }
}
