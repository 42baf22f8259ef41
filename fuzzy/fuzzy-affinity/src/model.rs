//! Model selection, thresholding and the evaluator wrapper.

use fuzzy_types::{FuzzyError, FuzzyResult, MAX_STRENGTH, StrengthMap, Volume};
use tracing::debug;

use crate::additive::AdditiveModel;
use crate::covariance::CovarianceModel;
use crate::diagnostics::{DiagnosticSums, QualityReport};
use crate::dual::DualModel;
use crate::evaluator::{AffinityEvaluator, EdgeSample};
use crate::field::ModelField;
use crate::histogram::HistogramModel;
use crate::parametric::ParametricModel;

/// Unscaled affinity of each endpoint plus the prior contribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Terms {
    pub(crate) a: f64,
    pub(crate) b: f64,
    pub(crate) prior: f64,
}

impl Terms {
    const fn symmetric(value: f64) -> Self {
        Self {
            a: value,
            b: value,
            prior: 0.0,
        }
    }
}

/// The affinity function family.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AffinityModel {
    /// Product of per-feature memberships.
    Parametric(ParametricModel),
    /// Trained 2D histogram.
    Histogram(HistogramModel),
    /// Mahalanobis distance to object and/or background statistics.
    Covariance(CovarianceModel),
    /// Normalized weighted sum with spatial priors.
    Additive(Box<AdditiveModel>),
    /// Two intensity windows with a separation term.
    Dual(DualModel),
}

impl AffinityModel {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Parametric(_) => "parametric",
            Self::Histogram(_) => "histogram",
            Self::Covariance(_) => "covariance",
            Self::Additive(_) => "additive",
            Self::Dual(_) => "dual",
        }
    }

    /// Prior field used by the model, if any.
    #[must_use]
    pub fn prior_field(&self) -> Option<&ModelField> {
        match self {
            Self::Additive(model) => model.prior_field(),
            _ => None,
        }
    }

    fn terms(&self, edge: &EdgeSample) -> Terms {
        let (high, low) = (edge.high(), edge.low());
        match self {
            Self::Parametric(m) => Terms::symmetric(m.evaluate(high, low)),
            Self::Histogram(m) => Terms::symmetric(m.evaluate(high, low)),
            Self::Covariance(m) => Terms::symmetric(m.evaluate(high, low)),
            Self::Additive(m) => m.evaluate(edge),
            Self::Dual(m) => Terms::symmetric(m.evaluate(high, low)),
        }
    }
}

impl From<AdditiveModel> for AffinityModel {
    fn from(model: AdditiveModel) -> Self {
        Self::Additive(Box::new(model))
    }
}

/// Settings shared by every model.
///
/// # Example
///
/// ```
/// use fuzzy_affinity::AffinityConfig;
///
/// let config = AffinityConfig::default().with_threshold_percent(10.0);
/// assert!(config.validate().is_empty());
/// assert!(AffinityConfig::default().with_threshold_percent(150.0).validate().len() == 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffinityConfig {
    threshold_percent: f64,
    diagnostics: bool,
}

impl AffinityConfig {
    /// Affinities below this percentage of `MAX_STRENGTH` become 0.
    #[must_use]
    pub const fn with_threshold_percent(mut self, percent: f64) -> Self {
        self.threshold_percent = percent;
        self
    }

    /// Keep running sums for a [`QualityReport`].
    #[must_use]
    pub const fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Threshold percentage.
    #[must_use]
    pub const fn threshold_percent(&self) -> f64 {
        self.threshold_percent
    }

    /// Whether diagnostics are kept.
    #[must_use]
    pub const fn diagnostics(&self) -> bool {
        self.diagnostics
    }

    /// Threshold in strength units.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold_percent * 0.01 * f64::from(MAX_STRENGTH)
    }

    /// Lists configuration problems; empty when valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(0.0..=100.0).contains(&self.threshold_percent) {
            errors.push(format!(
                "threshold percent must be in [0, 100], got {}",
                self.threshold_percent
            ));
        }
        errors
    }
}

/// An [`AffinityModel`] with thresholding and optional diagnostics.
///
/// # Example
///
/// ```
/// use fuzzy_affinity::{
///     AffinityConfig, AffinityEvaluator, AffinityModel, EdgeSample, Feature, FeatureFunction,
///     ModelAffinity, ParametricModel, WeightedFeature,
/// };
/// use fuzzy_types::VoxelCoord;
///
/// let model = ParametricModel::new(vec![WeightedFeature::new(
///     Feature::Difference,
///     FeatureFunction::gaussian(0.0, 10.0),
///     1.0,
/// )])
/// .unwrap();
/// let mut affinity = ModelAffinity::new(
///     AffinityModel::Parametric(model),
///     AffinityConfig::default().with_threshold_percent(50.0),
/// )
/// .unwrap();
///
/// let edge = |a, b| EdgeSample::new(a, b, VoxelCoord::origin(), VoxelCoord::new(1, 0, 0));
/// assert_eq!(affinity.affinity(&edge(7, 7)), 65534);
/// assert_eq!(affinity.affinity(&edge(100, 0)), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ModelAffinity {
    model: AffinityModel,
    config: AffinityConfig,
    threshold: f64,
    sums: Option<DiagnosticSums>,
}

impl ModelAffinity {
    /// Validates `model` and `config` and builds the evaluator.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::InvalidConfig`] if the config or the model is
    /// invalid.
    pub fn new(model: AffinityModel, config: AffinityConfig) -> FuzzyResult<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(FuzzyError::invalid_config(errors.join("; ")));
        }
        if let AffinityModel::Additive(additive) = &model {
            additive.validate()?;
        }
        Ok(Self {
            threshold: config.threshold(),
            sums: config.diagnostics().then(DiagnosticSums::default),
            model,
            config,
        })
    }

    /// The wrapped model.
    #[must_use]
    pub const fn model(&self) -> &AffinityModel {
        &self.model
    }

    /// The config the evaluator was built with.
    #[must_use]
    pub const fn config(&self) -> &AffinityConfig {
        &self.config
    }

    /// Running sums, when diagnostics are enabled.
    #[must_use]
    pub const fn diagnostics(&self) -> Option<&DiagnosticSums> {
        self.sums.as_ref()
    }

    /// Quality report for a finished run. `None` without diagnostics or a
    /// prior field.
    #[must_use]
    pub fn quality_report(&self, strengths: &StrengthMap) -> Option<QualityReport> {
        let sums = self.sums.as_ref()?;
        let prior = self.model.prior_field()?;
        Some(QualityReport::compute(sums, strengths, prior))
    }
}

impl AffinityEvaluator for ModelAffinity {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn affinity(&mut self, edge: &EdgeSample) -> u16 {
        let terms = self.model.terms(edge);
        let scaled = (terms.a * edge.adjacency).min(terms.b * edge.adjacency);
        let value = if scaled >= self.threshold && scaled > 0.0 {
            scaled.min(f64::from(MAX_STRENGTH)) as u16
        } else {
            0
        };
        if let Some(sums) = &mut self.sums {
            sums.record(terms.prior, value);
        }
        value
    }

    fn prepare(&mut self, volume: &Volume) -> FuzzyResult<()> {
        match &mut self.model {
            AffinityModel::Histogram(hist) => {
                let largest = volume.largest_value();
                if largest > hist.largest_value() {
                    return Err(FuzzyError::data_incompatibility(format!(
                        "volume intensity {largest} exceeds histogram range {}",
                        hist.largest_value()
                    )));
                }
            }
            AffinityModel::Additive(additive) => {
                additive.bind_volume_spacing(volume.spacing())?;
            }
            _ => {}
        }
        if let Some(sums) = &mut self.sums {
            *sums = DiagnosticSums::default();
        }
        debug!(
            model = self.model.name(),
            threshold = self.threshold,
            "Prepared affinity model"
        );
        Ok(())
    }
}
