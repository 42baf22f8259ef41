//! Precomputed joint lookup tables for the additive model.

use fuzzy_types::{FuzzyError, FuzzyResult};

/// Joint histogram over `(high + low, high - low, prior(a) + prior(b))`.
///
/// Each axis has a table of bin upper edges; a value falls in the first bin
/// whose edge is at least the value, and in the last bin if it exceeds every
/// edge. Counts are scaled to `[0, MAX_STRENGTH]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointHistogram {
    edges: [Vec<i64>; 3],
    counts: Vec<u16>,
}

impl JointHistogram {
    /// Creates a histogram with `n` bins per axis.
    ///
    /// `counts` is indexed `[sum_bin][difference_bin][prior_bin]`, last
    /// index fastest.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::InvalidConfig`] if the three edge tables do not
    /// share one non-zero length `n`, an edge table is not sorted, or
    /// `counts` does not hold `n³` values.
    pub fn new(edges: [Vec<i64>; 3], counts: Vec<u16>) -> FuzzyResult<Self> {
        let n = edges[0].len();
        if n == 0 || edges.iter().any(|e| e.len() != n) {
            return Err(FuzzyError::invalid_config(
                "joint histogram axes must have the same non-zero number of bins",
            ));
        }
        if edges.iter().any(|e| e.windows(2).any(|w| w[0] > w[1])) {
            return Err(FuzzyError::invalid_config(
                "joint histogram bin edges must be non-decreasing",
            ));
        }
        if counts.len() != n * n * n {
            return Err(FuzzyError::invalid_config(format!(
                "joint histogram with {n} bins per axis needs {} counts, got {}",
                n * n * n,
                counts.len()
            )));
        }
        Ok(Self { edges, counts })
    }

    /// Bins per axis.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.edges[0].len()
    }

    fn bin(&self, axis: usize, value: i64) -> usize {
        let edges = &self.edges[axis];
        edges
            .iter()
            .position(|&edge| value <= edge)
            .unwrap_or(edges.len() - 1)
    }

    /// Scaled count for an edge.
    #[must_use]
    pub fn lookup(&self, high: u16, low: u16, prior_sum: u32) -> u16 {
        let n = self.bins();
        let s = self.bin(0, i64::from(high) + i64::from(low));
        let d = self.bin(1, i64::from(high) - i64::from(low));
        let p = self.bin(2, i64::from(prior_sum));
        self.counts[(s * n + d) * n + p]
    }
}

/// Triangular `(low, high)` lookup table with gray-level compression.
///
/// Intensities are mapped onto `levels` gray levels (identity when the
/// largest intensity already fits) and the table stores one value for each
/// pair `low_level <= high_level`, row by row.
///
/// # Example
///
/// ```
/// use fuzzy_affinity::FeatureMap;
///
/// // Two levels: pairs (0,0), (0,1), (1,1).
/// let map = FeatureMap::new(2, 1, vec![10, 20, 30]).unwrap();
/// assert_eq!(map.lookup(0, 1), 20);
/// assert_eq!(map.lookup(1, 1), 30);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureMap {
    levels: usize,
    largest_value: u16,
    values: Vec<u16>,
}

/// Gray levels used by feature maps produced for 12-bit data.
pub const FEATURE_MAP_LEVELS: usize = 4096;

impl FeatureMap {
    /// Creates a feature map over `levels` gray levels for intensities up to
    /// `largest_value`.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::InvalidConfig`] if `levels` is 0 or `values` does
    /// not hold `levels * (levels + 1) / 2` entries.
    pub fn new(levels: usize, largest_value: u16, values: Vec<u16>) -> FuzzyResult<Self> {
        let expected = levels * (levels + 1) / 2;
        if levels == 0 || values.len() != expected {
            return Err(FuzzyError::invalid_config(format!(
                "feature map with {levels} levels needs {expected} values, got {}",
                values.len()
            )));
        }
        Ok(Self {
            levels,
            largest_value,
            values,
        })
    }

    /// Feature map over [`FEATURE_MAP_LEVELS`] gray levels.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::InvalidConfig`] if `values` has the wrong length.
    pub fn with_default_levels(largest_value: u16, values: Vec<u16>) -> FuzzyResult<Self> {
        Self::new(FEATURE_MAP_LEVELS, largest_value, values)
    }

    /// Gray level of an intensity.
    #[must_use]
    #[inline]
    pub fn gray_level(&self, value: u16) -> usize {
        let top = self.levels - 1;
        let v = usize::from(value.min(self.largest_value));
        if usize::from(self.largest_value) <= top {
            v
        } else {
            v * top / usize::from(self.largest_value)
        }
    }

    /// Table value for an intensity pair with `low <= high`.
    #[must_use]
    pub fn lookup(&self, low: u16, high: u16) -> u16 {
        let r = self.gray_level(low);
        let c = self.gray_level(high).max(r);
        // Rows before r hold levels, levels-1, ... entries.
        let row_start = r * self.levels - r * r.saturating_sub(1) / 2;
        self.values[row_start + c - r]
    }
}

/// The joint term of the additive model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JointTable {
    /// 3D histogram; needs a prior field.
    Histogram(JointHistogram),
    /// Intensity-pair feature map.
    FeatureMap(FeatureMap),
}
