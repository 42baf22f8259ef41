//! Trained intensity-pair histogram model.

use fuzzy_types::{FuzzyError, FuzzyResult};

/// Affinity looked up from a 2D histogram over `(high, low)`.
///
/// `high` selects one of `bins[0]` rows and `low` one of `bins[1]` columns,
/// both scaled by the largest intensity the histogram was trained on. With
/// only object counts the affinity is `count / max_count`; with background
/// counts as well it is `count / (count + background)`.
///
/// # Example
///
/// ```
/// use fuzzy_affinity::HistogramModel;
///
/// let model = HistogramModel::new([2, 2], vec![0, 4, 2, 8], 100).unwrap();
/// assert_eq!(model.evaluate(100, 100), 1.0);
/// assert_eq!(model.evaluate(100, 0), 0.25);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistogramModel {
    bins: [usize; 2],
    counts: Vec<u32>,
    reverse: Option<Vec<u32>>,
    largest_value: u16,
    count_scale: f64,
}

impl HistogramModel {
    /// Creates an object-only histogram model.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::InvalidConfig`] for zero bins, a zero largest
    /// value, a count table of the wrong size or one with no entries.
    pub fn new(bins: [usize; 2], counts: Vec<u32>, largest_value: u16) -> FuzzyResult<Self> {
        if bins.contains(&0) {
            return Err(FuzzyError::invalid_config("histogram needs at least one bin per axis"));
        }
        if largest_value == 0 {
            return Err(FuzzyError::invalid_config("histogram largest value must be positive"));
        }
        check_table(bins, &counts, "histogram")?;
        let max_count = counts.iter().copied().max().unwrap_or(0);
        if max_count == 0 {
            return Err(FuzzyError::invalid_config("histogram has no counts"));
        }
        Ok(Self {
            bins,
            counts,
            reverse: None,
            largest_value,
            count_scale: 1.0 / f64::from(max_count),
        })
    }

    /// Adds background counts, switching to the ratio form.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::InvalidConfig`] if the table size differs.
    pub fn with_reverse(mut self, reverse: Vec<u32>) -> FuzzyResult<Self> {
        check_table(self.bins, &reverse, "reverse histogram")?;
        self.reverse = Some(reverse);
        Ok(self)
    }

    /// Largest intensity the histogram covers.
    #[must_use]
    pub const fn largest_value(&self) -> u16 {
        self.largest_value
    }

    fn index(&self, high: u16, low: u16) -> usize {
        let largest = usize::from(self.largest_value);
        let row = (usize::from(high) * (self.bins[0] - 1) / largest).min(self.bins[0] - 1);
        let col = (usize::from(low) * (self.bins[1] - 1) / largest).min(self.bins[1] - 1);
        row * self.bins[1] + col
    }

    /// Unscaled affinity in `[0, 1]` for a pair.
    #[must_use]
    pub fn evaluate(&self, high: u16, low: u16) -> f64 {
        let i = self.index(high, low);
        let count = self.counts[i];
        match &self.reverse {
            None => f64::from(count) * self.count_scale,
            Some(_) if count == 0 => 0.0,
            Some(reverse) => f64::from(count) / (f64::from(count) + f64::from(reverse[i])),
        }
    }
}

fn check_table(bins: [usize; 2], table: &[u32], what: &str) -> FuzzyResult<()> {
    let expected = bins[0].checked_mul(bins[1]).unwrap_or(usize::MAX);
    if table.len() == expected {
        Ok(())
    } else {
        Err(FuzzyError::invalid_config(format!(
            "{what} with {}x{} bins needs {expected} counts, got {}",
            bins[0],
            bins[1],
            table.len()
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_index_scaling() {
        // 3x2 bins over 0..=200.
        let model = HistogramModel::new([3, 2], (1..=6).collect(), 200).unwrap();
        assert_eq!(model.index(0, 0), 0);
        assert_eq!(model.index(100, 0), 2);
        assert_eq!(model.index(100, 199), 2);
        assert_eq!(model.index(200, 200), 5);
        assert_eq!(model.evaluate(200, 200), 1.0);
    }

    #[test]
    fn test_values_above_largest_clamp() {
        let model = HistogramModel::new([2, 2], vec![1, 2, 3, 4], 10).unwrap();
        assert_eq!(model.index(500, 500), 3);
    }

    #[test]
    fn test_reverse_ratio() {
        let model = HistogramModel::new([1, 2], vec![0, 3], 10)
            .unwrap()
            .with_reverse(vec![5, 1])
            .unwrap();
        assert_eq!(model.evaluate(10, 0), 0.0);
        assert_eq!(model.evaluate(10, 10), 0.75);
    }

    #[test]
    fn test_validation() {
        assert!(HistogramModel::new([0, 1], vec![], 10).is_err());
        assert!(HistogramModel::new([1, 1], vec![1], 0).is_err());
        assert!(HistogramModel::new([2, 1], vec![1], 10).is_err());
        assert!(HistogramModel::new([1, 1], vec![0], 10).is_err());
        let model = HistogramModel::new([1, 1], vec![1], 10).unwrap();
        assert!(model.with_reverse(vec![1, 2]).is_err());
    }
}
