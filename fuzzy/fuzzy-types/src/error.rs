//! Error types for fuzzy connectedness operations.
//!
//! [`FuzzyError`] is shared by the queue, affinity and tracking crates so a
//! failed run reports one error type regardless of which layer failed.

use std::fmt;

/// Errors that can occur while configuring or running fuzzy connectedness.
///
/// # Example
///
/// ```
/// use fuzzy_types::FuzzyError;
///
/// let error = FuzzyError::KeyOutOfRange { key: 70_000, capacity: 65_535 };
/// assert!(error.to_string().contains("out of range"));
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FuzzyError {
    /// A required buffer could not be allocated.
    ///
    /// This is fatal: the run is aborted before any output is produced.
    #[error("allocation of {requested} elements for {what} failed")]
    AllocationFailure {
        /// The buffer being allocated.
        what: AllocationTarget,
        /// Number of elements requested.
        requested: usize,
    },

    /// The configuration is invalid or incomplete.
    ///
    /// Raised before propagation starts, e.g. when a model-based feature is
    /// enabled without a registered prior field.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input data does not match the grid it is used with.
    #[error("incompatible data: {0}")]
    DataIncompatibility(String),

    /// A priority key lies outside the store's key range.
    #[error("key {key} is out of range for a store of capacity {capacity}")]
    KeyOutOfRange {
        /// The rejected key.
        key: u32,
        /// The number of buckets in the store.
        capacity: u32,
    },

    /// A repush could not find the entry in the bucket of its old key.
    #[error("no queued entry with matching identity at key {key}")]
    EntryNotFound {
        /// The old key that was searched.
        key: u32,
    },
}

/// Buffers whose allocation can fail during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationTarget {
    /// The priority store's slot arena or heap.
    QueueArena,
    /// The per-voxel strength map.
    StrengthMap,
    /// The per-axis affinity caches.
    AffinityCache,
    /// A volume, mask or model field.
    Field,
}

impl fmt::Display for AllocationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::QueueArena => "queue arena",
            Self::StrengthMap => "strength map",
            Self::AffinityCache => "affinity cache",
            Self::Field => "field",
        };
        f.write_str(name)
    }
}

impl FuzzyError {
    /// Creates an invalid configuration error with the given message.
    ///
    /// # Example
    ///
    /// ```
    /// use fuzzy_types::FuzzyError;
    ///
    /// let error = FuzzyError::invalid_config("prior field required");
    /// assert!(error.is_invalid_config());
    /// ```
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Creates a data incompatibility error with the given message.
    #[must_use]
    pub fn data_incompatibility(message: impl Into<String>) -> Self {
        Self::DataIncompatibility(message.into())
    }

    /// Creates an allocation failure error.
    #[must_use]
    pub const fn allocation_failure(what: AllocationTarget, requested: usize) -> Self {
        Self::AllocationFailure { what, requested }
    }

    /// Returns `true` if this is an allocation failure.
    #[must_use]
    pub const fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::AllocationFailure { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }

    /// Returns `true` if this is a data incompatibility error.
    #[must_use]
    pub const fn is_data_incompatibility(&self) -> bool {
        matches!(self, Self::DataIncompatibility(_))
    }
}

/// Result alias for fuzzy connectedness operations.
pub type FuzzyResult<T> = Result<T, FuzzyError>;

/// Allocates a vector of `len` copies of `value`, reporting failure instead
/// of aborting.
///
/// # Errors
///
/// Returns [`FuzzyError::AllocationFailure`] if the memory cannot be reserved.
///
/// # Example
///
/// ```
/// use fuzzy_types::{AllocationTarget, try_filled};
///
/// let buf = try_filled(16, 0u16, AllocationTarget::StrengthMap).unwrap();
/// assert_eq!(buf.len(), 16);
/// ```
pub fn try_filled<T: Clone>(len: usize, value: T, what: AllocationTarget) -> FuzzyResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| FuzzyError::allocation_failure(what, len))?;
    buf.resize(len, value);
    Ok(buf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_failure_display() {
        let error = FuzzyError::allocation_failure(AllocationTarget::QueueArena, 1024);
        let msg = error.to_string();
        assert!(msg.contains("queue arena"));
        assert!(msg.contains("1024"));
        assert!(error.is_allocation_failure());
    }

    #[test]
    fn test_invalid_config_helper() {
        let error = FuzzyError::invalid_config("width must be positive");
        assert!(
            matches!(&error, FuzzyError::InvalidConfig(msg) if msg == "width must be positive")
        );
        assert!(error.to_string().contains("invalid configuration"));
        assert!(!error.is_data_incompatibility());
    }

    #[test]
    fn test_data_incompatibility_helper() {
        let error = FuzzyError::data_incompatibility("mask has 3 slices, volume has 4");
        assert!(error.is_data_incompatibility());
        assert!(error.to_string().contains("3 slices"));
    }

    #[test]
    fn test_key_out_of_range_display() {
        let error = FuzzyError::KeyOutOfRange { key: 9, capacity: 8 };
        let msg = error.to_string();
        assert!(msg.contains('9'));
        assert!(msg.contains("capacity 8"));
    }

    #[test]
    fn test_entry_not_found_display() {
        let error = FuzzyError::EntryNotFound { key: 42 };
        assert!(error.to_string().contains("42"));
    }

    #[test]
    fn test_try_filled() {
        let buf = try_filled(5, 7u8, AllocationTarget::Field).unwrap();
        assert_eq!(buf, vec![7; 5]);
    }

    #[test]
    fn test_try_filled_reports_overflow() {
        let result = try_filled(usize::MAX, 0u64, AllocationTarget::AffinityCache);
        assert!(matches!(
            result,
            Err(FuzzyError::AllocationFailure {
                what: AllocationTarget::AffinityCache,
                ..
            })
        ));
    }
}
