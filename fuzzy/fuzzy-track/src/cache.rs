//! Per-axis affinity memoization.
//!
//! Each axis has one slot per edge, addressed by the linear index of the
//! edge's lower endpoint. A slot is `None` until the edge is evaluated.

use fuzzy_types::{AllocationTarget, Axis, Dimensions, FuzzyError, FuzzyResult};
use tracing::warn;

#[derive(Debug, Default)]
pub(crate) struct AffinityCache {
    axes: [Option<Vec<Option<u16>>>; 3],
}

impl AffinityCache {
    /// No memoization; every lookup misses.
    pub(crate) fn disabled() -> Self {
        Self::default()
    }

    /// Allocates all three axis caches, or none if any allocation fails.
    pub(crate) fn allocate(dims: Dimensions) -> Self {
        match Self::try_allocate(dims) {
            Ok(cache) => cache,
            Err(err) => {
                warn!(error = %err, "Affinity caches unavailable, recomputing edges on demand");
                Self::disabled()
            }
        }
    }

    fn try_allocate(dims: Dimensions) -> FuzzyResult<Self> {
        let mut axes: [Option<Vec<Option<u16>>>; 3] = [None, None, None];
        for axis in Axis::ALL {
            let edges = dims.len().saturating_sub(dims.stride(axis));
            let mut slots = Vec::new();
            slots.try_reserve_exact(edges).map_err(|_| {
                FuzzyError::allocation_failure(AllocationTarget::AffinityCache, edges)
            })?;
            slots.resize(edges, None);
            axes[axis.index()] = Some(slots);
        }
        Ok(Self { axes })
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.axes.iter().all(Option::is_some)
    }

    #[inline]
    pub(crate) fn get(&self, axis: Axis, edge: usize) -> Option<u16> {
        self.axes[axis.index()]
            .as_ref()
            .and_then(|slots| slots.get(edge).copied().flatten())
    }

    #[inline]
    pub(crate) fn insert(&mut self, axis: Axis, edge: usize, affinity: u16) {
        if let Some(slot) = self.axes[axis.index()]
            .as_mut()
            .and_then(|slots| slots.get_mut(edge))
        {
            *slot = Some(affinity);
        }
    }
}
