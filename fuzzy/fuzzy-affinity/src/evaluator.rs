//! The evaluator interface used by the tracker.

use fuzzy_types::{FuzzyResult, Volume, VoxelCoord};

/// One edge of the lattice as seen by an affinity evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSample {
    /// Intensity of the voxel being expanded.
    pub a: u16,
    /// Intensity of the neighbor.
    pub b: u16,
    /// Coordinate of the voxel being expanded.
    pub from: VoxelCoord,
    /// Coordinate of the neighbor.
    pub to: VoxelCoord,
    /// Scale applied to the raw affinity for this edge's axis.
    pub adjacency: f64,
    /// Evaluate the background-directed variant of asymmetric models.
    pub background: bool,
}

impl EdgeSample {
    /// An edge with full adjacency between two voxels of the object.
    #[must_use]
    pub fn new(a: u16, b: u16, from: VoxelCoord, to: VoxelCoord) -> Self {
        Self {
            a,
            b,
            from,
            to,
            adjacency: f64::from(fuzzy_types::MAX_STRENGTH),
            background: false,
        }
    }

    /// Sets the adjacency scale.
    #[must_use]
    pub const fn with_adjacency(mut self, adjacency: f64) -> Self {
        self.adjacency = adjacency;
        self
    }

    /// Sets the directedness flag.
    #[must_use]
    pub const fn with_background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    /// The larger intensity.
    #[must_use]
    #[inline]
    pub fn high(&self) -> u16 {
        self.a.max(self.b)
    }

    /// The smaller intensity.
    #[must_use]
    #[inline]
    pub fn low(&self) -> u16 {
        self.a.min(self.b)
    }
}

/// Maps an edge to a strength in `[0, MAX_STRENGTH]`.
///
/// Evaluators may keep state (diagnostic sums, lookup caches), so evaluation
/// takes `&mut self`. Any `FnMut(&EdgeSample) -> u16` closure is an
/// evaluator.
///
/// # Example
///
/// ```
/// use fuzzy_affinity::{AffinityEvaluator, EdgeSample};
/// use fuzzy_types::VoxelCoord;
///
/// let mut contrast = |e: &EdgeSample| 255 - (e.high() - e.low());
/// let edge = EdgeSample::new(100, 40, VoxelCoord::origin(), VoxelCoord::new(1, 0, 0));
/// assert_eq!(contrast.affinity(&edge), 195);
/// ```
pub trait AffinityEvaluator {
    /// Affinity of one edge.
    fn affinity(&mut self, edge: &EdgeSample) -> u16;

    /// Checks the evaluator against the volume before a run and binds any
    /// grid-dependent state to it.
    ///
    /// # Errors
    ///
    /// Returns `DataIncompatibility` when model data does not fit the volume.
    fn prepare(&mut self, volume: &Volume) -> FuzzyResult<()> {
        let _ = volume;
        Ok(())
    }
}

impl<F> AffinityEvaluator for F
where
    F: FnMut(&EdgeSample) -> u16,
{
    fn affinity(&mut self, edge: &EdgeSample) -> u16 {
        self(edge)
    }
}
