//! Queue entries for the tracker.

use fuzzy_queue::QueueItem;
use fuzzy_types::VoxelCoord;

/// A voxel waiting to be expanded, keyed by its current strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEntry {
    /// Voxel coordinate.
    pub coord: VoxelCoord,
    /// Linear index of the voxel.
    pub index: usize,
    /// Strength at the time of the last push or repush.
    pub strength: u16,
}

impl QueueEntry {
    /// Creates an entry.
    #[must_use]
    pub const fn new(coord: VoxelCoord, index: usize, strength: u16) -> Self {
        Self {
            coord,
            index,
            strength,
        }
    }
}

impl QueueItem for QueueEntry {
    type Id = usize;

    #[inline]
    fn key(&self) -> u32 {
        u32::from(self.strength)
    }

    #[inline]
    fn id(&self) -> usize {
        self.index
    }
}
