//! Per-voxel connectedness strength.

use crate::error::{AllocationTarget, FuzzyError, FuzzyResult, try_filled};
use crate::grid::Dimensions;
use crate::volume::Volume;
use crate::voxel::VoxelCoord;

/// Largest connectedness value; seeds are assigned this strength.
pub const MAX_STRENGTH: u16 = 65534;

/// Connectedness strength of every voxel, in `[0, MAX_STRENGTH]`.
///
/// Zero means "not reached". The map is produced by the tracker and has the
/// dimensions of the tracked volume.
///
/// # Example
///
/// ```
/// use fuzzy_types::{Dimensions, StrengthMap, VoxelCoord, MAX_STRENGTH};
///
/// let mut map = StrengthMap::new(Dimensions::new(2, 1, 1)).unwrap();
/// map.set(0, MAX_STRENGTH);
/// assert_eq!(map.strength_at(VoxelCoord::new(0, 0, 0)), Some(MAX_STRENGTH));
/// assert_eq!(map.reached_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrengthMap {
    dims: Dimensions,
    values: Vec<u16>,
}

impl StrengthMap {
    /// Creates an all-zero map.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::AllocationFailure`] if the buffer cannot be
    /// allocated.
    pub fn new(dims: Dimensions) -> FuzzyResult<Self> {
        let values = try_filled(dims.checked_len()?, 0, AllocationTarget::StrengthMap)?;
        Ok(Self { dims, values })
    }

    /// Wraps existing values.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::DataIncompatibility`] if the length does not
    /// match `dims` or a value exceeds [`MAX_STRENGTH`].
    pub fn from_values(dims: Dimensions, values: Vec<u16>) -> FuzzyResult<Self> {
        if values.len() != dims.checked_len()? {
            return Err(FuzzyError::data_incompatibility(format!(
                "strength map needs {} values, got {}",
                dims.len(),
                values.len()
            )));
        }
        if let Some(bad) = values.iter().find(|&&v| v > MAX_STRENGTH) {
            return Err(FuzzyError::data_incompatibility(format!(
                "strength {bad} exceeds {MAX_STRENGTH}"
            )));
        }
        Ok(Self { dims, values })
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn dims(&self) -> Dimensions {
        self.dims
    }

    /// Strength at a linear index. The index must be in range.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> u16 {
        self.values[index]
    }

    /// Strength at a coordinate, or `None` outside the grid.
    #[must_use]
    pub fn strength_at(&self, coord: VoxelCoord) -> Option<u16> {
        self.dims.index(coord).map(|i| self.values[i])
    }

    /// Sets the strength at a linear index. The index must be in range.
    #[inline]
    pub fn set(&mut self, index: usize, strength: u16) {
        self.values[index] = strength;
    }

    /// Number of voxels.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the map has no voxels.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in storage order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u16] {
        &self.values
    }

    /// Consumes the map and returns its values.
    #[must_use]
    pub fn into_vec(self) -> Vec<u16> {
        self.values
    }

    /// Largest strength in the map.
    #[must_use]
    pub fn max_strength(&self) -> u16 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    /// Number of voxels with non-zero strength.
    #[must_use]
    pub fn reached_count(&self) -> usize {
        self.values.iter().filter(|&&v| v > 0).count()
    }

    /// Iterates `(coord, strength)` over reached voxels.
    pub fn iter_reached(&self) -> impl Iterator<Item = (VoxelCoord, u16)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 0)
            .map(|(i, &v)| (self.dims.coord(i), v))
    }

    /// Binary object mask: `true` where strength is at least `min`.
    #[must_use]
    pub fn threshold(&self, min: u16) -> Vec<bool> {
        self.values.iter().map(|&v| v >= min).collect()
    }

    /// Voxel-wise maximum with another map of the same dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::DataIncompatibility`] if dimensions differ.
    pub fn merge_max(&mut self, other: &Self) -> FuzzyResult<()> {
        if self.dims != other.dims {
            return Err(FuzzyError::data_incompatibility(
                "cannot merge strength maps of different dimensions",
            ));
        }
        for (a, &b) in self.values.iter_mut().zip(&other.values) {
            *a = (*a).max(b);
        }
        Ok(())
    }

    /// Copy of `volume` with every unreached voxel set to zero.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::DataIncompatibility`] if dimensions differ.
    pub fn mask_volume(&self, volume: &Volume) -> FuzzyResult<Volume> {
        if volume.dims() != self.dims {
            return Err(FuzzyError::data_incompatibility(
                "volume and strength map dimensions differ",
            ));
        }
        Ok(volume.masked(|i| self.values[i] > 0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::grid::Spacing;
    use crate::volume::Samples;

    #[test]
    fn test_new_is_zero() {
        let map = StrengthMap::new(Dimensions::new(3, 3, 3)).unwrap();
        assert_eq!(map.len(), 27);
        assert_eq!(map.max_strength(), 0);
        assert_eq!(map.reached_count(), 0);
    }

    #[test]
    fn test_from_values_validation() {
        let dims = Dimensions::new(2, 1, 1);
        assert!(StrengthMap::from_values(dims, vec![1]).is_err());
        assert!(StrengthMap::from_values(dims, vec![1, u16::MAX]).is_err());
        assert!(StrengthMap::from_values(dims, vec![1, MAX_STRENGTH]).is_ok());
    }

    #[test]
    fn test_threshold_and_iter() {
        let dims = Dimensions::new(3, 1, 1);
        let map = StrengthMap::from_values(dims, vec![0, 10, 20]).unwrap();
        assert_eq!(map.threshold(15), vec![false, false, true]);
        let reached: Vec<_> = map.iter_reached().collect();
        assert_eq!(
            reached,
            vec![(VoxelCoord::new(1, 0, 0), 10), (VoxelCoord::new(2, 0, 0), 20)]
        );
    }

    #[test]
    fn test_merge_max() {
        let dims = Dimensions::new(3, 1, 1);
        let mut a = StrengthMap::from_values(dims, vec![5, 0, 9]).unwrap();
        let b = StrengthMap::from_values(dims, vec![1, 7, 10]).unwrap();
        a.merge_max(&b).unwrap();
        assert_eq!(a.as_slice(), &[5, 7, 10]);

        let c = StrengthMap::new(Dimensions::new(1, 1, 1)).unwrap();
        assert!(a.merge_max(&c).is_err());
    }

    #[test]
    fn test_mask_volume() {
        let dims = Dimensions::new(3, 1, 1);
        let volume = Volume::from_u16(dims, Spacing::default(), vec![100, 200, 300]).unwrap();
        let map = StrengthMap::from_values(dims, vec![0, 3, 0]).unwrap();
        let masked = map.mask_volume(&volume).unwrap();
        assert_eq!(masked.samples(), &Samples::U16(vec![0, 200, 0]));
    }
}
