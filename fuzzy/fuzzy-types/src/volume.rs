//! Dense scalar intensity volumes.

use crate::error::{FuzzyError, FuzzyResult};
use crate::grid::{Dimensions, Spacing};
use crate::voxel::VoxelCoord;

/// Intensity samples at their native bit depth.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Samples {
    /// 8-bit samples.
    U8(Vec<u8>),
    /// 16-bit samples.
    U16(Vec<u16>),
}

impl Samples {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
        }
    }

    /// Returns `true` if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bits per sample.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        match self {
            Self::U8(_) => 8,
            Self::U16(_) => 16,
        }
    }
}

/// A read-only 3D intensity volume with grid metadata.
///
/// # Example
///
/// ```
/// use fuzzy_types::{Dimensions, Spacing, Volume, VoxelCoord};
///
/// let volume = Volume::from_u8(Dimensions::new(2, 2, 1), Spacing::default(), vec![1, 2, 3, 4])
///     .unwrap();
/// assert_eq!(volume.value_at(VoxelCoord::new(1, 1, 0)), Some(4));
/// assert_eq!(volume.largest_value(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Volume {
    dims: Dimensions,
    spacing: Spacing,
    samples: Samples,
}

impl Volume {
    /// Creates a volume from samples.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::DataIncompatibility`] if the sample count does not
    /// match `dims`, the grid is not addressable with `i32` coordinates, or
    /// `spacing` is not positive.
    pub fn new(dims: Dimensions, spacing: Spacing, samples: Samples) -> FuzzyResult<Self> {
        let expected = dims.checked_len()?;
        if samples.len() != expected {
            return Err(FuzzyError::data_incompatibility(format!(
                "volume {}x{}x{} needs {expected} samples, got {}",
                dims.nx(),
                dims.ny(),
                dims.nz(),
                samples.len()
            )));
        }
        if !dims.is_addressable() {
            return Err(FuzzyError::data_incompatibility(
                "volume extent exceeds the coordinate range",
            ));
        }
        spacing.validate()?;
        Ok(Self {
            dims,
            spacing,
            samples,
        })
    }

    /// Creates an 8-bit volume.
    ///
    /// # Errors
    ///
    /// See [`Volume::new`].
    pub fn from_u8(dims: Dimensions, spacing: Spacing, data: Vec<u8>) -> FuzzyResult<Self> {
        Self::new(dims, spacing, Samples::U8(data))
    }

    /// Creates a 16-bit volume.
    ///
    /// # Errors
    ///
    /// See [`Volume::new`].
    pub fn from_u16(dims: Dimensions, spacing: Spacing, data: Vec<u16>) -> FuzzyResult<Self> {
        Self::new(dims, spacing, Samples::U16(data))
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn dims(&self) -> Dimensions {
        self.dims
    }

    /// Physical voxel spacing.
    #[must_use]
    pub const fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// Raw samples.
    #[must_use]
    pub const fn samples(&self) -> &Samples {
        &self.samples
    }

    /// Bits per sample.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.samples.bits()
    }

    /// Intensity at a linear index. The index must be in range.
    #[must_use]
    #[inline]
    pub fn value(&self, index: usize) -> u16 {
        match &self.samples {
            Samples::U8(v) => u16::from(v[index]),
            Samples::U16(v) => v[index],
        }
    }

    /// Intensity at a coordinate, or `None` outside the grid.
    #[must_use]
    pub fn value_at(&self, coord: VoxelCoord) -> Option<u16> {
        self.dims.index(coord).map(|i| self.value(i))
    }

    /// Largest intensity present, 0 for an empty volume.
    #[must_use]
    pub fn largest_value(&self) -> u16 {
        match &self.samples {
            Samples::U8(v) => v.iter().copied().max().map_or(0, u16::from),
            Samples::U16(v) => v.iter().copied().max().unwrap_or(0),
        }
    }

    /// Returns a copy with every voxel where `keep` is `false` set to zero.
    #[must_use]
    pub fn masked(&self, keep: impl Fn(usize) -> bool) -> Self {
        let samples = match &self.samples {
            Samples::U8(v) => Samples::U8(
                v.iter()
                    .enumerate()
                    .map(|(i, &s)| if keep(i) { s } else { 0 })
                    .collect(),
            ),
            Samples::U16(v) => Samples::U16(
                v.iter()
                    .enumerate()
                    .map(|(i, &s)| if keep(i) { s } else { 0 })
                    .collect(),
            ),
        };
        Self {
            dims: self.dims,
            spacing: self.spacing,
            samples,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_count_mismatch() {
        let result = Volume::from_u8(Dimensions::new(2, 2, 2), Spacing::default(), vec![0; 7]);
        assert!(result.unwrap_err().is_data_incompatibility());
    }

    #[test]
    fn test_bad_spacing_rejected() {
        let result = Volume::from_u8(
            Dimensions::new(1, 1, 1),
            Spacing::new(1.0, -1.0, 1.0),
            vec![0],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_u16_values() {
        let dims = Dimensions::new(3, 1, 1);
        let volume = Volume::from_u16(dims, Spacing::default(), vec![10, 4000, 7]).unwrap();
        assert_eq!(volume.bits(), 16);
        assert_eq!(volume.value(1), 4000);
        assert_eq!(volume.largest_value(), 4000);
        assert_eq!(volume.value_at(VoxelCoord::new(3, 0, 0)), None);
    }

    #[test]
    fn test_masked() {
        let dims = Dimensions::new(4, 1, 1);
        let volume = Volume::from_u8(dims, Spacing::default(), vec![5, 6, 7, 8]).unwrap();
        let masked = volume.masked(|i| i % 2 == 0);
        assert_eq!(masked.samples(), &Samples::U8(vec![5, 0, 7, 0]));
    }
}
