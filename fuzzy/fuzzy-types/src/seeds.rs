//! Seed voxels: explicit lists and packed binary masks.

use crate::error::{FuzzyError, FuzzyResult};
use crate::grid::{Dimensions, Spacing};
use crate::registration::Registration;
use crate::voxel::VoxelCoord;

/// A binary seed mask stored one bit per voxel.
///
/// Bits are packed most-significant first, and each slice starts on a fresh
/// byte, so a slice occupies `ceil(nx * ny / 8)` bytes.
///
/// # Example
///
/// ```
/// use fuzzy_types::{Dimensions, SeedMask, VoxelCoord};
///
/// // 3x3x1 mask with only the center voxel set (bit 4 of the first byte).
/// let mask = SeedMask::from_packed(Dimensions::new(3, 3, 1), vec![0b0000_1000, 0]).unwrap();
/// assert_eq!(mask.iter().collect::<Vec<_>>(), vec![VoxelCoord::new(1, 1, 0)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeedMask {
    dims: Dimensions,
    spacing: Spacing,
    bits: Vec<u8>,
}

impl SeedMask {
    /// Bytes used by one slice of a mask with `dims`.
    #[must_use]
    pub const fn slice_bytes(dims: Dimensions) -> usize {
        dims.slice_len().div_ceil(8)
    }

    /// Creates an empty mask with unit spacing.
    #[must_use]
    pub fn new(dims: Dimensions) -> Self {
        Self {
            dims,
            spacing: Spacing::default(),
            bits: vec![0; Self::slice_bytes(dims) * dims.nz()],
        }
    }

    /// Wraps packed mask bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::DataIncompatibility`] if the byte count does not
    /// match `dims`.
    pub fn from_packed(dims: Dimensions, bits: Vec<u8>) -> FuzzyResult<Self> {
        let expected = Self::slice_bytes(dims) * dims.nz();
        if bits.len() != expected {
            return Err(FuzzyError::data_incompatibility(format!(
                "seed mask needs {expected} bytes, got {}",
                bits.len()
            )));
        }
        Ok(Self {
            dims,
            spacing: Spacing::default(),
            bits,
        })
    }

    /// Sets the physical spacing of the mask grid.
    #[must_use]
    pub const fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    /// Mask dimensions.
    #[must_use]
    pub const fn dims(&self) -> Dimensions {
        self.dims
    }

    /// Mask spacing.
    #[must_use]
    pub const fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// Packed bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    #[allow(clippy::cast_sign_loss)]
    fn bit_position(&self, coord: VoxelCoord) -> Option<(usize, u8)> {
        if !self.dims.contains(coord) {
            return None;
        }
        let in_slice = coord.y as usize * self.dims.nx() + coord.x as usize;
        let byte = coord.z as usize * Self::slice_bytes(self.dims) + in_slice / 8;
        Some((byte, 0x80 >> (in_slice % 8)))
    }

    /// Returns `true` if the voxel is marked.
    #[must_use]
    pub fn contains(&self, coord: VoxelCoord) -> bool {
        self.bit_position(coord)
            .is_some_and(|(byte, bit)| self.bits[byte] & bit != 0)
    }

    /// Marks or clears a voxel; coordinates outside the mask are ignored.
    pub fn set(&mut self, coord: VoxelCoord, on: bool) {
        if let Some((byte, bit)) = self.bit_position(coord) {
            if on {
                self.bits[byte] |= bit;
            } else {
                self.bits[byte] &= !bit;
            }
        }
    }

    /// Iterates marked voxels in storage order.
    pub fn iter(&self) -> impl Iterator<Item = VoxelCoord> + '_ {
        self.dims.iter().filter(|&c| self.contains(c))
    }

    /// Number of marked voxels.
    #[must_use]
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Marked voxels of a mask on the same grid as the volume.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::DataIncompatibility`] if the mask grid differs.
    pub fn seeds_on(&self, dims: Dimensions) -> FuzzyResult<SeedSet> {
        if self.dims != dims {
            return Err(FuzzyError::data_incompatibility(format!(
                "seed mask is {:?} but the volume is {dims:?}",
                self.dims
            )));
        }
        Ok(SeedSet::from_iter(self.iter()))
    }

    /// Maps marked voxels onto another grid, dropping those that land
    /// outside it. Returns the seeds and the number dropped.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::DataIncompatibility`] if the registration or
    /// either spacing is unusable.
    pub fn register(
        &self,
        dims: Dimensions,
        spacing: Spacing,
        registration: &Registration,
    ) -> FuzzyResult<(SeedSet, usize)> {
        if !registration.is_valid() {
            return Err(FuzzyError::data_incompatibility(
                "seed mask registration has a non-positive scale or non-finite translation",
            ));
        }
        self.spacing.validate()?;
        spacing.validate()?;
        let mut seeds = SeedSet::new();
        let mut dropped = 0;
        for c in self.iter() {
            let target = registration.nearest_in_grid(c, self.spacing, spacing);
            if dims.contains(target) {
                seeds.push(target);
            } else {
                dropped += 1;
            }
        }
        Ok((seeds, dropped))
    }
}

/// An explicit list of seed voxels.
///
/// # Example
///
/// ```
/// use fuzzy_types::{SeedSet, VoxelCoord};
///
/// let seeds: SeedSet = [VoxelCoord::new(0, 0, 0), VoxelCoord::new(4, 4, 0)].into_iter().collect();
/// assert_eq!(seeds.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeedSet {
    coords: Vec<VoxelCoord>,
}

impl SeedSet {
    /// Creates an empty seed set.
    #[must_use]
    pub const fn new() -> Self {
        Self { coords: Vec::new() }
    }

    /// Adds a seed.
    pub fn push(&mut self, coord: VoxelCoord) {
        self.coords.push(coord);
    }

    /// Appends every seed from another set.
    pub fn extend_from(&mut self, other: &Self) {
        self.coords.extend_from_slice(&other.coords);
    }

    /// Number of seeds, counting duplicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Returns `true` when there are no seeds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Seed coordinates.
    #[must_use]
    pub fn as_slice(&self) -> &[VoxelCoord] {
        &self.coords
    }

    /// Iterates the seeds.
    pub fn iter(&self) -> impl Iterator<Item = VoxelCoord> + '_ {
        self.coords.iter().copied()
    }
}

impl FromIterator<VoxelCoord> for SeedSet {
    fn from_iter<I: IntoIterator<Item = VoxelCoord>>(iter: I) -> Self {
        Self {
            coords: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<VoxelCoord>> for SeedSet {
    fn from(coords: Vec<VoxelCoord>) -> Self {
        Self { coords }
    }
}
