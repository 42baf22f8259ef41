//! Dense grid geometry: dimensions, physical spacing and adjacency scaling.

use crate::error::{FuzzyError, FuzzyResult};
use crate::strength::MAX_STRENGTH;
use crate::voxel::{Axis, VoxelCoord};

/// Extent of a dense voxel grid.
///
/// Voxels are stored row-major within a slice with slices stacked along z,
/// so the linear index of `(x, y, z)` is `z * nx * ny + y * nx + x`.
///
/// # Example
///
/// ```
/// use fuzzy_types::{Dimensions, VoxelCoord};
///
/// let dims = Dimensions::new(4, 3, 2);
/// assert_eq!(dims.len(), 24);
/// assert_eq!(dims.index(VoxelCoord::new(1, 2, 1)), Some(12 + 8 + 1));
/// assert_eq!(dims.index(VoxelCoord::new(4, 0, 0)), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    nx: usize,
    ny: usize,
    nz: usize,
}

impl Dimensions {
    /// Creates grid dimensions.
    #[must_use]
    pub const fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    /// Number of columns.
    #[must_use]
    #[inline]
    pub const fn nx(&self) -> usize {
        self.nx
    }

    /// Number of rows.
    #[must_use]
    #[inline]
    pub const fn ny(&self) -> usize {
        self.ny
    }

    /// Number of slices.
    #[must_use]
    #[inline]
    pub const fn nz(&self) -> usize {
        self.nz
    }

    /// Voxels per slice.
    #[must_use]
    #[inline]
    pub const fn slice_len(&self) -> usize {
        self.nx * self.ny
    }

    /// Total number of voxels.
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Returns `true` if the grid has no voxels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checked voxel count, for sizing buffers from untrusted dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::DataIncompatibility`] if the product overflows.
    pub fn checked_len(&self) -> FuzzyResult<usize> {
        self.nx
            .checked_mul(self.ny)
            .and_then(|s| s.checked_mul(self.nz))
            .ok_or_else(|| {
                FuzzyError::data_incompatibility(format!("grid {self:?} is too large to address"))
            })
    }

    /// Extent along `axis`.
    #[must_use]
    pub const fn extent(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.nx,
            Axis::Y => self.ny,
            Axis::Z => self.nz,
        }
    }

    /// Linear distance between a voxel and its successor along `axis`.
    #[must_use]
    #[inline]
    pub const fn stride(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => 1,
            Axis::Y => self.nx,
            Axis::Z => self.nx * self.ny,
        }
    }

    /// Returns `true` if `coord` lies inside the grid.
    #[must_use]
    #[inline]
    pub fn contains(&self, coord: VoxelCoord) -> bool {
        usize::try_from(coord.x).is_ok_and(|x| x < self.nx)
            && usize::try_from(coord.y).is_ok_and(|y| y < self.ny)
            && usize::try_from(coord.z).is_ok_and(|z| z < self.nz)
    }

    /// Linear index of `coord`, or `None` outside the grid.
    #[must_use]
    #[inline]
    #[allow(clippy::cast_sign_loss)]
    pub fn index(&self, coord: VoxelCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        // Non-negative after the bounds check.
        Some(coord.z as usize * self.slice_len() + coord.y as usize * self.nx + coord.x as usize)
    }

    /// Coordinate of a linear index. The index must be below [`Self::len`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn coord(&self, index: usize) -> VoxelCoord {
        let slice = self.slice_len();
        let z = index / slice;
        let rem = index % slice;
        VoxelCoord::new((rem % self.nx) as i32, (rem / self.nx) as i32, z as i32)
    }

    /// Iterates every coordinate in storage order (x fastest, then y, then z).
    pub fn iter(&self) -> impl Iterator<Item = VoxelCoord> + '_ {
        (0..self.len()).map(|i| self.coord(i))
    }

    /// Returns `true` if every coordinate fits in `i32`.
    #[must_use]
    pub fn is_addressable(&self) -> bool {
        [self.nx, self.ny, self.nz]
            .iter()
            .all(|&n| i32::try_from(n).is_ok())
    }
}

/// Physical size of a voxel along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spacing {
    /// Column spacing.
    pub x: f64,
    /// Row spacing.
    pub y: f64,
    /// Slice spacing.
    pub z: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

impl Spacing {
    /// Creates a spacing triple.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Isotropic spacing.
    #[must_use]
    pub const fn uniform(size: f64) -> Self {
        Self::new(size, size, size)
    }

    /// Spacing along `axis`.
    #[must_use]
    pub const fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Smallest of the three spacings.
    #[must_use]
    pub fn smallest(&self) -> f64 {
        self.x.min(self.y).min(self.z)
    }

    /// Checks that every spacing is finite and positive.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::DataIncompatibility`] naming the first bad axis.
    pub fn validate(&self) -> FuzzyResult<()> {
        for axis in Axis::ALL {
            let s = self.along(axis);
            if !(s.is_finite() && s > 0.0) {
                return Err(FuzzyError::data_incompatibility(format!(
                    "spacing along {axis:?} must be positive, got {s}"
                )));
            }
        }
        Ok(())
    }

    /// Per-axis adjacency scales.
    ///
    /// Without correction every axis gets `MAX_STRENGTH`. With correction the
    /// axis with the smallest spacing keeps `MAX_STRENGTH` and every other
    /// axis is scaled by `smallest / spacing`.
    ///
    /// # Example
    ///
    /// ```
    /// use fuzzy_types::{Axis, Spacing, MAX_STRENGTH};
    ///
    /// let scales = Spacing::new(1.0, 1.0, 2.0).adjacency_scales(true);
    /// assert_eq!(scales.along(Axis::X), f64::from(MAX_STRENGTH));
    /// assert_eq!(scales.along(Axis::Z), f64::from(MAX_STRENGTH) / 2.0);
    /// ```
    #[must_use]
    pub fn adjacency_scales(&self, correct_anisotropy: bool) -> AdjacencyScales {
        let full = f64::from(MAX_STRENGTH);
        if !correct_anisotropy {
            return AdjacencyScales::uniform();
        }
        let smallest = self.smallest();
        let scale = |s: f64| if s <= smallest { full } else { full * smallest / s };
        AdjacencyScales {
            scales: [scale(self.x), scale(self.y), scale(self.z)],
        }
    }
}

/// Direction-specific adjacency multipliers applied to raw affinities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjacencyScales {
    scales: [f64; 3],
}

impl Default for AdjacencyScales {
    fn default() -> Self {
        Self::uniform()
    }
}

impl AdjacencyScales {
    /// `MAX_STRENGTH` on every axis.
    #[must_use]
    pub fn uniform() -> Self {
        Self {
            scales: [f64::from(MAX_STRENGTH); 3],
        }
    }

    /// Scale applied to edges along `axis`.
    #[must_use]
    #[inline]
    pub const fn along(&self, axis: Axis) -> f64 {
        self.scales[axis.index()]
    }
}
