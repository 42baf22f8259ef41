//! Mapping between the tracked volume grid and a second grid (seed mask,
//! prior field) that may have different resolution, placement or rotation.

use nalgebra::{Matrix3, Vector3};

use crate::grid::Spacing;
use crate::voxel::VoxelCoord;

/// Rigid rotation about a centroid, in physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rotation {
    /// Orthonormal rotation matrix.
    pub matrix: Matrix3<f64>,
    /// Center of rotation.
    pub centroid: Vector3<f64>,
}

/// How coordinates of the tracked volume relate to a model grid.
///
/// # Example
///
/// ```
/// use fuzzy_types::{Registration, Spacing, VoxelCoord};
/// use nalgebra::Vector3;
///
/// // The model grid is twice as coarse and shifted by one unit in x.
/// let reg = Registration::scaled(0.5, Vector3::new(1.0, 0.0, 0.0));
/// let p = reg.to_model(VoxelCoord::new(3, 2, 0), Spacing::uniform(1.0), Spacing::uniform(1.0));
/// assert_eq!(p, Vector3::new(1.0, 1.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Registration {
    /// Same resolution; the model grid is offset by whole voxels.
    Offset([i32; 3]),
    /// Scale, translation and optional rotation in physical space.
    Affine {
        /// Model units per volume unit.
        scale: f64,
        /// Position of the model origin in volume space.
        translation: Vector3<f64>,
        /// Optional rotation applied after translation.
        rotation: Option<Rotation>,
    },
}

impl Default for Registration {
    fn default() -> Self {
        Self::identity()
    }
}

impl Registration {
    /// Grids coincide voxel for voxel.
    #[must_use]
    pub const fn identity() -> Self {
        Self::Offset([0, 0, 0])
    }

    /// Scale and translation without rotation.
    #[must_use]
    pub const fn scaled(scale: f64, translation: Vector3<f64>) -> Self {
        Self::Affine {
            scale,
            translation,
            rotation: None,
        }
    }

    /// Continuous model-grid position of a volume voxel.
    #[must_use]
    pub fn to_model(&self, coord: VoxelCoord, grid: Spacing, model: Spacing) -> Vector3<f64> {
        match *self {
            Self::Offset([ox, oy, oz]) => Vector3::new(
                f64::from(coord.x) - f64::from(ox),
                f64::from(coord.y) - f64::from(oy),
                f64::from(coord.z) - f64::from(oz),
            ),
            Self::Affine {
                scale,
                translation,
                rotation,
            } => {
                let p = physical(coord, grid) - translation;
                let q = match rotation {
                    Some(r) => scale * (r.matrix * (p - r.centroid) + r.centroid),
                    None => scale * p,
                };
                to_grid(q, model)
            }
        }
    }

    /// Continuous volume-grid position of a model voxel; the inverse of
    /// [`Registration::to_model`].
    #[must_use]
    pub fn from_model(&self, coord: VoxelCoord, model: Spacing, grid: Spacing) -> Vector3<f64> {
        match *self {
            Self::Offset([ox, oy, oz]) => Vector3::new(
                f64::from(coord.x) + f64::from(ox),
                f64::from(coord.y) + f64::from(oy),
                f64::from(coord.z) + f64::from(oz),
            ),
            Self::Affine {
                scale,
                translation,
                rotation,
            } => {
                let q = physical(coord, model) / scale;
                let p = match rotation {
                    Some(r) => r.matrix.transpose() * (q - r.centroid) + r.centroid,
                    None => q,
                };
                to_grid(p + translation, grid)
            }
        }
    }

    /// Nearest volume voxel of a model voxel (ties round to even).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn nearest_in_grid(&self, coord: VoxelCoord, model: Spacing, grid: Spacing) -> VoxelCoord {
        let p = self.from_model(coord, model, grid);
        let r = |v: f64| v.round_ties_even().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
        VoxelCoord::new(r(p.x), r(p.y), r(p.z))
    }

    /// `true` for scale factors and translations that can be applied.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Offset(_) => true,
            Self::Affine {
                scale, translation, ..
            } => scale.is_finite() && *scale > 0.0 && translation.iter().all(|t| t.is_finite()),
        }
    }
}

fn physical(coord: VoxelCoord, spacing: Spacing) -> Vector3<f64> {
    Vector3::new(
        f64::from(coord.x) * spacing.x,
        f64::from(coord.y) * spacing.y,
        f64::from(coord.z) * spacing.z,
    )
}

fn to_grid(p: Vector3<f64>, spacing: Spacing) -> Vector3<f64> {
    Vector3::new(p.x / spacing.x, p.y / spacing.y, p.z / spacing.z)
}
