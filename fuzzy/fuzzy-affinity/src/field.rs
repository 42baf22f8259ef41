//! Spatial model fields sampled at volume voxels.
//!
//! A [`ModelField`] holds a prior probability map (or a directedness map)
//! scaled to `[0, MAX_STRENGTH]` on its own grid. It is registered onto the
//! tracked volume and read with trilinear interpolation; reads outside the
//! field are 0.

use fuzzy_types::{
    AllocationTarget, Dimensions, FuzzyError, FuzzyResult, Registration, Spacing, VoxelCoord,
};

/// A scalar field on a model grid, registered onto the tracked volume.
///
/// # Example
///
/// ```
/// use fuzzy_affinity::ModelField;
/// use fuzzy_types::{Dimensions, Spacing, VoxelCoord};
///
/// let field =
///     ModelField::new(Dimensions::new(2, 1, 1), Spacing::default(), vec![0, 1000]).unwrap();
/// assert_eq!(field.value_at(VoxelCoord::new(1, 0, 0)), 1000);
/// assert_eq!(field.value_at(VoxelCoord::new(5, 0, 0)), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelField {
    dims: Dimensions,
    spacing: Spacing,
    data: Vec<u16>,
    registration: Registration,
    volume_spacing: Spacing,
}

impl ModelField {
    /// Wraps field samples. The field starts registered voxel-for-voxel
    /// with the volume.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::DataIncompatibility`] if the sample count does not
    /// match `dims` or the spacing is not positive.
    pub fn new(dims: Dimensions, spacing: Spacing, data: Vec<u16>) -> FuzzyResult<Self> {
        if data.len() != dims.checked_len()? {
            return Err(FuzzyError::data_incompatibility(format!(
                "model field needs {} samples, got {}",
                dims.len(),
                data.len()
            )));
        }
        spacing.validate()?;
        Ok(Self {
            dims,
            spacing,
            data,
            registration: Registration::identity(),
            volume_spacing: Spacing::default(),
        })
    }

    /// Uniform field, mostly useful in tests.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailure` if the samples cannot be allocated.
    pub fn filled(dims: Dimensions, value: u16) -> FuzzyResult<Self> {
        let data = fuzzy_types::try_filled(dims.checked_len()?, value, AllocationTarget::Field)?;
        Self::new(dims, Spacing::default(), data)
    }

    /// Sets how volume voxels map onto the field grid.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::DataIncompatibility`] for a degenerate
    /// registration.
    pub fn with_registration(mut self, registration: Registration) -> FuzzyResult<Self> {
        if !registration.is_valid() {
            return Err(FuzzyError::data_incompatibility(
                "model field registration has a non-positive scale or non-finite translation",
            ));
        }
        self.registration = registration;
        Ok(self)
    }

    /// Binds the spacing of the volume being tracked.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::DataIncompatibility`] for a non-positive spacing.
    pub fn bind_volume_spacing(&mut self, spacing: Spacing) -> FuzzyResult<()> {
        spacing.validate()?;
        self.volume_spacing = spacing;
        Ok(())
    }

    /// Field dimensions.
    #[must_use]
    pub const fn dims(&self) -> Dimensions {
        self.dims
    }

    /// Registration onto the volume.
    #[must_use]
    pub const fn registration(&self) -> &Registration {
        &self.registration
    }

    /// Field sample at a field-grid coordinate, 0 outside the field.
    #[must_use]
    #[inline]
    pub fn sample(&self, coord: VoxelCoord) -> u16 {
        self.dims.index(coord).map_or(0, |i| self.data[i])
    }

    /// Field value at a volume voxel.
    ///
    /// Offset registrations read the field directly; affine registrations
    /// interpolate the eight surrounding samples trilinearly.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn value_at(&self, coord: VoxelCoord) -> u16 {
        if let Registration::Offset([ox, oy, oz]) = self.registration {
            return self.sample(VoxelCoord::new(
                coord.x.wrapping_sub(ox),
                coord.y.wrapping_sub(oy),
                coord.z.wrapping_sub(oz),
            ));
        }
        let p = self
            .registration
            .to_model(coord, self.volume_spacing, self.spacing);
        let base = [p.x.floor(), p.y.floor(), p.z.floor()];
        let frac = [p.x - base[0], p.y - base[1], p.z - base[2]];
        let clamp = |v: f64| v.clamp(f64::from(i32::MIN), f64::from(i32::MAX - 1)) as i32;
        let (x0, y0, z0) = (clamp(base[0]), clamp(base[1]), clamp(base[2]));

        let mut value = 0.0;
        for (dz, wz) in [(0, 1.0 - frac[2]), (1, frac[2])] {
            for (dy, wy) in [(0, 1.0 - frac[1]), (1, frac[1])] {
                for (dx, wx) in [(0, 1.0 - frac[0]), (1, frac[0])] {
                    let s = self.sample(VoxelCoord::new(x0 + dx, y0 + dy, z0 + dz));
                    value += wx * wy * wz * f64::from(s);
                }
            }
        }
        // Interpolated samples stay within u16.
        value as u16
    }
}
