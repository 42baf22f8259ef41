//! Voxel coordinates and the six face directions of the lattice.

use std::fmt;

/// A discrete 3D coordinate in voxel space.
///
/// Uses `i32` so that neighbor arithmetic and registration may step outside
/// the grid before bounds are checked.
///
/// # Example
///
/// ```
/// use fuzzy_types::VoxelCoord;
///
/// let coord = VoxelCoord::new(1, 2, 3);
/// assert_eq!(coord.as_tuple(), (1, 2, 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelCoord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Slice.
    pub z: i32,
}

impl VoxelCoord {
    /// Creates a new voxel coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Creates a coordinate at the origin (0, 0, 0).
    #[must_use]
    pub const fn origin() -> Self {
        Self::new(0, 0, 0)
    }

    /// Returns the coordinate as a tuple.
    #[must_use]
    pub const fn as_tuple(self) -> (i32, i32, i32) {
        (self.x, self.y, self.z)
    }

    /// Returns the coordinate one step away in `direction`.
    ///
    /// # Example
    ///
    /// ```
    /// use fuzzy_types::{Direction, VoxelCoord};
    ///
    /// let c = VoxelCoord::new(1, 1, 1);
    /// assert_eq!(c.step(Direction::NegZ), VoxelCoord::new(1, 1, 0));
    /// ```
    #[must_use]
    #[inline]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.offset();
        Self::new(
            self.x.wrapping_add(dx),
            self.y.wrapping_add(dy),
            self.z.wrapping_add(dz),
        )
    }

    /// Returns the six face neighbors in [`Direction::ALL`] order.
    #[must_use]
    pub fn face_neighbors(self) -> [Self; 6] {
        Direction::ALL.map(|d| self.step(d))
    }

    /// Manhattan distance to another coordinate.
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }
}

impl fmt::Display for VoxelCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for VoxelCoord {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

/// Grid axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Columns.
    X,
    /// Rows.
    Y,
    /// Slices.
    Z,
}

impl Axis {
    /// All three axes in x, y, z order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Position of this axis in `[x, y, z]` arrays.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// One of the six face directions of the 6-connected lattice.
///
/// [`Direction::ALL`] is the order in which the tracker relaxes neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// +x
    PosX,
    /// +y
    PosY,
    /// +z
    PosZ,
    /// -x
    NegX,
    /// -y
    NegY,
    /// -z
    NegZ,
}

impl Direction {
    /// Relaxation order: the three positive directions, then the negatives.
    pub const ALL: [Self; 6] = [
        Self::PosX,
        Self::PosY,
        Self::PosZ,
        Self::NegX,
        Self::NegY,
        Self::NegZ,
    ];

    /// Unit offset of this direction.
    #[must_use]
    #[inline]
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::PosX => (1, 0, 0),
            Self::PosY => (0, 1, 0),
            Self::PosZ => (0, 0, 1),
            Self::NegX => (-1, 0, 0),
            Self::NegY => (0, -1, 0),
            Self::NegZ => (0, 0, -1),
        }
    }

    /// The axis this direction moves along.
    #[must_use]
    #[inline]
    pub const fn axis(self) -> Axis {
        match self {
            Self::PosX | Self::NegX => Axis::X,
            Self::PosY | Self::NegY => Axis::Y,
            Self::PosZ | Self::NegZ => Axis::Z,
        }
    }

    /// `true` for the three positive directions.
    #[must_use]
    #[inline]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::PosX | Self::PosY | Self::PosZ)
    }

    /// The opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::PosY => Self::NegY,
            Self::PosZ => Self::NegZ,
            Self::NegX => Self::PosX,
            Self::NegY => Self::PosY,
            Self::NegZ => Self::PosZ,
        }
    }
}
