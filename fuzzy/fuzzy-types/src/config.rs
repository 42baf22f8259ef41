//! Tracking configuration.
//!
//! # Example
//!
//! ```
//! use fuzzy_types::{QueueBackend, TrackConfig};
//!
//! let config = TrackConfig::default()
//!     .with_backend(QueueBackend::DoublyLinked)
//!     .with_anisotropy_correction(false)
//!     .with_foreground_only(40);
//! assert!(config.validate().is_empty());
//! ```

use crate::voxel::Axis;

/// Priority store used by the tracker.
///
/// All backends produce identical strength maps; they differ in memory and
/// re-key cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueueBackend {
    /// Buckets as singly linked lists. Cheapest memory; re-key scans one
    /// bucket.
    #[default]
    SinglyLinked,
    /// Buckets as doubly linked lists with a slot locator. Constant-time
    /// re-key for an extra link and index entry per item.
    DoublyLinked,
    /// Binary heap with a hash index. Keys need not be bounded.
    HashedHeap,
}

impl QueueBackend {
    /// All backends.
    pub const ALL: [Self; 3] = [Self::SinglyLinked, Self::DoublyLinked, Self::HashedHeap];

    /// Short name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SinglyLinked => "singly-linked",
            Self::DoublyLinked => "doubly-linked",
            Self::HashedHeap => "hashed-heap",
        }
    }
}

/// Axes whose edge affinities are written by a run without seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportAxes {
    /// Edges to the +x neighbor.
    pub x: bool,
    /// Edges to the +y neighbor.
    pub y: bool,
    /// Edges to the +z neighbor.
    pub z: bool,
}

impl Default for ExportAxes {
    /// In-plane edges only.
    fn default() -> Self {
        Self {
            x: true,
            y: true,
            z: false,
        }
    }
}

impl ExportAxes {
    /// All three axes.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            x: true,
            y: true,
            z: true,
        }
    }

    /// Returns `true` if edges along `axis` are exported.
    #[must_use]
    pub const fn includes(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Returns `true` if no axis is exported.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.x || self.y || self.z)
    }
}

/// Configuration of one tracking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackConfig {
    backend: QueueBackend,
    anisotropy_correction: bool,
    foreground_only: Option<u16>,
    memoize: bool,
    export_axes: ExportAxes,
    progress_interval: u32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackConfig {
    /// Defaults: singly-linked store, anisotropy correction on, every voxel
    /// tracked, affinity caches on, x/y export, progress every 100000 pops.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            backend: QueueBackend::SinglyLinked,
            anisotropy_correction: true,
            foreground_only: None,
            memoize: true,
            export_axes: ExportAxes {
                x: true,
                y: true,
                z: false,
            },
            progress_interval: 100_000,
        }
    }

    /// Sets the priority store backend.
    #[must_use]
    pub const fn with_backend(mut self, backend: QueueBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Enables or disables scaling of adjacency by voxel spacing.
    #[must_use]
    pub const fn with_anisotropy_correction(mut self, enabled: bool) -> Self {
        self.anisotropy_correction = enabled;
        self
    }

    /// Treats voxels with intensity below `threshold` as known background:
    /// they keep strength 0 and are never expanded.
    #[must_use]
    pub const fn with_foreground_only(mut self, threshold: u16) -> Self {
        self.foreground_only = Some(threshold);
        self
    }

    /// Tracks every voxel.
    #[must_use]
    pub const fn without_foreground_only(mut self) -> Self {
        self.foreground_only = None;
        self
    }

    /// Enables or disables the per-axis affinity caches.
    #[must_use]
    pub const fn with_memoize(mut self, enabled: bool) -> Self {
        self.memoize = enabled;
        self
    }

    /// Sets which axes are written by a seedless run.
    #[must_use]
    pub const fn with_export_axes(mut self, axes: ExportAxes) -> Self {
        self.export_axes = axes;
        self
    }

    /// Sets how many pops pass between progress messages.
    #[must_use]
    pub const fn with_progress_interval(mut self, pops: u32) -> Self {
        self.progress_interval = pops;
        self
    }

    /// Selected backend.
    #[must_use]
    pub const fn backend(&self) -> QueueBackend {
        self.backend
    }

    /// Whether adjacency is scaled by spacing.
    #[must_use]
    pub const fn anisotropy_correction(&self) -> bool {
        self.anisotropy_correction
    }

    /// Background intensity threshold, if foreground-only mode is on.
    #[must_use]
    pub const fn foreground_only(&self) -> Option<u16> {
        self.foreground_only
    }

    /// Whether affinity caches are attempted.
    #[must_use]
    pub const fn memoize(&self) -> bool {
        self.memoize
    }

    /// Axes exported by a seedless run.
    #[must_use]
    pub const fn export_axes(&self) -> ExportAxes {
        self.export_axes
    }

    /// Pops between progress messages.
    #[must_use]
    pub const fn progress_interval(&self) -> u32 {
        self.progress_interval
    }

    /// Returns a list of problems; empty when the configuration is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.progress_interval == 0 {
            issues.push("progress_interval must be positive".to_string());
        }
        issues
    }
}
