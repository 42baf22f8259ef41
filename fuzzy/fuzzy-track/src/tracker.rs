//! The propagation engine.

use std::time::Instant;

use fuzzy_affinity::{AffinityEvaluator, EdgeSample};
use fuzzy_queue::{DoublyLinkedStore, HashedHeapStore, PriorityStore, SinglyLinkedStore};
use fuzzy_types::{
    AdjacencyScales, Direction, FuzzyError, FuzzyResult, MAX_STRENGTH, QueueBackend, Registration,
    SeedMask, SeedSet, StrengthMap, TrackConfig, Volume, VoxelCoord,
};
use tracing::{debug, info};

use crate::cache::AffinityCache;
use crate::entry::QueueEntry;
use crate::export::export_affinities;

/// Keys run from 0 to `MAX_STRENGTH` inclusive.
#[allow(clippy::cast_lossless)]
const STORE_CAPACITY: u32 = MAX_STRENGTH as u32 + 1;

/// Computes fuzzy connectedness from a seed set over one volume.
///
/// The tracker owns its evaluator so stateful evaluators (diagnostics) can
/// be inspected after a run through [`FuzzyTracker::evaluator`].
///
/// # Example
///
/// ```
/// use fuzzy_affinity::EdgeSample;
/// use fuzzy_track::FuzzyTracker;
/// use fuzzy_types::{Dimensions, MAX_STRENGTH, SeedSet, Spacing, TrackConfig, Volume, VoxelCoord};
///
/// let dims = Dimensions::new(3, 1, 1);
/// let volume = Volume::from_u8(dims, Spacing::default(), vec![10, 10, 200]).unwrap();
/// let evaluator = |e: &EdgeSample| if e.a == e.b { MAX_STRENGTH } else { 100 };
///
/// let mut tracker = FuzzyTracker::new(&volume, evaluator, TrackConfig::default());
/// let seeds: SeedSet = [VoxelCoord::new(0, 0, 0)].into_iter().collect();
/// let strengths = tracker.track(&seeds).unwrap();
/// assert_eq!(strengths.as_slice(), &[MAX_STRENGTH, MAX_STRENGTH, 100]);
/// ```
#[derive(Debug)]
pub struct FuzzyTracker<'v, E> {
    volume: &'v Volume,
    evaluator: E,
    config: TrackConfig,
}

impl<'v, E: AffinityEvaluator> FuzzyTracker<'v, E> {
    /// Creates a tracker. Nothing is validated until a run starts.
    #[must_use]
    pub const fn new(volume: &'v Volume, evaluator: E, config: TrackConfig) -> Self {
        Self {
            volume,
            evaluator,
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &TrackConfig {
        &self.config
    }

    /// Returns the evaluator.
    #[must_use]
    pub const fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Consumes the tracker, returning the evaluator.
    #[must_use]
    pub fn into_evaluator(self) -> E {
        self.evaluator
    }

    /// Runs with the store selected by [`TrackConfig::backend`].
    ///
    /// With an empty seed set the run exports edge affinities instead; see
    /// [`FuzzyTracker::track_with`].
    ///
    /// # Errors
    ///
    /// See [`FuzzyTracker::track_with`]; store creation can also fail with
    /// `AllocationFailure`.
    pub fn track(&mut self, seeds: &SeedSet) -> FuzzyResult<StrengthMap> {
        match self.config.backend() {
            QueueBackend::SinglyLinked => {
                let store = SinglyLinkedStore::new(STORE_CAPACITY)?;
                self.track_with(store, seeds)
            }
            QueueBackend::DoublyLinked => {
                let store = DoublyLinkedStore::new(STORE_CAPACITY)?;
                self.track_with(store, seeds)
            }
            QueueBackend::HashedHeap => self.track_with(HashedHeapStore::new(), seeds),
        }
    }

    /// Runs max-min propagation from `seeds` using `store`.
    ///
    /// Every seed gets `MAX_STRENGTH`; every other voxel gets the largest,
    /// over all paths from a seed, of the weakest affinity along the path,
    /// or 0 if it is unreachable. With no seeds, each voxel instead gets the
    /// largest affinity of its edges towards `+x`, `+y` and `+z` among the
    /// axes enabled by [`TrackConfig::export_axes`].
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if the configuration does not validate
    /// - `DataIncompatibility` if a seed lies outside the volume or the
    ///   evaluator rejects the volume
    /// - `AllocationFailure` if the strength map or the store cannot grow
    /// - `KeyOutOfRange` if `store` cannot hold keys up to `MAX_STRENGTH`
    pub fn track_with<S>(&mut self, mut store: S, seeds: &SeedSet) -> FuzzyResult<StrengthMap>
    where
        S: PriorityStore<QueueEntry>,
    {
        let errors = self.config.validate();
        if !errors.is_empty() {
            return Err(FuzzyError::invalid_config(errors.join("; ")));
        }
        let dims = self.volume.dims();
        if let Some(outside) = seeds.iter().find(|&s| !dims.contains(s)) {
            return Err(FuzzyError::data_incompatibility(format!(
                "seed {outside} lies outside the {}x{}x{} volume",
                dims.nx(),
                dims.ny(),
                dims.nz()
            )));
        }
        self.evaluator.prepare(self.volume)?;

        let scales = self
            .volume
            .spacing()
            .adjacency_scales(self.config.anisotropy_correction());
        let background = self.background_mask(seeds);

        if seeds.is_empty() {
            info!(voxels = dims.len(), "No seeds, exporting edge affinities");
            return export_affinities(
                self.volume,
                &mut self.evaluator,
                scales,
                self.config.export_axes(),
                background.as_deref(),
            );
        }

        let started = Instant::now();
        let cache = if self.config.memoize() {
            AffinityCache::allocate(dims)
        } else {
            AffinityCache::disabled()
        };
        info!(
            voxels = dims.len(),
            seeds = seeds.len(),
            backend = self.config.backend().name(),
            memoized = cache.is_enabled(),
            "Starting fuzzy tracking"
        );

        let mut strengths = StrengthMap::new(dims)?;
        for seed in seeds.iter() {
            let Some(index) = dims.index(seed) else {
                continue;
            };
            if strengths.get(index) == MAX_STRENGTH {
                continue;
            }
            strengths.set(index, MAX_STRENGTH);
            store.push(QueueEntry::new(seed, index, MAX_STRENGTH))?;
        }

        let mut run = Propagation {
            volume: self.volume,
            evaluator: &mut self.evaluator,
            scales,
            background,
            cache,
            strengths,
        };
        let pops = run.propagate(&mut store, self.config.progress_interval())?;

        let strengths = run.strengths;
        info!(
            pops,
            reached = strengths.reached_count(),
            elapsed = ?started.elapsed(),
            "Fuzzy tracking complete"
        );
        Ok(strengths)
    }

    /// Registers a packed seed mask onto the volume grid and runs
    /// [`FuzzyTracker::track`]. Mask voxels that land outside the volume are
    /// dropped.
    ///
    /// # Errors
    ///
    /// `DataIncompatibility` for a degenerate registration or spacing, plus
    /// everything [`FuzzyTracker::track_with`] returns.
    pub fn track_mask(
        &mut self,
        mask: &SeedMask,
        registration: &Registration,
    ) -> FuzzyResult<StrengthMap> {
        let (seeds, dropped) =
            mask.register(self.volume.dims(), self.volume.spacing(), registration)?;
        if dropped > 0 {
            debug!(dropped, kept = seeds.len(), "Dropped seeds outside the volume");
        }
        self.track(&seeds)
    }

    /// Voxels excluded by foreground-only mode, or `None` when every voxel
    /// is tracked. Seeds are never excluded.
    fn background_mask(&self, seeds: &SeedSet) -> Option<Vec<bool>> {
        let threshold = self.config.foreground_only()?;
        let dims = self.volume.dims();
        let mut mask: Vec<bool> = (0..dims.len())
            .map(|i| self.volume.value(i) < threshold)
            .collect();
        for seed in seeds.iter() {
            if let Some(i) = dims.index(seed) {
                mask[i] = false;
            }
        }
        debug!(
            threshold,
            background = mask.iter().filter(|&&b| b).count(),
            "Classified background voxels"
        );
        Some(mask)
    }
}

/// State of one propagation run.
struct Propagation<'r, E> {
    volume: &'r Volume,
    evaluator: &'r mut E,
    scales: AdjacencyScales,
    background: Option<Vec<bool>>,
    cache: AffinityCache,
    strengths: StrengthMap,
}

impl<E: AffinityEvaluator> Propagation<'_, E> {
    fn is_background(&self, index: usize) -> bool {
        self.background.as_ref().is_some_and(|mask| mask[index])
    }

    /// Affinity of the edge from `from` to its neighbor `to` along
    /// `direction`, memoized per edge.
    fn edge_affinity(
        &mut self,
        from: (VoxelCoord, usize),
        to: (VoxelCoord, usize),
        direction: Direction,
    ) -> u16 {
        let axis = direction.axis();
        let edge = from.1.min(to.1);
        if let Some(affinity) = self.cache.get(axis, edge) {
            return affinity;
        }
        let sample = EdgeSample::new(
            self.volume.value(from.1),
            self.volume.value(to.1),
            from.0,
            to.0,
        )
        .with_adjacency(self.scales.along(axis));
        let affinity = self.evaluator.affinity(&sample).min(MAX_STRENGTH);
        self.cache.insert(axis, edge, affinity);
        affinity
    }

    /// Drains the store, returning the number of pops.
    fn propagate<S>(&mut self, store: &mut S, progress_interval: u32) -> FuzzyResult<u64>
    where
        S: PriorityStore<QueueEntry>,
    {
        let dims = self.volume.dims();
        let mut pops: u64 = 0;
        while let Some(entry) = store.pop() {
            pops += 1;
            if pops % u64::from(progress_interval) == 0 {
                debug!(pops, pending = store.len(), strength = entry.strength, "Tracking");
            }
            let strength = entry.strength;
            for direction in Direction::ALL {
                let coord = entry.coord.step(direction);
                let Some(index) = dims.index(coord) else {
                    continue;
                };
                if self.is_background(index) {
                    continue;
                }
                let affinity =
                    self.edge_affinity((entry.coord, entry.index), (coord, index), direction);
                let candidate = strength.min(affinity);
                let current = self.strengths.get(index);
                if candidate <= current {
                    continue;
                }
                let raised = QueueEntry::new(coord, index, candidate);
                if current == 0 {
                    store.push(raised)?;
                } else {
                    store.repush(raised, u32::from(current))?;
                }
                self.strengths.set(index, candidate);
            }
        }
        Ok(pops)
    }
}
