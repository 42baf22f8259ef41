//! Binary max-heap with a hash index for keys that are not bounded.

use fuzzy_types::{AllocationTarget, FuzzyError, FuzzyResult};
use hashbrown::HashMap;

use crate::store::{PriorityStore, QueueItem};

/// Priority store over arbitrary `u32` keys.
///
/// Items live in an array-backed binary max-heap; a hash index from id to
/// heap position finds an entry in constant time when it is re-keyed. Push,
/// pop and re-key are `O(log n)`.
///
/// # Example
///
/// ```
/// use fuzzy_queue::{HashedHeapStore, PriorityStore, QueueItem};
///
/// #[derive(Clone)]
/// struct Cell(u64, u32);
///
/// impl QueueItem for Cell {
///     type Id = u64;
///     fn key(&self) -> u32 { self.1 }
///     fn id(&self) -> u64 { self.0 }
/// }
///
/// let mut store = HashedHeapStore::new();
/// store.push(Cell(7, 4_000_000)).unwrap();
/// store.push(Cell(8, 12)).unwrap();
/// assert_eq!(store.pop().map(|c| c.0), Some(7));
/// ```
#[derive(Debug, Clone)]
pub struct HashedHeapStore<T: QueueItem> {
    heap: Vec<T>,
    positions: HashMap<T::Id, usize>,
}

impl<T: QueueItem> Default for HashedHeapStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: QueueItem> HashedHeapStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Creates a store with room for `items` entries.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailure` if the heap or index cannot be allocated.
    pub fn with_slots(items: usize) -> FuzzyResult<Self> {
        let mut store = Self::new();
        store.reserve(items)?;
        Ok(store)
    }

    fn reserve(&mut self, additional: usize) -> FuzzyResult<()> {
        let requested = self.heap.len() + additional;
        let failure = |_| FuzzyError::allocation_failure(AllocationTarget::QueueArena, requested);
        self.heap.try_reserve(additional).map_err(failure)?;
        self.positions
            .try_reserve(additional)
            .map_err(|_| FuzzyError::allocation_failure(AllocationTarget::QueueArena, requested))
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.positions.insert(self.heap[a].id(), a);
        self.positions.insert(self.heap[b].id(), b);
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.heap[parent].key() >= self.heap[i].key() {
                break;
            }
            self.swap(parent, i);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.heap.len();
        loop {
            let left = 2 * i + 1;
            if left >= n {
                break;
            }
            let right = left + 1;
            let child = if right < n && self.heap[right].key() > self.heap[left].key() {
                right
            } else {
                left
            };
            if self.heap[child].key() <= self.heap[i].key() {
                break;
            }
            self.swap(child, i);
            i = child;
        }
    }

    /// Largest pending key.
    #[must_use]
    pub fn peek_key(&self) -> Option<u32> {
        self.heap.first().map(QueueItem::key)
    }
}

impl<T: QueueItem> PriorityStore<T> for HashedHeapStore<T> {
    fn push(&mut self, item: T) -> FuzzyResult<()> {
        self.reserve(1)?;
        let i = self.heap.len();
        self.positions.insert(item.id(), i);
        self.heap.push(item);
        self.sift_up(i);
        Ok(())
    }

    fn repush(&mut self, item: T, old_key: u32) -> FuzzyResult<()> {
        let Some(&i) = self.positions.get(&item.id()) else {
            return Err(FuzzyError::EntryNotFound { key: old_key });
        };
        let raised = item.key() > old_key;
        self.heap[i] = item;
        if raised {
            self.sift_up(i);
        } else {
            self.sift_down(i);
        }
        Ok(())
    }

    fn pop(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        if last > 0 {
            self.swap(0, last);
        }
        let item = self.heap.pop()?;
        self.positions.remove(&item.id());
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(item)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn clear(&mut self) {
        self.heap.clear();
        self.positions.clear();
    }
}
