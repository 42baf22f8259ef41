//! Bucket store with circular doubly linked buckets and a slot locator.

use fuzzy_types::{AllocationTarget, FuzzyError, FuzzyResult};
use hashbrown::HashMap;

use crate::arena::{NIL, SlotArena, bucket_table, check_key};
use crate::store::{PriorityStore, QueueItem};

/// Bucket queue over keys `0..capacity` with constant-time re-keying.
///
/// Each bucket is a circular doubly linked list whose head is the most
/// recent entry; pops take the tail, so entries sharing a key leave in
/// first-in first-out order. A locator maps each pending id to its slot, so
/// re-keying neither scans nor walks the list.
#[derive(Debug, Clone)]
pub struct DoublyLinkedStore<T: QueueItem> {
    arena: SlotArena<T>,
    heads: Vec<u32>,
    locator: HashMap<T::Id, u32>,
    top: usize,
    len: usize,
}

impl<T: QueueItem> DoublyLinkedStore<T> {
    /// Creates a store accepting keys `0..capacity`.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailure` if the bucket table cannot be allocated.
    pub fn new(capacity: u32) -> FuzzyResult<Self> {
        Ok(Self {
            arena: SlotArena::new(),
            heads: bucket_table(capacity)?,
            locator: HashMap::new(),
            top: 0,
            len: 0,
        })
    }

    /// Creates a store with room for `items` entries.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailure` if any buffer cannot be allocated.
    pub fn with_slots(capacity: u32, items: usize) -> FuzzyResult<Self> {
        let mut store = Self::new(capacity)?;
        store.arena = SlotArena::with_slots(items)?;
        store
            .locator
            .try_reserve(items)
            .map_err(|_| FuzzyError::allocation_failure(AllocationTarget::QueueArena, items))?;
        Ok(store)
    }

    /// Number of keys.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn capacity(&self) -> u32 {
        self.heads.len() as u32
    }

    fn link(&mut self, handle: u32, key: usize) {
        let head = self.heads[key];
        if head == NIL {
            self.arena.set_next(handle, handle);
            self.arena.set_prev(handle, handle);
        } else {
            let tail = self.arena.prev(head);
            self.arena.set_next(handle, head);
            self.arena.set_prev(handle, tail);
            self.arena.set_prev(head, handle);
            self.arena.set_next(tail, handle);
        }
        self.heads[key] = handle;
        if key > self.top {
            self.top = key;
        }
    }

    fn unlink(&mut self, handle: u32, key: usize) {
        let next = self.arena.next(handle);
        if next == handle {
            self.heads[key] = NIL;
            return;
        }
        let prev = self.arena.prev(handle);
        if self.heads[key] == handle {
            self.heads[key] = next;
        }
        self.arena.set_prev(next, prev);
        self.arena.set_next(prev, next);
    }
}

impl<T: QueueItem> PriorityStore<T> for DoublyLinkedStore<T> {
    fn push(&mut self, item: T) -> FuzzyResult<()> {
        let key = check_key(item.key(), self.capacity())?;
        self.locator
            .try_reserve(1)
            .map_err(|_| {
                FuzzyError::allocation_failure(AllocationTarget::QueueArena, self.len + 1)
            })?;
        let id = item.id();
        let handle = self.arena.allocate(item)?;
        self.locator.insert(id, handle);
        self.link(handle, key);
        self.len += 1;
        Ok(())
    }

    fn repush(&mut self, item: T, old_key: u32) -> FuzzyResult<()> {
        let capacity = self.capacity();
        let old = check_key(old_key, capacity)?;
        let new = check_key(item.key(), capacity)?;
        let Some(&handle) = self.locator.get(&item.id()) else {
            return Err(FuzzyError::EntryNotFound { key: old_key });
        };
        self.unlink(handle, old);
        self.arena.replace(handle, item);
        self.link(handle, new);
        Ok(())
    }

    fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        while self.heads[self.top] == NIL && self.top > 0 {
            self.top -= 1;
        }
        let head = self.heads[self.top];
        if head == NIL {
            return None;
        }
        let tail = self.arena.prev(head);
        self.unlink(tail, self.top);
        while self.heads[self.top] == NIL && self.top > 0 {
            self.top -= 1;
        }
        self.len -= 1;
        let item = self.arena.release(tail)?;
        self.locator.remove(&item.id());
        Some(item)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.heads.fill(NIL);
        self.arena.clear();
        self.locator.clear();
        self.top = 0;
        self.len = 0;
    }
}
