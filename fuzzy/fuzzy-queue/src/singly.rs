//! Bucket store with singly linked buckets.

use fuzzy_types::{FuzzyError, FuzzyResult};

use crate::arena::{NIL, SlotArena, bucket_table, check_key};
use crate::store::{PriorityStore, QueueItem};

/// Identity comparator: returns `true` when two items are the same entry.
pub type IdentityFn<T> = fn(&T, &T) -> bool;

/// Bucket queue over keys `0..capacity` with one link per entry.
///
/// Entries sharing a key are popped last-in first-out. Re-keying scans the
/// old key's bucket for the entry, so its cost grows with the number of
/// entries sharing that key.
///
/// # Example
///
/// ```
/// use fuzzy_queue::{PriorityStore, QueueItem, SinglyLinkedStore};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Job { name: char, priority: u32 }
///
/// impl QueueItem for Job {
///     type Id = char;
///     fn key(&self) -> u32 { self.priority }
///     fn id(&self) -> char { self.name }
/// }
///
/// let mut store = SinglyLinkedStore::new(10).unwrap();
/// store.push(Job { name: 'a', priority: 2 }).unwrap();
/// store.push(Job { name: 'b', priority: 5 }).unwrap();
/// store.repush(Job { name: 'a', priority: 9 }, 2).unwrap();
/// assert_eq!(store.pop().map(|j| j.name), Some('a'));
/// assert_eq!(store.pop().map(|j| j.name), Some('b'));
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct SinglyLinkedStore<T: QueueItem> {
    arena: SlotArena<T>,
    heads: Vec<u32>,
    top: usize,
    len: usize,
    identity: Option<IdentityFn<T>>,
}

impl<T: QueueItem> SinglyLinkedStore<T> {
    /// Creates a store accepting keys `0..capacity`.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailure` if the bucket table cannot be allocated.
    pub fn new(capacity: u32) -> FuzzyResult<Self> {
        Ok(Self {
            arena: SlotArena::new(),
            heads: bucket_table(capacity)?,
            top: 0,
            len: 0,
            identity: None,
        })
    }

    /// Creates a store with arena room for `items` entries.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailure` if the table or arena cannot be allocated.
    pub fn with_slots(capacity: u32, items: usize) -> FuzzyResult<Self> {
        let mut store = Self::new(capacity)?;
        store.arena = SlotArena::with_slots(items)?;
        Ok(store)
    }

    /// Uses `identity` instead of comparing [`QueueItem::id`] when re-keying.
    #[must_use]
    pub fn with_identity(mut self, identity: IdentityFn<T>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Number of keys.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn capacity(&self) -> u32 {
        // Built from a u32.
        self.heads.len() as u32
    }

    fn same(&self, a: &T, b: &T) -> bool {
        match self.identity {
            Some(identity) => identity(a, b),
            None => a.id() == b.id(),
        }
    }

    fn link(&mut self, handle: u32, key: usize) {
        self.arena.set_next(handle, self.heads[key]);
        self.heads[key] = handle;
        if key > self.top {
            self.top = key;
        }
    }
}

impl<T: QueueItem> PriorityStore<T> for SinglyLinkedStore<T> {
    fn push(&mut self, item: T) -> FuzzyResult<()> {
        let key = check_key(item.key(), self.capacity())?;
        let handle = self.arena.allocate(item)?;
        self.link(handle, key);
        self.len += 1;
        Ok(())
    }

    fn repush(&mut self, item: T, old_key: u32) -> FuzzyResult<()> {
        let capacity = self.capacity();
        let old = check_key(old_key, capacity)?;
        let new = check_key(item.key(), capacity)?;

        let mut prev = NIL;
        let mut cur = self.heads[old];
        while cur != NIL {
            if self.arena.item(cur).is_some_and(|stored| self.same(&item, stored)) {
                break;
            }
            prev = cur;
            cur = self.arena.next(cur);
        }
        if cur == NIL {
            return Err(FuzzyError::EntryNotFound { key: old_key });
        }

        let after = self.arena.next(cur);
        if prev == NIL {
            self.heads[old] = after;
        } else {
            self.arena.set_next(prev, after);
        }
        self.arena.replace(cur, item);
        self.link(cur, new);
        Ok(())
    }

    fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        while self.heads[self.top] == NIL && self.top > 0 {
            self.top -= 1;
        }
        let handle = self.heads[self.top];
        if handle == NIL {
            return None;
        }
        self.heads[self.top] = self.arena.next(handle);
        while self.heads[self.top] == NIL && self.top > 0 {
            self.top -= 1;
        }
        self.len -= 1;
        self.arena.release(handle)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.heads.fill(NIL);
        self.arena.clear();
        self.top = 0;
        self.len = 0;
    }
}
