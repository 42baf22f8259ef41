//! The priority store interface shared by every backend.

use std::fmt::Debug;
use std::hash::Hash;

use fuzzy_types::FuzzyResult;

/// An item that can be queued.
///
/// `key` is the priority (larger pops first) and `id` identifies the item
/// when it is re-keyed. A store holds at most one pending item per id.
pub trait QueueItem: Clone {
    /// Identity type.
    type Id: Copy + Eq + Hash + Debug;

    /// Priority of this item.
    fn key(&self) -> u32;

    /// Identity of this item.
    fn id(&self) -> Self::Id;
}

/// Max-priority store with re-keying.
///
/// Implementations differ in memory and re-key cost, never in which key is
/// popped next: [`PriorityStore::pop`] always returns an item whose key is the
/// largest currently stored. The order among equal keys is backend-specific.
pub trait PriorityStore<T: QueueItem> {
    /// Inserts a copy of `item` under `item.key()`.
    ///
    /// # Errors
    ///
    /// Fails with `KeyOutOfRange` if a bounded store cannot hold the key, or
    /// `AllocationFailure` if storage cannot grow.
    fn push(&mut self, item: T) -> FuzzyResult<()>;

    /// Moves the pending item with `item.id()` from `old_key` to
    /// `item.key()`, replacing its stored copy with `item`.
    ///
    /// `old_key` must be the key the item was last pushed or re-keyed with;
    /// it is trusted, not checked against stored state.
    ///
    /// # Errors
    ///
    /// Fails with `KeyOutOfRange` for an unrepresentable key, or
    /// `EntryNotFound` when no pending item has this identity. The store is
    /// unchanged on error.
    fn repush(&mut self, item: T, old_key: u32) -> FuzzyResult<()>;

    /// Removes and returns an item with the largest key.
    fn pop(&mut self) -> Option<T>;

    /// Number of pending items.
    fn len(&self) -> usize;

    /// Returns `true` when nothing is pending.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every pending item, keeping allocated storage.
    fn clear(&mut self);
}
