//! Slot arena with an intrusive free list.
//!
//! Slot 0 never holds an item: its `next` link is the head of the free list,
//! and handle 0 doubles as the "no slot" marker in bucket links. The arena
//! grows in chunks of [`CHUNK_SLOTS`] slots and never shrinks.

use fuzzy_types::{AllocationTarget, FuzzyError, FuzzyResult};
use tracing::trace;

/// Handle meaning "no slot".
pub(crate) const NIL: u32 = 0;

/// Slots added per growth step.
pub const CHUNK_SLOTS: usize = 1024;

#[derive(Debug, Clone)]
struct Slot<T> {
    item: Option<T>,
    next: u32,
    prev: u32,
}

impl<T> Slot<T> {
    const fn vacant(next: u32) -> Self {
        Self {
            item: None,
            next,
            prev: NIL,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SlotArena<T> {
    slots: Vec<Slot<T>>,
}

impl<T> SlotArena<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: vec![Slot::vacant(NIL)],
        }
    }

    /// Arena with room for at least `items` items before growing.
    pub(crate) fn with_slots(items: usize) -> FuzzyResult<Self> {
        let mut arena = Self::new();
        while arena.capacity() < items {
            arena.grow()?;
        }
        Ok(arena)
    }

    /// Usable slots, excluding the free-list head.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    fn grow(&mut self) -> FuzzyResult<()> {
        let start = self.slots.len();
        let end = start + CHUNK_SLOTS;
        if u32::try_from(end).is_err() {
            return Err(FuzzyError::allocation_failure(
                AllocationTarget::QueueArena,
                end,
            ));
        }
        self.slots
            .try_reserve_exact(CHUNK_SLOTS)
            .map_err(|_| FuzzyError::allocation_failure(AllocationTarget::QueueArena, end))?;
        let old_head = self.slots[0].next;
        for i in start..end {
            // Fits: `end` was checked against u32 above.
            #[allow(clippy::cast_possible_truncation)]
            let next = if i + 1 == end { old_head } else { (i + 1) as u32 };
            self.slots.push(Slot::vacant(next));
        }
        #[allow(clippy::cast_possible_truncation)]
        {
            self.slots[0].next = start as u32;
        }
        trace!(slots = end - 1, "Grew queue arena");
        Ok(())
    }

    /// Moves `item` into a free slot and returns its handle.
    pub(crate) fn allocate(&mut self, item: T) -> FuzzyResult<u32> {
        if self.slots[0].next == NIL {
            self.grow()?;
        }
        let handle = self.slots[0].next;
        self.slots[0].next = self.slots[handle as usize].next;
        let slot = &mut self.slots[handle as usize];
        slot.next = NIL;
        slot.prev = NIL;
        slot.item = Some(item);
        Ok(handle)
    }

    /// Returns a slot to the free list, yielding its item.
    pub(crate) fn release(&mut self, handle: u32) -> Option<T> {
        let head = self.slots[0].next;
        let slot = &mut self.slots[handle as usize];
        let item = slot.item.take();
        slot.next = head;
        slot.prev = NIL;
        self.slots[0].next = handle;
        item
    }

    /// Frees every slot, keeping the allocation.
    pub(crate) fn clear(&mut self) {
        let last = self.slots.len() - 1;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.item = None;
            slot.prev = NIL;
            #[allow(clippy::cast_possible_truncation)]
            {
                slot.next = if i == last { NIL } else { (i + 1) as u32 };
            }
        }
    }

    #[inline]
    pub(crate) fn item(&self, handle: u32) -> Option<&T> {
        self.slots[handle as usize].item.as_ref()
    }

    /// Replaces the item of an occupied slot.
    #[inline]
    pub(crate) fn replace(&mut self, handle: u32, item: T) {
        self.slots[handle as usize].item = Some(item);
    }

    #[inline]
    pub(crate) fn next(&self, handle: u32) -> u32 {
        self.slots[handle as usize].next
    }

    #[inline]
    pub(crate) fn set_next(&mut self, handle: u32, next: u32) {
        self.slots[handle as usize].next = next;
    }

    #[inline]
    pub(crate) fn prev(&self, handle: u32) -> u32 {
        self.slots[handle as usize].prev
    }

    #[inline]
    pub(crate) fn set_prev(&mut self, handle: u32, prev: u32) {
        self.slots[handle as usize].prev = prev;
    }
}

/// Allocates the bucket head table for keys `0..capacity`.
pub(crate) fn bucket_table(capacity: u32) -> FuzzyResult<Vec<u32>> {
    fuzzy_types::try_filled(capacity as usize, NIL, AllocationTarget::QueueArena)
}

/// Rejects keys outside `0..capacity`.
#[inline]
pub(crate) fn check_key(key: u32, capacity: u32) -> FuzzyResult<usize> {
    if key < capacity {
        Ok(key as usize)
    } else {
        Err(FuzzyError::KeyOutOfRange { key, capacity })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_zero_is_never_allocated() {
        let mut arena = SlotArena::new();
        assert_eq!(arena.capacity(), 0);
        let first = arena.allocate('a').unwrap();
        assert_ne!(first, NIL);
        assert_eq!(arena.capacity(), CHUNK_SLOTS);
        assert_eq!(arena.item(first), Some(&'a'));
    }

    #[test]
    fn test_release_recycles_slot() {
        let mut arena = SlotArena::new();
        let a = arena.allocate(1).unwrap();
        let b = arena.allocate(2).unwrap();
        assert_ne!(a, b);
        assert_eq!(arena.release(a), Some(1));
        let c = arena.allocate(3).unwrap();
        assert_eq!(c, a);
        assert_eq!(arena.item(c), Some(&3));
    }

    #[test]
    fn test_grows_in_chunks() {
        let mut arena = SlotArena::new();
        let handles: Vec<u32> = (0..=CHUNK_SLOTS).map(|i| arena.allocate(i).unwrap()).collect();
        assert_eq!(arena.capacity(), 2 * CHUNK_SLOTS);
        let mut sorted = handles.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), handles.len());
    }

    #[test]
    fn test_with_slots_and_clear() {
        let mut arena = SlotArena::with_slots(1500).unwrap();
        assert_eq!(arena.capacity(), 2 * CHUNK_SLOTS);
        let h = arena.allocate(9).unwrap();
        arena.clear();
        assert_eq!(arena.item(h), None);
        assert_eq!(arena.allocate(1).unwrap(), 1);
    }

    #[test]
    fn test_check_key() {
        assert_eq!(check_key(3, 4).unwrap(), 3);
        assert!(matches!(
            check_key(4, 4),
            Err(FuzzyError::KeyOutOfRange { key: 4, capacity: 4 })
        ));
    }
}
