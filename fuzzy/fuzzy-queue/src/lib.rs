//! Priority stores for max-min (widest path) propagation.
//!
//! Fuzzy connectedness repeatedly extracts the voxel with the largest
//! pending strength and raises the strength of its neighbors. Strengths are
//! small bounded integers, so a bucket queue (one list per key) gives
//! constant-time push, pop and re-key.
//!
//! # Backends
//!
//! | Store | Keys | Re-key | Extra memory |
//! |-------|------|--------|--------------|
//! | [`SinglyLinkedStore`] | `0..capacity` | scan of one bucket | one link per entry |
//! | [`DoublyLinkedStore`] | `0..capacity` | `O(1)` | two links + index entry |
//! | [`HashedHeapStore`] | any `u32` | `O(log n)` | index entry |
//!
//! All three implement [`PriorityStore`] and pop keys in non-increasing
//! order, so a caller generic over the trait gets the same results from each.
//!
//! # Example
//!
//! ```
//! use fuzzy_queue::{DoublyLinkedStore, PriorityStore, QueueItem};
//!
//! #[derive(Clone, Copy)]
//! struct Voxel { index: usize, strength: u16 }
//!
//! impl QueueItem for Voxel {
//!     type Id = usize;
//!     fn key(&self) -> u32 { u32::from(self.strength) }
//!     fn id(&self) -> usize { self.index }
//! }
//!
//! let mut store = DoublyLinkedStore::new(65535).unwrap();
//! store.push(Voxel { index: 0, strength: 100 }).unwrap();
//! store.push(Voxel { index: 1, strength: 300 }).unwrap();
//! store.repush(Voxel { index: 0, strength: 500 }, 100).unwrap();
//!
//! assert_eq!(store.pop().map(|v| v.index), Some(0));
//! assert_eq!(store.pop().map(|v| v.index), Some(1));
//! assert!(store.is_empty());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod arena;
mod doubly;
mod hashed_heap;
mod singly;
mod store;

pub use arena::CHUNK_SLOTS;
pub use doubly::DoublyLinkedStore;
pub use hashed_heap::HashedHeapStore;
pub use singly::{IdentityFn, SinglyLinkedStore};
pub use store::{PriorityStore, QueueItem};
