//! chained-hashmap: a separately chained hash map, and a linked variant
//! that keeps every entry on a doubly-linked list in insertion or access
//! order with an eviction hook for bounded caches.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one table implementation shared by both maps, with the
//!   ordering behaviour plugged in as a type parameter.
//! - Layers:
//!   - RawTable<K, V, S, O>: bucket array of chain heads over a slot
//!     arena. Owns hashing, chaining, resize and the modification count.
//!   - Order: `Unordered` walks the bucket array; `Linked` threads the
//!     entries on a list with explicit head/tail handles and reorders
//!     them on access when in access order.
//!   - HashMap / LinkedHashMap: public façades. LinkedHashMap adds the
//!     positional API (first/last, put_first/put_last) and consults an
//!     `EvictionPolicy` after every new insertion.
//!
//! Constraints
//! - Single-threaded and unsynchronized; mutation requires `&mut`.
//! - Entries live in a `slotmap` arena, so chain and list links are
//!   generational keys, not pointers. No unsafe code.
//! - Bucket counts are powers of two up to `MAXIMUM_CAPACITY`; the table
//!   grows by doubling once `len` reaches the threshold and the new
//!   entry's bucket is already occupied.
//!
//! Hashing
//! - The `BuildHasher` output is folded to 32 bits and spread with an
//!   XOR-shift mix before masking, so hashers with weak low bits still
//!   spread across buckets. The mixed hash is cached per entry; resize
//!   never calls `K: Hash` again.
//!
//! Iteration
//! - Borrowing iterators (`iter`, `keys`, `values`, ...) hold a shared
//!   borrow, so the map cannot change underneath them.
//! - `Cursor` is detached from the map and is passed the map on every
//!   step. It compares the map's modification count on each step and
//!   fails with `MapError::ConcurrentModification` after any structural
//!   change it did not make itself.
//! - Every table carries an identity. Cursors and handles check it, so
//!   handing them a different map (or a clone) is refused.
//!
//! XML (feature `xml`)
//! - `xml` reads documents into nested `LinkedHashMap<String, XmlValue>`
//!   trees that keep element order, and writes them back in that order.

mod config;
mod cursor;
mod error;
mod evict;
pub mod hash_map;
mod iter;
pub mod linked_hash_map;
mod order;
mod primes;
mod raw_table;
mod raw_table_proptest;
#[cfg(feature = "serde")]
mod serde;
#[cfg(feature = "xml")]
pub mod xml;

/// Default `BuildHasher` for both maps.
pub type DefaultHashBuilder = hashbrown::hash_map::DefaultHashBuilder;

// Public surface
pub use config::{Config, OrderMode, DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR, MAXIMUM_CAPACITY};
pub use cursor::{Cursor, Traversal};
pub use error::MapError;
pub use evict::{Capacity, EvictionPolicy, Unbounded};
pub use hash_map::HashMap;
pub use linked_hash_map::LinkedHashMap;
pub use primes::prime_sum;
pub use raw_table::Handle;
