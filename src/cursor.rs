//! Fail-fast cursors.
//!
//! A [`Cursor`] is detached from the map it walks: every step borrows the map
//! afresh, so the map may be mutated between steps. The cursor remembers the
//! map's modification count from when it was created (or from its own last
//! removal) and refuses to continue once the map has been structurally
//! changed behind its back. Detection is best effort: it relies on the
//! counter, not on a log of changes.

use crate::error::MapError;
use crate::raw_table::Handle;

mod private {
    pub trait Sealed {}
}

pub(crate) use private::Sealed;

/// Maps a [`Cursor`] can walk. Implemented by [`HashMap`](crate::HashMap) and
/// [`LinkedHashMap`](crate::LinkedHashMap); sealed.
pub trait Traversal: Sealed {
    type Key;
    type Value;

    #[doc(hidden)]
    fn mod_count(&self) -> u64;
    #[doc(hidden)]
    fn map_id(&self) -> u64;
    #[doc(hidden)]
    fn first_handle(&self) -> Option<Handle>;
    #[doc(hidden)]
    fn handle_after(&self, h: Handle) -> Option<Handle>;
    #[doc(hidden)]
    fn handle_entry(&self, h: Handle) -> Option<(&Self::Key, &Self::Value)>;
    #[doc(hidden)]
    fn handle_value_mut(&mut self, h: Handle) -> Option<&mut Self::Value>;
    #[doc(hidden)]
    fn remove_handle(&mut self, h: Handle) -> Option<(Self::Key, Self::Value)>;
}

/// Single-pass position over a map's entries in its traversal order.
///
/// A cursor belongs to the map that created it; handing it any other map
/// fails with [`MapError::WrongMap`].
///
/// ```
/// use chained_hashmap::{LinkedHashMap, MapError};
///
/// let mut map = LinkedHashMap::new();
/// map.put("a", 1);
/// map.put("b", 2);
///
/// let mut cursor = map.cursor();
/// assert_eq!(cursor.next(&map), Ok((&"a", &1)));
/// assert_eq!(cursor.remove(&mut map), Ok(("a", 1)));
///
/// map.put("c", 3);
/// assert_eq!(cursor.next(&map), Err(MapError::ConcurrentModification));
/// ```
#[derive(Clone, Debug)]
pub struct Cursor {
    map: u64,
    next: Option<Handle>,
    last: Option<Handle>,
    expected: u64,
}

impl Cursor {
    pub(crate) fn new<M: Traversal>(map: &M) -> Self {
        Self {
            map: map.map_id(),
            next: map.first_handle(),
            last: None,
            expected: map.mod_count(),
        }
    }

    /// Whether another element is available. Does not check for modification.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// The element most recently returned by `next`, unless it was removed.
    pub fn current(&self) -> Option<Handle> {
        self.last
    }

    fn check_owner<M: Traversal>(&self, map: &M) -> Result<(), MapError> {
        if map.map_id() != self.map {
            return Err(MapError::WrongMap);
        }
        Ok(())
    }

    fn check<M: Traversal>(&self, map: &M) -> Result<(), MapError> {
        self.check_owner(map)?;
        if map.mod_count() != self.expected {
            return Err(MapError::ConcurrentModification);
        }
        Ok(())
    }

    fn advance<M: Traversal>(&mut self, map: &M) -> Result<Handle, MapError> {
        self.check(map)?;
        let h = self.next.ok_or(MapError::Exhausted)?;
        self.next = map.handle_after(h);
        self.last = Some(h);
        Ok(h)
    }

    pub fn next<'m, M: Traversal>(&mut self, map: &'m M) -> Result<(&'m M::Key, &'m M::Value), MapError> {
        let h = self.advance(map)?;
        map.handle_entry(h).ok_or(MapError::ConcurrentModification)
    }

    pub fn next_key<'m, M: Traversal>(&mut self, map: &'m M) -> Result<&'m M::Key, MapError> {
        self.next(map).map(|(k, _)| k)
    }

    pub fn next_value<'m, M: Traversal>(&mut self, map: &'m M) -> Result<&'m M::Value, MapError> {
        self.next(map).map(|(_, v)| v)
    }

    /// Remove the element last returned by `next` from the map, keeping the
    /// cursor usable afterwards.
    pub fn remove<M: Traversal>(&mut self, map: &mut M) -> Result<(M::Key, M::Value), MapError> {
        self.check_owner(map)?;
        let h = self.last.ok_or(MapError::IllegalState)?;
        self.check(map)?;
        self.last = None;
        let removed = map
            .remove_handle(h)
            .ok_or(MapError::ConcurrentModification)?;
        self.expected = map.mod_count();
        Ok(removed)
    }
}
