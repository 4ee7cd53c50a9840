//! Ordering strategies plugged into `RawTable`.
//!
//! The table calls these hooks whenever an entry is created, updated or
//! removed, and asks them for the traversal order. `Unordered` keeps no
//! per-entry state and walks the bucket array; `Linked` threads every entry
//! on a doubly-linked list whose ends are an explicit `head`/`tail` pair.

use crate::config::OrderMode;
use crate::raw_table::{index_for, Slots};
use slotmap::DefaultKey;

/// Where a created or updated entry should land in the traversal order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Placement {
    /// New entries go to the tail; updates count as an access.
    Natural,
    /// New or updated entries move to the head.
    Head,
    /// New or updated entries move to the tail.
    Tail,
}

pub(crate) trait Order {
    /// Per-entry link state stored inline in every slot.
    type Link: Copy + Default;

    /// A fresh entry has been pushed into its bucket chain.
    fn linked<K, V>(&mut self, slots: &mut Slots<K, V, Self::Link>, at: DefaultKey, place: Placement);

    /// `at` is about to be freed; it is still present in `slots`.
    fn unlinked<K, V>(&mut self, slots: &mut Slots<K, V, Self::Link>, at: DefaultKey);

    /// `at` was read or had its value replaced. Returns true when the
    /// traversal order counts as structurally modified.
    fn accessed<K, V>(
        &mut self,
        slots: &mut Slots<K, V, Self::Link>,
        at: DefaultKey,
        place: Placement,
    ) -> bool;

    fn cleared(&mut self);

    fn first<K, V>(
        &self,
        buckets: &[Option<DefaultKey>],
        slots: &Slots<K, V, Self::Link>,
    ) -> Option<DefaultKey>;

    /// Successor of `at`, or `None` at the end or when `at` is not live.
    fn after<K, V>(
        &self,
        buckets: &[Option<DefaultKey>],
        slots: &Slots<K, V, Self::Link>,
        at: DefaultKey,
    ) -> Option<DefaultKey>;

    #[cfg(test)]
    fn assert_links<K, V>(&self, _slots: &Slots<K, V, Self::Link>) {}
}

/// Bucket-array traversal: ascending bucket index, then chain order.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Unordered;

impl Order for Unordered {
    type Link = ();

    #[inline]
    fn linked<K, V>(&mut self, _: &mut Slots<K, V, ()>, _: DefaultKey, _: Placement) {}

    #[inline]
    fn unlinked<K, V>(&mut self, _: &mut Slots<K, V, ()>, _: DefaultKey) {}

    #[inline]
    fn accessed<K, V>(&mut self, _: &mut Slots<K, V, ()>, _: DefaultKey, _: Placement) -> bool {
        false
    }

    #[inline]
    fn cleared(&mut self) {}

    fn first<K, V>(&self, buckets: &[Option<DefaultKey>], _: &Slots<K, V, ()>) -> Option<DefaultKey> {
        buckets.iter().find_map(|b| *b)
    }

    fn after<K, V>(
        &self,
        buckets: &[Option<DefaultKey>],
        slots: &Slots<K, V, ()>,
        at: DefaultKey,
    ) -> Option<DefaultKey> {
        let slot = slots.get(at)?;
        if slot.chain.is_some() {
            return slot.chain;
        }
        let index = index_for(slot.hash, buckets.len());
        buckets[index + 1..].iter().find_map(|b| *b)
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Link {
    before: Option<DefaultKey>,
    after: Option<DefaultKey>,
}

/// Doubly-linked traversal in insertion or access order.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Linked {
    mode: OrderMode,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl Linked {
    pub(crate) fn new(mode: OrderMode) -> Self {
        Self {
            mode,
            head: None,
            tail: None,
        }
    }

    pub(crate) fn mode(&self) -> OrderMode {
        self.mode
    }

    pub(crate) fn head(&self) -> Option<DefaultKey> {
        self.head
    }

    pub(crate) fn tail(&self) -> Option<DefaultKey> {
        self.tail
    }

    pub(crate) fn before<K, V>(&self, slots: &Slots<K, V, Link>, at: DefaultKey) -> Option<DefaultKey> {
        slots.get(at)?.link.before
    }

    /// Link `at` immediately before `anchor`; `None` means after the tail.
    fn link_before<K, V>(&mut self, slots: &mut Slots<K, V, Link>, at: DefaultKey, anchor: Option<DefaultKey>) {
        let before = match anchor {
            Some(a) => slots[a].link.before,
            None => self.tail,
        };
        slots[at].link = Link { before, after: anchor };
        match before {
            Some(b) => slots[b].link.after = Some(at),
            None => self.head = Some(at),
        }
        match anchor {
            Some(a) => slots[a].link.before = Some(at),
            None => self.tail = Some(at),
        }
    }

    fn unlink<K, V>(&mut self, slots: &mut Slots<K, V, Link>, at: DefaultKey) {
        let Link { before, after } = std::mem::take(&mut slots[at].link);
        match before {
            Some(b) => slots[b].link.after = after,
            None => self.head = after,
        }
        match after {
            Some(a) => slots[a].link.before = before,
            None => self.tail = before,
        }
    }

    fn move_to_tail<K, V>(&mut self, slots: &mut Slots<K, V, Link>, at: DefaultKey) -> bool {
        if self.tail == Some(at) {
            return false;
        }
        self.unlink(slots, at);
        self.link_before(slots, at, None);
        true
    }

    fn move_to_head<K, V>(&mut self, slots: &mut Slots<K, V, Link>, at: DefaultKey) -> bool {
        if self.head == Some(at) {
            return false;
        }
        self.unlink(slots, at);
        let head = self.head;
        self.link_before(slots, at, head);
        true
    }
}

impl Order for Linked {
    type Link = Link;

    fn linked<K, V>(&mut self, slots: &mut Slots<K, V, Link>, at: DefaultKey, place: Placement) {
        let anchor = match place {
            Placement::Head => self.head,
            Placement::Natural | Placement::Tail => None,
        };
        self.link_before(slots, at, anchor);
    }

    fn unlinked<K, V>(&mut self, slots: &mut Slots<K, V, Link>, at: DefaultKey) {
        self.unlink(slots, at);
    }

    fn accessed<K, V>(&mut self, slots: &mut Slots<K, V, Link>, at: DefaultKey, place: Placement) -> bool {
        match place {
            Placement::Head => self.move_to_head(slots, at),
            Placement::Tail => self.move_to_tail(slots, at),
            // Every recorded access reorders an access-ordered list, even when
            // the entry already sits at the tail.
            Placement::Natural => match self.mode {
                OrderMode::Access => {
                    self.move_to_tail(slots, at);
                    true
                }
                OrderMode::Insertion => false,
            },
        }
    }

    fn cleared(&mut self) {
        self.head = None;
        self.tail = None;
    }

    fn first<K, V>(&self, _: &[Option<DefaultKey>], _: &Slots<K, V, Link>) -> Option<DefaultKey> {
        self.head
    }

    fn after<K, V>(&self, _: &[Option<DefaultKey>], slots: &Slots<K, V, Link>, at: DefaultKey) -> Option<DefaultKey> {
        slots.get(at)?.link.after
    }

    #[cfg(test)]
    fn assert_links<K, V>(&self, slots: &Slots<K, V, Link>) {
        assert_eq!(self.head.is_none(), slots.is_empty());
        assert_eq!(self.tail.is_none(), slots.is_empty());
        if let Some(h) = self.head {
            assert_eq!(slots[h].link.before, None, "head has a predecessor");
        }
        if let Some(t) = self.tail {
            assert_eq!(slots[t].link.after, None, "tail has a successor");
        }
        for (k, slot) in slots.iter() {
            if let Some(a) = slot.link.after {
                assert_eq!(slots[a].link.before, Some(k), "asymmetric after/before");
            }
            if let Some(b) = slot.link.before {
                assert_eq!(slots[b].link.after, Some(k), "asymmetric before/after");
            }
        }
    }
}
