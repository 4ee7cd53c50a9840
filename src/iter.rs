//! Borrowing and owning iterators shared by both map façades.
//!
//! The façades wrap these raw iterators in their own public types through
//! `map_iterators!`, so each map module exports `Iter`, `Keys`, `Values`,
//! `IterMut`, `ValuesMut` and `IntoIter` like the std collections do.

use crate::order::Order;
use crate::raw_table::Slots;
use slotmap::DefaultKey;

pub(crate) struct RawIter<'a, K, V, O: Order> {
    buckets: &'a [Option<DefaultKey>],
    slots: &'a Slots<K, V, O::Link>,
    order: &'a O,
    next: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V, O: Order> RawIter<'a, K, V, O> {
    pub(crate) fn new(buckets: &'a [Option<DefaultKey>], slots: &'a Slots<K, V, O::Link>, order: &'a O) -> Self {
        Self {
            buckets,
            slots,
            order,
            next: order.first(buckets, slots),
            remaining: slots.len(),
        }
    }
}

impl<K, V, O: Order> Clone for RawIter<'_, K, V, O> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, K, V, O: Order> Iterator for RawIter<'a, K, V, O> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.next?;
        self.next = self.order.after(self.buckets, self.slots, k);
        self.remaining -= 1;
        let slot = &self.slots[k];
        Some((&slot.key, &slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

macro_rules! map_iterators {
    ($order:ty) => {
        /// Iterator over `(&K, &V)` in the map's traversal order.
        pub struct Iter<'a, K, V> {
            pub(crate) inner: $crate::iter::RawIter<'a, K, V, $order>,
        }

        impl<K, V> Clone for Iter<'_, K, V> {
            fn clone(&self) -> Self {
                Iter {
                    inner: self.inner.clone(),
                }
            }
        }

        impl<'a, K, V> Iterator for Iter<'a, K, V> {
            type Item = (&'a K, &'a V);
            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                self.inner.next()
            }
            fn size_hint(&self) -> (usize, Option<usize>) {
                self.inner.size_hint()
            }
        }

        impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
        impl<K, V> core::iter::FusedIterator for Iter<'_, K, V> {}

        /// Iterator over keys in traversal order.
        pub struct Keys<'a, K, V> {
            pub(crate) inner: Iter<'a, K, V>,
        }

        impl<'a, K, V> Iterator for Keys<'a, K, V> {
            type Item = &'a K;
            #[inline]
            fn next(&mut self) -> Option<&'a K> {
                self.inner.next().map(|(k, _)| k)
            }
            fn size_hint(&self) -> (usize, Option<usize>) {
                self.inner.size_hint()
            }
        }

        impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

        /// Iterator over values in traversal order.
        pub struct Values<'a, K, V> {
            pub(crate) inner: Iter<'a, K, V>,
        }

        impl<'a, K, V> Iterator for Values<'a, K, V> {
            type Item = &'a V;
            #[inline]
            fn next(&mut self) -> Option<&'a V> {
                self.inner.next().map(|(_, v)| v)
            }
            fn size_hint(&self) -> (usize, Option<usize>) {
                self.inner.size_hint()
            }
        }

        impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

        /// Iterator over `(&K, &mut V)` in traversal order.
        pub struct IterMut<'a, K, V> {
            pub(crate) inner: std::vec::IntoIter<(&'a K, &'a mut V)>,
        }

        impl<'a, K, V> Iterator for IterMut<'a, K, V> {
            type Item = (&'a K, &'a mut V);
            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                self.inner.next()
            }
            fn size_hint(&self) -> (usize, Option<usize>) {
                self.inner.size_hint()
            }
        }

        impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

        /// Iterator over `&mut V` in traversal order.
        pub struct ValuesMut<'a, K, V> {
            pub(crate) inner: IterMut<'a, K, V>,
        }

        impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
            type Item = &'a mut V;
            #[inline]
            fn next(&mut self) -> Option<&'a mut V> {
                self.inner.next().map(|(_, v)| v)
            }
            fn size_hint(&self) -> (usize, Option<usize>) {
                self.inner.size_hint()
            }
        }

        impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

        /// Owning iterator over `(K, V)` in traversal order.
        pub struct IntoIter<K, V> {
            pub(crate) inner: $crate::raw_table::RawIntoIter<K, V, <$order as $crate::order::Order>::Link>,
        }

        impl<K, V> Iterator for IntoIter<K, V> {
            type Item = (K, V);
            #[inline]
            fn next(&mut self) -> Option<(K, V)> {
                self.inner.next()
            }
            fn size_hint(&self) -> (usize, Option<usize>) {
                self.inner.size_hint()
            }
        }

        impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
    };
}

pub(crate) use map_iterators;
