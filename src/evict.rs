//! Eviction predicates consulted after each new insertion into a `LinkedHashMap`.

/// Decides whether the eldest entry (the head of the order list) should be
/// removed. Called once per insertion of a previously absent key, after the
/// new entry is linked; `len` already counts it.
///
/// Any `FnMut(usize, &K, &V) -> bool` closure is a policy.
pub trait EvictionPolicy<K, V> {
    fn should_evict(&mut self, len: usize, eldest_key: &K, eldest_value: &V) -> bool;
}

/// Never evicts.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Unbounded;

impl<K, V> EvictionPolicy<K, V> for Unbounded {
    #[inline]
    fn should_evict(&mut self, _: usize, _: &K, _: &V) -> bool {
        false
    }
}

/// Evicts the eldest entry whenever the map holds more than `max` entries.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Capacity {
    max: usize,
}

impl Capacity {
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

impl<K, V> EvictionPolicy<K, V> for Capacity {
    #[inline]
    fn should_evict(&mut self, len: usize, _: &K, _: &V) -> bool {
        len > self.max
    }
}

impl<K, V, F> EvictionPolicy<K, V> for F
where
    F: FnMut(usize, &K, &V) -> bool,
{
    #[inline]
    fn should_evict(&mut self, len: usize, eldest_key: &K, eldest_value: &V) -> bool {
        self(len, eldest_key, eldest_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask<P: EvictionPolicy<u8, u8>>(p: &mut P, len: usize) -> bool {
        p.should_evict(len, &0, &0)
    }

    #[test]
    fn unbounded_never_evicts() {
        assert!(!ask(&mut Unbounded, 0));
        assert!(!ask(&mut Unbounded, usize::MAX));
    }

    #[test]
    fn capacity_evicts_only_above_max() {
        let mut c = Capacity::new(2);
        assert!(!ask(&mut c, 1));
        assert!(!ask(&mut c, 2));
        assert!(ask(&mut c, 3));
        assert_eq!(c.max(), 2);
    }

    #[test]
    fn closures_see_the_eldest_entry() {
        let mut seen = Vec::new();
        let mut p = |len: usize, k: &u8, v: &u8| {
            seen.push((len, *k, *v));
            *v > 5
        };
        assert!(!p.should_evict(4, &1, &2));
        assert!(p.should_evict(4, &3, &9));
        assert_eq!(seen, vec![(4, 1, 2), (4, 3, 9)]);
    }
}
