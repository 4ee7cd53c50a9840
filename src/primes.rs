//! Prime summation over the floor quotients of `limit`.
//!
//! For every distinct value `v = limit / i` the table holds the running sum
//! of integers in `2..=v` not yet sieved out. Processing each prime `p` up to
//! `sqrt(limit)` subtracts the multiples whose smallest factor is `p`; what is
//! left at `limit` is the sum of primes. The table is a `LinkedHashMap` keyed
//! by quotient, so there are only `O(sqrt(limit))` entries.

use crate::linked_hash_map::LinkedHashMap;

fn isqrt(n: u32) -> u32 {
    let mut r = (n as f64).sqrt() as u32;
    while u64::from(r) * u64::from(r) > u64::from(n) {
        r -= 1;
    }
    while u64::from(r + 1) * u64::from(r + 1) <= u64::from(n) {
        r += 1;
    }
    r
}

/// Sum of all primes `<= limit`.
///
/// ```
/// assert_eq!(chained_hashmap::prime_sum(10), 17);
/// ```
pub fn prime_sum(limit: u32) -> u64 {
    if limit < 2 {
        return 0;
    }
    let r = isqrt(limit);
    // Large quotients first, then every small value below them, descending.
    let quotients: Vec<u32> = (1..=r)
        .map(|i| limit / i)
        .chain((1..limit / r).rev())
        .collect();

    let mut sums: LinkedHashMap<u32, u64> = LinkedHashMap::with_capacity(quotients.len());
    for &v in &quotients {
        let v64 = u64::from(v);
        sums.put(v, v64 * (v64 + 1) / 2 - 1);
    }
    let sum = |sums: &LinkedHashMap<u32, u64>, v: u32| sums.peek(&v).copied().unwrap_or(0);

    for p in 2..=r {
        let below = sum(&sums, p - 1);
        if sum(&sums, p) <= below {
            // `p` was sieved out by a smaller prime.
            continue;
        }
        let p64 = u64::from(p);
        let square = p64 * p64;
        for &v in &quotients {
            if u64::from(v) < square {
                break;
            }
            let reduced = sum(&sums, v) - p64 * (sum(&sums, v / p) - below);
            sums.put(v, reduced);
        }
    }
    sum(&sums, limit)
}
