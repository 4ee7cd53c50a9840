use chained_hashmap::{LinkedHashMap, OrderMode};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_put_fresh_100k(c: &mut Criterion) {
    c.bench_function("linked::put_fresh_100k", |b| {
        b.iter_batched(
            LinkedHashMap::<String, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    m.put(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lru_churn_100k(c: &mut Criterion) {
    // 100k puts over a 64k key space into a 10k-entry LRU: hits, misses and
    // an eviction on nearly every miss.
    c.bench_function("linked::lru_churn_100k_cap_10k", |b| {
        b.iter_batched(
            || LinkedHashMap::<u64, u64, _, _>::lru(10_000),
            |mut m| {
                for x in lcg(3).take(100_000) {
                    let k = (x >> 32) & 0xffff;
                    if m.get(&k).is_none() {
                        m.put(k, x);
                    }
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_access_order_get_10k(c: &mut Criterion) {
    c.bench_function("linked::access_get_10k_on_100k", |b| {
        b.iter_batched(
            || {
                let mut m = LinkedHashMap::with_order(OrderMode::Access);
                let keys: Vec<String> = lcg(7).take(100_000).map(key).collect();
                for (i, k) in keys.iter().enumerate() {
                    m.put(k.clone(), i as u64);
                }
                let n = keys.len();
                let mut s = 0x9e3779b97f4a7c15u64;
                let queries: Vec<String> = (0..10_000)
                    .map(|_| {
                        s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                        keys[(s as usize) % n].clone()
                    })
                    .collect();
                (m, queries)
            },
            |(mut m, queries)| {
                for k in &queries {
                    black_box(m.get(k));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_drain_from_head_100k(c: &mut Criterion) {
    c.bench_function("linked::remove_first_100k", |b| {
        b.iter_batched(
            || {
                let mut m = LinkedHashMap::new();
                for (i, x) in lcg(13).take(100_000).enumerate() {
                    m.put(key(x), i as u64);
                }
                m
            },
            |mut m| {
                while let Ok(v) = m.remove_first() {
                    black_box(v);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iter_and_iter_mut(c: &mut Criterion) {
    c.bench_function("linked::iter_all_100k", |b| {
        let mut m = LinkedHashMap::new();
        for (i, x) in lcg(999).take(100_000).enumerate() {
            m.put(key(x), i as u64);
        }
        b.iter(|| {
            let mut sum = 0u64;
            for (_k, v) in m.iter() {
                sum = sum.wrapping_add(*v);
            }
            black_box(sum)
        })
    });

    c.bench_function("linked::iter_mut_increment_all_100k", |b| {
        b.iter_batched(
            || {
                let mut m = LinkedHashMap::new();
                for (i, x) in lcg(1001).take(100_000).enumerate() {
                    m.put(key(x), i as u64);
                }
                m
            },
            |mut m| {
                for (_k, v) in m.iter_mut() {
                    *v = v.wrapping_add(1);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_put_fresh_100k, bench_lru_churn_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_access_order_get_10k,
              bench_drain_from_head_100k,
              bench_iter_and_iter_mut
}
criterion_main!(benches_insert, benches_ops);
