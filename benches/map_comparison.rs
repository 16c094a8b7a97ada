use core::hash::Hash;
use core::hint::black_box;
use std::collections::HashMap as StdHashMap;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashMap as HashbrownHashMap;
use linear_hash::HashMap as LinearHashMap;
use linear_hash::hasher::FoldHash;
use linear_hash::hasher::Seeded;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use siphasher::sip::SipHasher;

trait BenchKey: Clone + Hash + Eq {
    fn new(key: u64) -> Self;
}

#[derive(Clone, Hash, PartialEq, Eq)]
struct SmallKey(u64);

impl BenchKey for SmallKey {
    fn new(key: u64) -> Self {
        black_box(Self(key))
    }
}

#[derive(Clone, Hash, PartialEq, Eq)]
struct StringKey(String);

impl BenchKey for StringKey {
    fn new(key: u64) -> Self {
        black_box(Self(format!("key_{:016X}", key)))
    }
}

#[derive(Clone, Copy, Default)]
struct SipBuilder;

impl core::hash::BuildHasher for SipBuilder {
    type Hasher = SipHasher;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher::new()
    }
}

#[derive(Clone, Copy)]
enum Operation {
    Insert,
    Find,
    Remove,
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

fn random_keys<K: BenchKey>(count: usize) -> Vec<K> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| K::new(rng.try_next_u64().unwrap()))
        .collect()
}

fn shuffled<K: Clone>(keys: &[K]) -> Vec<K> {
    let mut keys = keys.to_vec();
    keys.shuffle(&mut SmallRng::from_os_rng());
    keys
}

fn bench_insert_random<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("insert_random_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("linear_hash/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut map = LinearHashMap::with_hasher(FoldHash);
                    for key in keys {
                        black_box(map.insert(key, 0u64));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("linear_hash_sip/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut map = LinearHashMap::with_hasher(Seeded(SipBuilder));
                    for key in keys {
                        black_box(map.insert(key, 0u64));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut map = HashbrownHashMap::new();
                    for key in keys {
                        black_box(map.insert(key, 0u64));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut map = StdHashMap::new();
                    for key in keys {
                        black_box(map.insert(key, 0u64));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("find_hit_miss_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let present = random_keys::<K>(size);
        let mut probes = present.clone();
        probes.extend(random_keys::<K>(size));
        let probes = shuffled(&probes);

        let mut linear = LinearHashMap::with_hasher(FoldHash);
        let mut hashbrown = HashbrownHashMap::new();
        let mut std = StdHashMap::new();
        for key in &present {
            linear.insert(key.clone(), 0u64);
            hashbrown.insert(key.clone(), 0u64);
            std.insert(key.clone(), 0u64);
        }

        group.throughput(Throughput::Elements(probes.len() as u64));

        group.bench_function(format!("linear_hash/{size}"), |b| {
            b.iter(|| {
                for key in &probes {
                    black_box(linear.search(key));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for key in &probes {
                    black_box(hashbrown.get(key));
                }
            })
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter(|| {
                for key in &probes {
                    black_box(std.get(key));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("remove_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("linear_hash/{size}"), |b| {
            b.iter_batched(
                || {
                    let map: LinearHashMap<K, u64, FoldHash> =
                        keys.iter().cloned().map(|k| (k, 0)).collect();
                    (map, shuffled(&keys))
                },
                |(mut map, keys)| {
                    for key in &keys {
                        black_box(map.remove(key));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let map: HashbrownHashMap<K, u64> =
                        keys.iter().cloned().map(|k| (k, 0)).collect();
                    (map, shuffled(&keys))
                },
                |(mut map, keys)| {
                    for key in &keys {
                        black_box(map.remove(key));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter_batched(
                || {
                    let map: StdHashMap<K, u64> = keys.iter().cloned().map(|k| (k, 0)).collect();
                    (map, shuffled(&keys))
                },
                |(mut map, keys)| {
                    for key in &keys {
                        black_box(map.remove(key));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_mixed_zipf<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    const KEY_SPACE_MULTIPLIER: f64 = 2.0;

    for exponent in [1.0, 1.3] {
        let mut group = c.benchmark_group(format!(
            "mixed_zipf_{:.01}_{}",
            exponent,
            core::any::type_name::<K>()
        ));
        group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

        for &size in SIZES[..=MAX_SIZE].iter() {
            let mut rng = SmallRng::from_os_rng();
            let op_distr = Zipf::new(3.0, exponent).unwrap();
            let key_distr = Zipf::new(size as f64 * KEY_SPACE_MULTIPLIER, 1.0).unwrap();

            let workload = (0..size * 3)
                .map(|_| {
                    let op_choice: f64 = rng.sample(op_distr);
                    let op = if op_choice <= 1.0 {
                        Operation::Find
                    } else if op_choice <= 2.0 {
                        Operation::Insert
                    } else {
                        Operation::Remove
                    };
                    (op, K::new(rng.sample(key_distr) as u64))
                })
                .collect::<Vec<(Operation, K)>>();

            group.throughput(Throughput::Elements(workload.len() as u64));

            group.bench_function(format!("linear_hash/{size}"), |b| {
                b.iter_batched(
                    || workload.clone(),
                    |workload| {
                        let mut map = LinearHashMap::with_hasher(FoldHash);
                        for (op, key) in workload {
                            match op {
                                Operation::Insert => {
                                    black_box(map.modify(key, 0u64));
                                }
                                Operation::Find => {
                                    black_box(map.search(&key));
                                }
                                Operation::Remove => {
                                    black_box(map.remove(&key));
                                }
                            }
                        }
                        black_box(map)
                    },
                    BatchSize::SmallInput,
                )
            });

            group.bench_function(format!("hashbrown/{size}"), |b| {
                b.iter_batched(
                    || workload.clone(),
                    |workload| {
                        let mut map = HashbrownHashMap::new();
                        for (op, key) in workload {
                            match op {
                                Operation::Insert => {
                                    black_box(map.insert(key, 0u64));
                                }
                                Operation::Find => {
                                    black_box(map.get(&key));
                                }
                                Operation::Remove => {
                                    black_box(map.remove(&key));
                                }
                            }
                        }
                        black_box(map)
                    },
                    BatchSize::SmallInput,
                )
            });

            group.bench_function(format!("std/{size}"), |b| {
                b.iter_batched(
                    || workload.clone(),
                    |workload| {
                        let mut map = StdHashMap::new();
                        for (op, key) in workload {
                            match op {
                                Operation::Insert => {
                                    black_box(map.insert(key, 0u64));
                                }
                                Operation::Find => {
                                    black_box(map.get(&key));
                                }
                                Operation::Remove => {
                                    black_box(map.remove(&key));
                                }
                            }
                        }
                        black_box(map)
                    },
                    BatchSize::SmallInput,
                )
            });
        }

        group.finish();
    }
}

fn bench_churn<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("churn_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        // Every key shows up twice: the first visit inserts, the second removes.
        let keys = (0..size as u64)
            .flat_map(|i| {
                let key = K::new(i);
                [key.clone(), key]
            })
            .collect::<Vec<K>>();

        group.throughput(Throughput::Elements(keys.len() as u64));

        group.bench_function(format!("linear_hash/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut map = LinearHashMap::with_hasher(FoldHash);
                    for key in keys {
                        match map.entry(key) {
                            linear_hash::Entry::Vacant(entry) => {
                                black_box(entry.insert(0u64));
                            }
                            linear_hash::Entry::Occupied(entry) => {
                                black_box(entry.remove());
                            }
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut map = HashbrownHashMap::new();
                    for key in keys {
                        match map.entry(key) {
                            hashbrown::hash_map::Entry::Vacant(entry) => {
                                black_box(entry.insert(0u64));
                            }
                            hashbrown::hash_map::Entry::Occupied(entry) => {
                                black_box(entry.remove());
                            }
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut map = StdHashMap::new();
                    for key in keys {
                        match map.entry(key) {
                            std::collections::hash_map::Entry::Vacant(entry) => {
                                black_box(entry.insert(0u64));
                            }
                            std::collections::hash_map::Entry::Occupied(entry) => {
                                black_box(entry.remove());
                            }
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<SmallKey, 4>,
    bench_insert_random::<StringKey, 4>,
    bench_find_hit_miss::<SmallKey, 4>,
    bench_find_hit_miss::<StringKey, 4>,
    bench_remove::<SmallKey, 4>,
    bench_remove::<StringKey, 4>,
    bench_mixed_zipf::<SmallKey, 4>,
    bench_mixed_zipf::<StringKey, 3>,
    bench_churn::<SmallKey, 4>,
    bench_churn::<StringKey, 3>,
);

criterion_main!(benches);
