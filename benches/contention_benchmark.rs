use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crossbeam_utils::CachePadded;
use hetero_atomic::{DeviceAtomic, MemoryOrder};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

const OPS_PER_THREAD: usize = 10_000;

fn bench_shared_counter(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared_counter");

    for threads in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("std::AtomicU64", threads), &threads, |b, &threads| {
            b.iter(|| {
                let counter = AtomicU64::new(0);
                thread::scope(|s| {
                    for _ in 0..threads {
                        s.spawn(|| {
                            for _ in 0..OPS_PER_THREAD {
                                counter.fetch_add(1, Ordering::Relaxed);
                            }
                        });
                    }
                });
                black_box(counter.load(Ordering::Relaxed))
            })
        });

        group.bench_with_input(BenchmarkId::new("DeviceAtomic<u64>", threads), &threads, |b, &threads| {
            b.iter(|| {
                let counter = DeviceAtomic::<u64>::new(0);
                thread::scope(|s| {
                    for _ in 0..threads {
                        s.spawn(|| {
                            for _ in 0..OPS_PER_THREAD {
                                counter.fetch_add(1, MemoryOrder::Relaxed);
                            }
                        });
                    }
                });
                black_box(counter.load(MemoryOrder::Relaxed))
            })
        });

        group.bench_with_input(BenchmarkId::new("DeviceAtomic<f32>", threads), &threads, |b, &threads| {
            b.iter(|| {
                let sum = DeviceAtomic::<f32>::new(0.0);
                thread::scope(|s| {
                    for _ in 0..threads {
                        s.spawn(|| {
                            for _ in 0..OPS_PER_THREAD {
                                sum.fetch_add(1.0, MemoryOrder::Relaxed);
                            }
                        });
                    }
                });
                black_box(sum.load(MemoryOrder::Relaxed))
            })
        });
    }

    group.finish();
}

fn bench_padded_counters(c: &mut Criterion) {
    let mut group = c.benchmark_group("padded_counters");
    let threads = 4;

    group.bench_function("adjacent", |b| {
        b.iter(|| {
            let counters: Vec<DeviceAtomic<u32>> = (0..threads).map(|_| DeviceAtomic::new(0)).collect();
            thread::scope(|s| {
                for counter in &counters {
                    s.spawn(move || {
                        for _ in 0..OPS_PER_THREAD {
                            counter.fetch_add(1, MemoryOrder::Relaxed);
                        }
                    });
                }
            });
            black_box(counters.len())
        })
    });

    group.bench_function("cache_padded", |b| {
        b.iter(|| {
            let counters: Vec<CachePadded<DeviceAtomic<u32>>> =
                (0..threads).map(|_| CachePadded::new(DeviceAtomic::new(0))).collect();
            thread::scope(|s| {
                for counter in &counters {
                    s.spawn(move || {
                        for _ in 0..OPS_PER_THREAD {
                            counter.fetch_add(1, MemoryOrder::Relaxed);
                        }
                    });
                }
            });
            black_box(counters.len())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_shared_counter, bench_padded_counters);
criterion_main!(benches);
