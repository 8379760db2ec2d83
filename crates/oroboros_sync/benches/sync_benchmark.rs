//! # Synchronization Primitive Benchmark
//!
//! Measures the cost of the blocking primitives on their common paths:
//! - Uncontended lock/unlock (Mutex, Read, Write)
//! - Upgrade/downgrade round trip
//! - Semaphore signal/wait pairs
//! - Read-heavy contention with a single writer
//!
//! Run with: `cargo bench --package oroboros_sync`

// Benchmarks don't need docs
#![allow(missing_docs)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use oroboros_sync::{ConditionVariable, Mutex, ReadWriteMutex, Semaphore, SyncContext};

/// Benchmark: Uncontended acquire/release of each lock flavour.
fn bench_uncontended(c: &mut Criterion) {
    let ctx = SyncContext::default();
    let mutex = Mutex::new(&ctx);
    let rw = ReadWriteMutex::new(&ctx);

    let mut group = c.benchmark_group("uncontended");

    group.bench_function("mutex_lock", |b| {
        b.iter(|| {
            let lock = mutex.lock();
            black_box(&lock);
        });
    });

    group.bench_function("rw_read", |b| {
        b.iter(|| {
            let lock = rw.read();
            black_box(&lock);
        });
    });

    group.bench_function("rw_write", |b| {
        b.iter(|| {
            let lock = rw.write();
            black_box(&lock);
        });
    });

    group.bench_function("rw_upgrade_downgrade", |b| {
        b.iter(|| {
            let mut lock = rw.read();
            lock.upgrade_to_write();
            lock.downgrade_to_read();
            black_box(&lock);
        });
    });

    group.finish();
}

/// Benchmark: Semaphore signal followed by wait on one thread.
fn bench_semaphore(c: &mut Criterion) {
    let sem = Semaphore::new(&SyncContext::default(), 0);

    c.bench_function("semaphore_signal_wait", |b| {
        b.iter(|| {
            sem.signal_one();
            sem.wait();
        });
    });
}

/// Benchmark: Condition variable signal with nobody waiting.
fn bench_condvar_idle_signal(c: &mut Criterion) {
    let cv = ConditionVariable::new(&SyncContext::default(), 0_u64);

    c.bench_function("condvar_signal_no_waiters", |b| {
        b.iter(|| {
            *cv.lock() += 1;
            cv.signal();
        });
    });
}

/// Benchmark: Writer throughput while N background readers hammer the lock.
fn bench_read_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_under_read_load");

    for readers in [1_usize, 2, 4] {
        let rw = Arc::new(ReadWriteMutex::new(&SyncContext::default()));
        let stop = Arc::new(AtomicBool::new(false));

        let handles: Vec<_> = (0..readers)
            .map(|_| {
                let rw = Arc::clone(&rw);
                let stop = Arc::clone(&stop);
                thread::spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        let lock = rw.read();
                        black_box(&lock);
                    }
                })
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(readers), &readers, |b, _| {
            b.iter(|| {
                let lock = rw.write();
                black_box(&lock);
            });
        });

        stop.store(true, Ordering::Relaxed);
        for h in handles {
            h.join().unwrap();
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_uncontended,
    bench_semaphore,
    bench_condvar_idle_signal,
    bench_read_contention,
);
criterion_main!(benches);
