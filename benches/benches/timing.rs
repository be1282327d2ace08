// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_timing::{Debounce, TimerQueue};

fn bench_timer_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("timing/queue");

    for len in [64usize, 1_024, 8_192] {
        group.throughput(Throughput::Elements(len as u64));

        // Deadlines arrive out of order, as hover and autosave timers do.
        group.bench_with_input(BenchmarkId::new("schedule_drain", len), &len, |b, &len| {
            b.iter(|| {
                let mut timers = TimerQueue::new();
                for key in 0..len as u64 {
                    timers.schedule(key, (key * 7_919) % 10_000);
                }
                black_box(timers.pop_expired(10_000));
            });
        });

        group.bench_with_input(BenchmarkId::new("cancel_half", len), &len, |b, &len| {
            b.iter(|| {
                let mut timers = TimerQueue::new();
                let ids: Vec<_> = (0..len as u64).map(|key| timers.schedule(key, key)).collect();
                for id in ids.iter().step_by(2) {
                    timers.cancel(*id);
                }
                black_box(timers.len());
            });
        });
    }

    group.finish();
}

fn bench_debounce(c: &mut Criterion) {
    c.bench_function("timing/debounce_reschedule", |b| {
        let mut debounce = Debounce::new(200);
        let mut now = 0_u64;
        b.iter(|| {
            now += 10;
            debounce.schedule(now);
            black_box(debounce.poll(now));
        });
    });
}

criterion_group!(benches, bench_timer_queue, bench_debounce);
criterion_main!(benches);
