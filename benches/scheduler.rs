// SPDX-License-Identifier: MPL-2.0
//! Benchmarks for the playback hot paths.
//!
//! Measures the performance of:
//! - A global tick over many playing instances
//! - Cached frame reads (no decode)
//! - Scrubbing across frames (one decode per read)

use bytes::Bytes;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use playback_core::infrastructure::{Y4mBuilder, Y4mDecoder};
use playback_core::video_player::{Scheduler, Video};
use std::hint::black_box;

/// A 2 s, 64x48, 30 fps stream.
fn sample_stream() -> Bytes {
    Y4mBuilder::new(64, 48)
        .frame_rate(30, 1)
        .duration_secs(2.0)
        .build()
}

/// Benchmark `update_all` over a growing number of instances.
///
/// Instances loop so every iteration does real work.
fn bench_update_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler");
    let stream = sample_stream();

    for count in [1_usize, 16, 256] {
        let scheduler = Scheduler::new();
        let videos: Vec<Video> = (0..count)
            .map(|_| {
                let video = Video::with_scheduler(Y4mDecoder::new(), &scheduler);
                video.load(stream.clone()).unwrap();
                video.set_loop(true);
                video.play();
                video
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("update_all", count), &count, |b, _| {
            b.iter(|| black_box(scheduler.update_all(black_box(1.0 / 90.0))));
        });

        drop(videos);
    }

    group.finish();
}

/// Benchmark repeated `data()` reads at an unchanged position.
fn bench_cached_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("frames");
    let scheduler = Scheduler::new();
    let video = Video::with_scheduler(Y4mDecoder::new(), &scheduler);
    video.load(sample_stream()).unwrap();
    video.seek(1.0);
    video.data().unwrap();

    group.bench_function("cached_data", |b| {
        b.iter(|| black_box(video.data().unwrap().slice(..16)));
    });

    group.bench_function("scrub_data", |b| {
        let mut position = 0.0;
        b.iter(|| {
            position = (position + 0.05) % 2.0;
            video.seek(position);
            black_box(video.data().unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_update_all, bench_cached_data);
criterion_main!(benches);
