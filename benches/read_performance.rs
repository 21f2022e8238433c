//! Performance benchmarks for the layered configuration store.
//!
//! Reads walk the layers from the highest precedence down, so the cost of a
//! lookup depends on how deep the defining layer sits.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use halflife_launcher::prelude::*;
use halflife_launcher::sources::FileSource;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

/// Defaults, base file stand-in, settings stand-in and a command-line overlay.
fn launcher_stack() -> LayeredConfig {
    LayeredConfig::builder()
        .with_defaults([
            ("HalfLifeDirectory", "C:\\Games\\Half-Life"),
            ("Game", "valve"),
            ("Map", "c1a0"),
            ("MaxPlayers", "8"),
            ("Lan", "false"),
        ])
        .with_overlay("base", [("Game", "decay"), ("Map", "dy_accident1")])
        .with_overlay("settings", [("Map", "crossfire")])
        .with_overlay("cli", [("Lan", "true")])
        .build()
        .unwrap()
}

/// Benchmark lookups resolved at different layer depths
fn benchmark_layered_get(c: &mut Criterion) {
    let config = launcher_stack();

    let mut group = c.benchmark_group("layered_get");
    for (label, key) in [
        ("top_layer", "Lan"),
        ("second_layer", "Map"),
        ("bottom_layer", "MaxPlayers"),
        ("absent", "Mod"),
    ] {
        group.bench_function(label, |b| {
            b.iter(|| black_box(config.get(black_box(key))));
        });
    }
    group.finish();
}

/// Benchmark case-insensitive lookups against the stored spelling
fn benchmark_key_folding(c: &mut Criterion) {
    let config = launcher_stack();

    let mut group = c.benchmark_group("key_folding");
    group.bench_function("exact_case", |b| {
        b.iter(|| black_box(config.get("HalfLifeDirectory")));
    });
    group.bench_function("lower_case", |b| {
        b.iter(|| black_box(config.get("halflifedirectory")));
    });
    group.finish();
}

/// Benchmark merging every layer into one snapshot
fn benchmark_entries(c: &mut Criterion) {
    let config = launcher_stack();

    c.bench_function("entries", |b| {
        b.iter(|| black_box(config.entries()));
    });
}

/// Benchmark concurrent reads with varying thread counts
fn benchmark_concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_reads");

    for num_threads in [1, 2, 4, 8] {
        group.throughput(Throughput::Elements(num_threads as u64 * 1000));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_threads", num_threads)),
            &num_threads,
            |b, &num_threads| {
                let config = Arc::new(launcher_stack());
                let barrier = Arc::new(Barrier::new(num_threads + 1));

                b.iter_custom(|iters| {
                    let mut handles = vec![];

                    for _ in 0..num_threads {
                        let cfg = Arc::clone(&config);
                        let b = Arc::clone(&barrier);

                        handles.push(thread::spawn(move || {
                            b.wait();

                            let start = std::time::Instant::now();
                            for _ in 0..iters {
                                black_box(cfg.get("Map"));
                            }
                            start.elapsed()
                        }));
                    }

                    barrier.wait();

                    let total_duration: Duration =
                        handles.into_iter().map(|h| h.join().unwrap()).sum();
                    total_duration / num_threads as u32
                });
            },
        );
    }

    group.finish();
}

/// Benchmark reloading a file source while readers keep reading
fn benchmark_reload_under_load(c: &mut Criterion) {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let base = temp_dir.path().join("appsettings.json");
    std::fs::write(&base, r#"{ "Game": "decay", "Map": "dy_accident1" }"#).unwrap();

    let mut group = c.benchmark_group("reload_under_load");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("reload_with_8_readers", |b| {
        b.iter_custom(|iters| {
            let mut config = launcher_stack();
            let id = config.insert_source(1, FileSource::new(&base)).unwrap();
            let config = Arc::new(config);
            let keep_running = Arc::new(AtomicBool::new(true));
            let reads_completed = Arc::new(AtomicUsize::new(0));

            let readers: Vec<_> = (0..8)
                .map(|_| {
                    let cfg = Arc::clone(&config);
                    let running = Arc::clone(&keep_running);
                    let counter = Arc::clone(&reads_completed);
                    thread::spawn(move || {
                        while running.load(Ordering::Relaxed) {
                            black_box(cfg.get("Game"));
                            counter.fetch_add(1, Ordering::Relaxed);
                        }
                    })
                })
                .collect();

            let start = std::time::Instant::now();
            for _ in 0..iters {
                config.reload(id).unwrap();
            }
            let duration = start.elapsed();

            keep_running.store(false, Ordering::Relaxed);
            for reader in readers {
                reader.join().unwrap();
            }

            let total_reads = reads_completed.load(Ordering::Relaxed);
            println!("  Completed {} reads during {} reloads", total_reads, iters);

            duration
        });
    });

    group.finish();
}

/// Benchmark appending to the settings file
fn benchmark_set(c: &mut Criterion) {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let settings = temp_dir.path().join("settings.ini");

    let config = LayeredConfig::builder()
        .with_settings_file(&settings, true, false)
        .build()
        .unwrap();

    let mut group = c.benchmark_group("set");
    group.sample_size(20);
    let mut counter = 0u64;
    group.bench_function("append_line", |b| {
        b.iter(|| {
            counter += 1;
            config.set("MaxPlayers", counter.to_string()).unwrap();
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_layered_get,
    benchmark_key_folding,
    benchmark_entries,
    benchmark_concurrent_reads,
    benchmark_reload_under_load,
    benchmark_set,
);
criterion_main!(benches);
