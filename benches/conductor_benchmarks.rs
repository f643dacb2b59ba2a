use conductor::{Conductor, Tempo, TempoMap, TimeChangePoint, TimeSignature};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// Tempo map with `count` changes, one every 4 seconds
fn build_points(count: usize) -> Vec<TimeChangePoint> {
    (0..count)
        .map(|i| {
            let bpm = 90.0 + (i % 7) as f64 * 15.0;
            TimeChangePoint::from_parts(i as f64 * 4000.0, bpm, 3 + (i % 2) as u32, 4)
        })
        .collect()
}

/// Benchmark forward/inverse queries against growing tempo maps
fn bench_tempo_map_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("tempo_map");

    for count in [1usize, 16, 64] {
        let map = TempoMap::new(build_points(count), Tempo::default(), TimeSignature::default());
        let end_ms = count as f64 * 4000.0;

        group.bench_with_input(BenchmarkId::new("step_at", count), &map, |b, map| {
            let mut t = 0.0;
            b.iter(|| {
                t = (t + 16.7) % end_ms;
                black_box(map.step_at(black_box(t)))
            });
        });

        group.bench_with_input(BenchmarkId::new("time_at_step", count), &map, |b, map| {
            let end_step = map.step_at(end_ms);
            let mut step = 0.0;
            b.iter(|| {
                step = (step + 0.37) % end_step;
                black_box(map.time_at_step(black_box(step)))
            });
        });
    }
    group.finish();
}

/// Benchmark one conductor tick per simulated 60 FPS frame (critical per-frame cost)
fn bench_conductor_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("conductor");

    for count in [1usize, 64] {
        let mut conductor = Conductor::new();
        conductor.map_song(120.0, build_points(count));
        conductor.on_beat_hit(|beat| {
            black_box(beat);
        });
        let end_ms = count as f64 * 4000.0;

        group.bench_function(BenchmarkId::new("tick", count), |b| {
            let mut t = 0.0;
            b.iter(|| {
                t = (t + 1000.0 / 60.0) % end_ms.max(4000.0);
                conductor.tick(black_box(t));
            });
        });
    }
    group.finish();
}

/// Benchmark inserting a change mid-map (full recompute of later points)
fn bench_add_point(c: &mut Criterion) {
    let base = TempoMap::new(build_points(64), Tempo::default(), TimeSignature::default());

    c.bench_function("tempo_map_add_point", |b| {
        b.iter(|| {
            let mut map = base.clone();
            let _ = map.add_point(TimeChangePoint::from_parts(black_box(2000.0), 133.0, 4, 4));
            black_box(map)
        });
    });
}

criterion_group!(
    benches,
    bench_tempo_map_queries,
    bench_conductor_tick,
    bench_add_point
);
criterion_main!(benches);
