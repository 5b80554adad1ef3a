/*
 * Flock Benchmark
 *
 * Measures the three costs that make up a tick: rebuilding the spatial
 * grid, answering neighbor queries, and the full parallel update.
 */

use std::time::Duration;

use boids::flock::Flock;
use boids::rules::Rules;
use boids::sampler::{Sampler, UniformSampler};
use boids::spatial_grid::{PseudoBoid, SpatialGrid, DEFAULT_NODES_PER_AXIS};
use boids::Domain;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const SIZES: [usize; 4] = [500, 1000, 4000, 10000];
const SEED: u64 = 3;

fn population(n: usize) -> (Vec<boids::Vector2>, Vec<boids::Vector2>) {
    let domain = Domain::default();
    let mut positions = UniformSampler::domain_interior_seeded(&domain, SEED).unwrap();
    let mut velocities = UniformSampler::seeded(0.5..50.0, 0.5..50.0, SEED + 1).unwrap();
    (0..n).map(|_| (positions.sample(), velocities.sample())).unzip()
}

// Benchmark clearing, inserting and aggregating
fn bench_grid_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_rebuild");

    for n in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let (positions, velocities) = population(n);
            let mut grid = SpatialGrid::new(Domain::default(), DEFAULT_NODES_PER_AXIS).unwrap();

            b.iter(|| {
                grid.rebuild(black_box(&positions), black_box(&velocities));
            });
        });
    }

    group.finish();
}

// Benchmark one two-tier query per agent
fn bench_neighbor_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_queries");

    for n in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let (positions, velocities) = population(n);
            let mut grid = SpatialGrid::new(Domain::default(), DEFAULT_NODES_PER_AXIS).unwrap();
            grid.rebuild(&positions, &velocities);
            let mut neighbors: Vec<PseudoBoid> = Vec::new();

            b.iter(|| {
                let mut total = 0;
                for &p in &positions {
                    grid.get_neighbors(p, &mut neighbors);
                    total += neighbors.len();
                }
                black_box(total)
            });
        });
    }

    group.finish();
}

// Benchmark the whole tick at 1 and 4 workers
fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    let rules = Rules::default();

    for workers in [1, 4] {
        for n in SIZES {
            let id = BenchmarkId::new(format!("{workers}_workers"), n);
            group.bench_with_input(id, &n, |b, &n| {
                let (positions, velocities) = population(n);
                let mut positions = positions.into_iter();
                let mut velocities = velocities.into_iter();
                let mut flock = Flock::with_workers(
                    n,
                    &mut || positions.next().unwrap_or_default(),
                    &mut || velocities.next().unwrap_or_default(),
                    workers,
                )
                .unwrap();
                let mut grid = SpatialGrid::new(Domain::default(), DEFAULT_NODES_PER_AXIS).unwrap();

                b.iter(|| black_box(flock.update(1.0 / 60.0, &rules, &mut grid)));
            });
        }
    }

    group.finish();
}

// Configure the benchmarks
criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));
    targets = bench_grid_rebuild, bench_neighbor_queries, bench_update
}

criterion_main!(benches);
