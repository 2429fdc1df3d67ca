//! Spatial-index and fitting benchmarks using Criterion.
//!
//! Benchmarks cover:
//! - K-d tree construction (1K to 100K points)
//! - K-nearest and range queries
//! - K-nearest-neighbor graph construction
//! - Plane and quadric patch fits
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nalgebra::Vector3;
use pointfit_rs::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

// ============================================================================
// Data Generation with Reproducible RNG
// ============================================================================

/// Uniform points in the unit cube.
fn generate_cloud(size: usize, seed: u64) -> Vec<SamplePoint<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size)
        .map(|_| {
            SamplePoint::new(Vector3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            ))
        })
        .collect()
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_tree_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_build");
    for size in [1_000, 10_000, 100_000] {
        let points = generate_cloud(size, 1);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| KdTree::new(black_box(points.clone())));
        });
    }
    group.finish();
}

fn bench_knn_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_knn");
    for size in [10_000, 100_000] {
        let tree = KdTree::new(generate_cloud(size, 2));
        group.bench_with_input(BenchmarkId::from_parameter(size), &tree, |b, tree| {
            let mut index = 0;
            b.iter(|| {
                index = (index + 7919) % size;
                black_box(tree.k_nearest_neighbors_by_index(index, 15).unwrap())
            });
        });
    }
    group.finish();
}

fn bench_range_queries(c: &mut Criterion) {
    let tree = KdTree::new(generate_cloud(50_000, 3));
    c.bench_function("kdtree_range", |b| {
        b.iter(|| {
            black_box(
                tree.range_neighbors(black_box(&Vector3::new(0.1, -0.2, 0.3)), 0.1)
                    .unwrap(),
            )
        });
    });
}

fn bench_graph_construction(c: &mut Criterion) {
    let tree = KdTree::new(generate_cloud(10_000, 4));
    c.bench_function("knn_graph_build", |b| {
        b.iter(|| black_box(KnnGraph::new(&tree, 10).unwrap()));
    });
}

fn bench_fits(c: &mut Criterion) {
    let tree = KdTree::new(generate_cloud(20_000, 5));
    let mut group = c.benchmark_group("fits");

    group.bench_function("covariance_plane", |b| {
        let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 0.15);
        let mut fit = CovariancePlaneFit::new(weight);
        let mut index = 0;
        b.iter(|| {
            index = (index + 101) % tree.sample_count();
            black_box(fit_at_index(&mut fit, &tree, index).unwrap())
        });
    });

    group.bench_function("monge_patch", |b| {
        let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 0.15);
        let mut fit = MongePatchFit::new(weight);
        let mut index = 0;
        b.iter(|| {
            index = (index + 101) % tree.sample_count();
            black_box(fit_at_index(&mut fit, &tree, index).unwrap())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_tree_construction,
    bench_knn_queries,
    bench_range_queries,
    bench_graph_construction,
    bench_fits
);
criterion_main!(benches);
