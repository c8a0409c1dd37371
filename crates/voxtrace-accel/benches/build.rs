use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use voxtrace_accel::{BvhConfig, KdTree, KdTreeConfig, MortonBvh};
use voxtrace_field::{TerrainConfig, cull, generate_terrain};
use voxtrace_geom::Voxel;
use voxtrace_greedy::{GreedyConfig, GreedyMeshing, GreedyVoxels};

fn terrain_voxels(size: usize) -> (voxtrace_geom::Box3i, Vec<Voxel>) {
    let cfg = TerrainConfig {
        size: [size, size / 2, size],
        ..TerrainConfig::default()
    };
    let field = generate_terrain(&cfg);
    let mask = cull(&field);
    let voxels = GreedyVoxels::new(&field, &mask, &GreedyConfig::default()).merge_to_vec();
    (field.bounds(), voxels)
}

fn bench_morton_bvh(c: &mut Criterion) {
    let mut group = c.benchmark_group("morton_bvh");
    let (_, voxels) = terrain_voxels(64);
    group.bench_function("terrain_64", |b| {
        b.iter(|| black_box(MortonBvh::build(&voxels, &BvhConfig::default())))
    });
    group.finish();
}

fn bench_kdtree(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree");
    let (bounds, voxels) = terrain_voxels(64);
    group.bench_function("voxels_terrain_64", |b| {
        b.iter(|| black_box(KdTree::build(&voxels, bounds, &KdTreeConfig::default())))
    });
    let field = generate_terrain(&TerrainConfig {
        size: [64, 32, 64],
        ..TerrainConfig::default()
    });
    let faces = GreedyMeshing::new(&field, &GreedyConfig::default()).mesh_to_vec();
    group.bench_function("faces_terrain_64", |b| {
        b.iter(|| black_box(KdTree::build(&faces, field.bounds(), &KdTreeConfig::default())))
    });
    group.finish();
}

fn bench_greedy(c: &mut Criterion) {
    let mut group = c.benchmark_group("greedy");
    let field = generate_terrain(&TerrainConfig {
        size: [64, 32, 64],
        ..TerrainConfig::default()
    });
    let mask = cull(&field);
    group.bench_function("voxels_terrain_64", |b| {
        b.iter(|| {
            black_box(GreedyVoxels::new(&field, &mask, &GreedyConfig::default()).merge_to_vec())
        })
    });
    group.bench_function("faces_terrain_64", |b| {
        b.iter(|| black_box(GreedyMeshing::new(&field, &GreedyConfig::default()).mesh_to_vec()))
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = bench_morton_bvh, bench_kdtree, bench_greedy
}
criterion_main!(benches);
