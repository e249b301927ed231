use std::sync::Arc;
use std::time::Duration;

use strata_mesh::{
    greedy_quads, AxisGroup, CancelToken, FaceVisibilityIndex, MeshConfig, MeshPass, VoxelGrid, MAP_DEPTH, MAP_HEIGHT,
    MAP_WIDTH,
};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const EMPTY: u32 = 0;
const DIMS: [u32; 3] = [MAP_WIDTH, MAP_HEIGHT, MAP_DEPTH];

fn bench_empty_space_greedy(c: &mut Criterion) {
    let mut group = c.benchmark_group("bench_empty_space_greedy");
    let grid = VoxelGrid::new(MAP_WIDTH, MAP_HEIGHT, MAP_DEPTH).unwrap();
    bench_each_group(&mut group, &grid);
    group.finish();
}

fn bench_terrain_greedy(c: &mut Criterion) {
    let mut group = c.benchmark_group("bench_terrain_greedy");
    let grid = VoxelGrid::from_fn(DIMS, terrain_voxel).unwrap();
    bench_each_group(&mut group, &grid);
    group.finish();
}

fn bench_sphere_greedy(c: &mut Criterion) {
    let mut group = c.benchmark_group("bench_sphere_greedy");
    let grid = VoxelGrid::from_fn([32; 3], |p| sphere_voxel(into_domain(32, p.as_uvec3().to_array()))).unwrap();
    bench_each_group(&mut group, &grid);
    group.finish();
}

fn bench_terrain_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("bench_terrain_pass");
    let grid = Arc::new(VoxelGrid::from_fn(DIMS, terrain_voxel).unwrap());

    group.bench_function("three_workers", |b| {
        b.iter(|| {
            MeshPass::run_blocking(
                Arc::clone(&grid),
                MeshConfig::default(),
                Duration::from_micros(50),
            )
            .unwrap()
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_terrain_greedy,
    bench_sphere_greedy,
    bench_empty_space_greedy,
    bench_terrain_pass
);
criterion_main!(benches);

fn bench_each_group(
    group: &mut criterion::BenchmarkGroup<criterion::measurement::WallTime>,
    grid: &VoxelGrid,
) {
    let never = CancelToken::new();
    for axes in AxisGroup::ALL {
        // Do a single run first to size the quad buffer.
        let mut index = FaceVisibilityIndex::new(grid, axes);
        let mut quads = Vec::new();
        index.scan(grid).unwrap();
        greedy_quads(grid, &mut index, &never, &mut quads).unwrap();

        group.bench_with_input(
            BenchmarkId::new(axes.name(), format!("quads={}", quads.len())),
            &(),
            |b, _| {
                b.iter(|| {
                    quads.clear();
                    index.scan(grid).unwrap();
                    greedy_quads(grid, &mut index, &never, &mut quads).unwrap();
                });
            },
        );
    }
}

/// Rolling hills, one material per layer.
fn terrain_voxel(p: strata_mesh::VoxelCoordinate) -> u32 {
    let h = 1.0 + 1.5 * ((p.x as f32 * 0.2).sin() + (p.y as f32 * 0.15).cos());
    if (p.z as f32) < h {
        1 + p.z as u32
    } else {
        EMPTY
    }
}

fn sphere_voxel([x, y, z]: [f32; 3]) -> u32 {
    let d = x * x + y * y + z * z;

    if d > 0.9 {
        EMPTY
    } else {
        1
    }
}

fn into_domain(array_dim: u32, [x, y, z]: [u32; 3]) -> [f32; 3] {
    [
        (2.0 * x as f32 / array_dim as f32) - 1.0,
        (2.0 * y as f32 / array_dim as f32) - 1.0,
        (2.0 * z as f32 / array_dim as f32) - 1.0,
    ]
}
