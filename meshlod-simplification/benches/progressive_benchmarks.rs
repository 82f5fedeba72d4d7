//! Benchmarks for collapse ordering and LOD generation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use meshlod_core::{IndexedMesh, Point3f};
use meshlod_simplification::{LodTarget, MeshSimplifier, ProgressiveMesh, ProgressiveMeshSimplifier};

fn generate_grid_mesh(size: usize) -> IndexedMesh {
    let mut vertices = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let fx = x as f32 / (size - 1) as f32 * std::f32::consts::PI;
            let fy = y as f32 / (size - 1) as f32 * std::f32::consts::PI;
            vertices.push(Point3f::new(
                x as f32,
                y as f32,
                (fx.sin() * fy.sin()) * 2.0,
            ));
        }
    }
    let mut faces = Vec::with_capacity((size - 1) * (size - 1) * 2);
    for y in 0..(size - 1) {
        for x in 0..(size - 1) {
            let tl = y * size + x;
            let tr = tl + 1;
            let bl = (y + 1) * size + x;
            let br = bl + 1;
            faces.push([tl, bl, tr]);
            faces.push([tr, bl, br]);
        }
    }
    IndexedMesh::from_triangles(vertices, &faces)
}

fn bench_collapse_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("collapse_ordering");
    for &size in &[10, 20, 40] {
        let mesh = generate_grid_mesh(size);
        let pm = ProgressiveMesh::from_mesh(&mesh).unwrap();
        group.bench_with_input(
            BenchmarkId::new("build", format!("{}f", pm.face_count())),
            &pm,
            |b, pm| b.iter(|| black_box(pm.build_collapse_operations())),
        );
    }
    group.finish();
}

fn bench_lod_generation(c: &mut Criterion) {
    let mesh = generate_grid_mesh(40);
    let pm = ProgressiveMesh::from_mesh(&mesh).unwrap();
    let ops = pm.build_collapse_operations();

    let mut group = c.benchmark_group("lod_generation");
    for &percent in &[75.0f32, 50.0, 10.0] {
        group.bench_with_input(
            BenchmarkId::new("replay", format!("p{}", percent as u32)),
            &percent,
            |b, &percent| {
                b.iter(|| black_box(ops.generate_lod_mesh(&pm, LodTarget::Percent(percent), Some(&mesh))))
            },
        );
    }
    group.bench_function("chain", |b| {
        let targets = [75.0, 50.0, 25.0, 10.0].map(LodTarget::Percent);
        b.iter(|| black_box(ops.generate_lod_chain(&pm, &targets, Some(&mesh))))
    });
    group.finish();
}

fn bench_simplifier(c: &mut Criterion) {
    let mesh = generate_grid_mesh(20);
    let simplifier = ProgressiveMeshSimplifier::new();
    c.bench_function("simplify_r50", |b| {
        b.iter(|| black_box(simplifier.simplify(black_box(&mesh), 0.5).unwrap()))
    });
}

criterion_group!(benches, bench_collapse_ordering, bench_lod_generation, bench_simplifier);
criterion_main!(benches);
