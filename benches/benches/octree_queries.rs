// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::DVec3;
use understory_octree::{Aabb3D, Edge, Octree, PolyMesh, QueryShape};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

// Points scattered over the surface of the box `0..size` on every axis.
fn gen_surface_points(count: usize, size: f64) -> Vec<DVec3> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let u = rng.next_f64() * size;
        let v = rng.next_f64() * size;
        let side = if rng.next_f64() < 0.5 { 0.0 } else { size };
        out.push(match i % 3 {
            0 => DVec3::new(side, u, v),
            1 => DVec3::new(u, side, v),
            _ => DVec3::new(u, v, side),
        });
    }
    out
}

fn gen_boxes(count: usize, size: f64, half: f64) -> Vec<Aabb3D> {
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    (0..count)
        .map(|_| {
            let c = DVec3::new(rng.next_f64(), rng.next_f64(), rng.next_f64()) * size;
            Aabb3D::new(c, DVec3::splat(half))
        })
        .collect()
}

fn loaded_tree(mesh: &PolyMesh) -> Octree<'_> {
    let mut tree = Octree::new(1e-9);
    tree.set_bounds_aabb(mesh.aabb().unwrap());
    tree.add_vertices(mesh.vertices()).unwrap();
    tree.add_edges(mesh.edges()).unwrap();
    tree.add_faces(mesh.faces()).unwrap();
    tree
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[8usize, 16, 32] {
        let mesh = PolyMesh::box_grid(DVec3::ZERO, DVec3::splat(100.0), n);
        group.throughput(Throughput::Elements(mesh.faces().len() as u64));
        group.bench_function(format!("load_split_tree_n{}", n), |b| {
            b.iter(|| {
                let mut tree = loaded_tree(&mesh);
                tree.split_tree();
                black_box(tree.stats());
            });
        });
    }
    group.finish();
}

fn bench_point_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_queries");
    let points = gen_surface_points(1024, 100.0);
    group.throughput(Throughput::Elements(points.len() as u64));
    for &n in &[8usize, 16, 32] {
        let mesh = PolyMesh::box_grid(DVec3::ZERO, DVec3::splat(100.0), n);
        // First queries pay for lazy splits; this measures the settled tree.
        group.bench_function(format!("faces_near_point_warm_n{}", n), |b| {
            let mut tree = loaded_tree(&mesh);
            tree.split_tree();
            let mut out = Vec::new();
            b.iter(|| {
                for p in &points {
                    out.clear();
                    tree.find_faces_near(p, &mut out);
                    black_box(out.len());
                }
            });
        });
        group.bench_function(format!("faces_near_point_cold_n{}", n), |b| {
            b.iter_batched(
                || loaded_tree(&mesh),
                |mut tree| {
                    let mut out = Vec::new();
                    for p in &points {
                        out.clear();
                        tree.find_faces_near(p, &mut out);
                        black_box(out.len());
                    }
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("faces_near_point_brute_force_n{}", n), |b| {
            b.iter(|| {
                for p in &points {
                    let hits = mesh.faces().iter().filter(|f| p.matches_face(*f, 1e-9)).count();
                    black_box(hits);
                }
            });
        });
    }
    group.finish();
}

fn bench_box_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("box_queries");
    let boxes = gen_boxes(512, 100.0, 2.5);
    group.throughput(Throughput::Elements(boxes.len() as u64));
    let mesh = PolyMesh::box_grid(DVec3::ZERO, DVec3::splat(100.0), 32);
    let mut tree = loaded_tree(&mesh);
    tree.split_tree();
    group.bench_function("edges_near_box_n32", |b| {
        let mut out = Vec::new();
        b.iter(|| {
            for q in &boxes {
                out.clear();
                tree.find_edges_near(q, &mut out);
                black_box(out.len());
            }
        });
    });
    group.finish();
}

fn bench_edge_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("edge_pairs");
    let mesh = PolyMesh::box_grid(DVec3::ZERO, DVec3::splat(100.0), 16);
    group.throughput(Throughput::Elements(mesh.edges().len() as u64));
    group.bench_function("faces_near_every_edge_n16", |b| {
        let mut tree = loaded_tree(&mesh);
        tree.split_tree();
        let mut out = Vec::new();
        b.iter(|| {
            let mut pairs = 0;
            for e in mesh.edges() {
                out.clear();
                tree.find_faces_near_edge(e, &mut out);
                pairs += out.len();
            }
            black_box(pairs);
        });
    });
    group.bench_function("faces_near_every_edge_brute_force_n16", |b| {
        b.iter(|| {
            let mut pairs = 0;
            for e in mesh.edges() {
                let s = e.segment();
                pairs += mesh.faces().iter().filter(|f| s.matches_face(*f, 1e-9)).count();
            }
            black_box(pairs);
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_point_queries,
    bench_box_queries,
    bench_edge_pairs
);
criterion_main!(benches);
