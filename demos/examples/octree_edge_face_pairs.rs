// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Broad phase for a boolean operation between two meshes.
//!
//! Index the faces of mesh B, then collect candidate (edge of A, face of B)
//! pairs the way a CSG intersection step would, and compare the candidate
//! count with the all-pairs product.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p understory_demos --example octree_edge_face_pairs`

use glam::DVec3;
use understory_octree::{Aabb3D, Edge, Octree, PolyMesh, QueryShape};

const EPS: f64 = 1e-9;

fn main() {
    env_logger::init();

    let a = PolyMesh::box_grid(DVec3::ZERO, DVec3::splat(4.0), 12);
    let b = PolyMesh::box_grid(DVec3::splat(2.5), DVec3::splat(6.5), 12);

    let box_a = a.aabb().expect("mesh has vertices");
    let box_b = b.aabb().expect("mesh has vertices");
    let bounds = Aabb3D::from_points([box_a.min(), box_a.max(), box_b.min(), box_b.max()])
        .expect("four corners");

    let mut tree: Octree<'_> = Octree::new(EPS);
    tree.set_bounds_aabb(bounds);
    tree.add_faces(b.faces()).expect("bounds are set");
    tree.split_tree();

    let mut pairs = 0_usize;
    let mut candidates = Vec::new();
    for edge in a.edges() {
        candidates.clear();
        tree.find_faces_near_edge(edge, &mut candidates);
        pairs += candidates.len();
    }
    log::info!("octree after the broad phase: {:?}", tree.stats());

    // The same segment test run against every face. It also accepts faces
    // whose bounds and plane the edge crosses away from the face itself, which
    // the octree may skip, so the octree never reports more.
    let brute_force: usize = a
        .edges()
        .iter()
        .map(|e| {
            let s = e.segment();
            b.faces().iter().filter(|f| s.matches_face(*f, EPS)).count()
        })
        .sum();
    assert!(pairs <= brute_force);

    let all_pairs = a.edges().len() * b.faces().len();
    println!("edges of A: {}, faces of B: {}", a.edges().len(), b.faces().len());
    println!("all pairs:         {all_pairs}");
    println!("all-faces test:    {brute_force}");
    println!("octree candidates: {pairs}");
}
