// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Octree basics.
//!
//! Load a tessellated box, pre-split, and run box, point, and segment queries.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example octree_basics`

use glam::DVec3;
use understory_octree::{Aabb3D, Octree, PolyMesh, Segment};

fn main() {
    env_logger::init();

    let mesh = PolyMesh::box_grid(DVec3::ZERO, DVec3::splat(10.0), 8);
    println!(
        "mesh: {} vertices, {} edges, {} faces",
        mesh.vertices().len(),
        mesh.edges().len(),
        mesh.faces().len()
    );

    let mut tree: Octree<'_> = Octree::new(1e-6);
    tree.set_bounds_aabb(mesh.aabb().expect("mesh has vertices"));
    tree.add_vertices(mesh.vertices()).expect("bounds are set");
    tree.add_edges(mesh.edges()).expect("bounds are set");
    tree.add_faces(mesh.faces()).expect("bounds are set");

    println!("before split_tree: {:?}", tree.stats());
    tree.split_tree();
    println!("after split_tree:  {:?}", tree.stats());

    // A small window on the z = 10 side.
    let window = Aabb3D::new(DVec3::new(5.0, 5.0, 10.0), DVec3::splat(0.4));
    let mut faces = Vec::new();
    tree.find_faces_near(&window, &mut faces);
    println!("faces near {:?}: {}", window, faces.len());
    for f in &faces {
        println!("  face {:?} centroid {}", f.vertices(), f.centroid());
    }

    // A lattice corner is shared by several edges.
    let corner = DVec3::new(10.0, 0.0, 0.0);
    let mut edges = Vec::new();
    tree.find_edges_near(&corner, &mut edges);
    println!("edges at {corner}: {}", edges.len());

    // Vertex queries may report a vertex once per leaf holding it.
    let mut vertices = Vec::new();
    tree.find_vertices_near_allow_dupes(&corner, &mut vertices);
    println!("vertex hits at {corner}: {} (duplicates allowed)", vertices.len());

    // A segment through the middle of the box reaches two opposite sides.
    let probe = Segment::new(DVec3::new(-1.0, 3.3, 6.1), DVec3::new(11.0, 3.3, 6.1));
    faces.clear();
    tree.find_faces_near(&probe, &mut faces);
    println!("faces along {:?}: {}", probe, faces.len());

    // Queries refine the tree as they go.
    println!("after queries:     {:?}", tree.stats());
}
