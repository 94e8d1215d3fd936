// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index a mesh type the crate knows nothing about.
//!
//! Any mesh can be indexed by implementing `Vertex`, `Edge`, and `Face` on its
//! own types. Here a bare triangle soup with per-triangle tags.
//!
//! Run:
//! - `cargo run -p understory_demos --example octree_custom_mesh`

use glam::DVec3;
use understory_octree::{Aabb3D, Edge, Face, Octree, Plane, Tag, Vertex};

#[derive(Debug)]
struct Point(DVec3);

impl Vertex for Point {
    fn position(&self) -> DVec3 {
        self.0
    }
}

#[derive(Debug)]
struct Stick {
    ends: [DVec3; 2],
    tag: Tag,
}

impl Edge for Stick {
    fn endpoints(&self) -> (DVec3, DVec3) {
        (self.ends[0], self.ends[1])
    }

    fn tag(&self) -> &Tag {
        &self.tag
    }
}

#[derive(Debug)]
struct Tri {
    corners: [DVec3; 3],
    tag: Tag,
}

impl Face for Tri {
    fn vertex_count(&self) -> usize {
        3
    }

    fn vertex(&self, i: usize) -> DVec3 {
        self.corners[i]
    }

    fn aabb(&self) -> Aabb3D {
        Aabb3D::from_points(self.corners).expect("three corners")
    }

    fn plane(&self) -> Plane {
        Plane::from_points(self.corners[0], self.corners[1], self.corners[2])
    }

    fn tag(&self) -> &Tag {
        &self.tag
    }
}

fn main() {
    env_logger::init();

    // A fan of triangles around the z axis.
    let n = 64;
    let tris: Vec<Tri> = (0..n)
        .map(|i| {
            let angle = |k: usize| core::f64::consts::TAU * k as f64 / n as f64;
            let rim = |k: usize| DVec3::new(angle(k).cos(), angle(k).sin(), 0.0) * 5.0;
            Tri {
                corners: [DVec3::ZERO, rim(i), rim(i + 1)],
                tag: Tag::new(),
            }
        })
        .collect();
    let spokes: Vec<Stick> = tris
        .iter()
        .map(|t| Stick {
            ends: [t.corners[0], t.corners[1]],
            tag: Tag::new(),
        })
        .collect();
    let hub = [Point(DVec3::ZERO)];

    let mut tree: Octree<'_, Point, Stick, Tri> = Octree::new(1e-9);
    tree.set_bounds(DVec3::splat(-6.0), DVec3::splat(6.0));
    tree.add_vertices(&hub).expect("bounds are set");
    tree.add_edges(&spokes).expect("bounds are set");
    tree.add_faces(&tris).expect("bounds are set");

    // Every triangle and spoke meets at the hub.
    let mut faces = Vec::new();
    tree.find_faces_near(&DVec3::ZERO, &mut faces);
    let mut edges = Vec::new();
    tree.find_edges_near(&DVec3::ZERO, &mut edges);
    println!("at the hub: {} triangles, {} spokes", faces.len(), edges.len());
    assert_eq!(faces.len(), n);
    assert_eq!(edges.len(), n);

    // Out on the rim only a couple of triangles remain.
    let rim_point = DVec3::new(4.9, 0.05, 0.0);
    faces.clear();
    tree.find_faces_near(&rim_point, &mut faces);
    println!("at {rim_point}: {} triangles", faces.len());
    println!("{:?}", tree.stats());
}
