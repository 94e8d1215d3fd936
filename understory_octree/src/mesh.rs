// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small reference polygon mesh implementing the primitive traits.
//!
//! Callers with their own half-edge or indexed mesh implement
//! [`Vertex`], [`Edge`], and [`Face`] directly and never touch this module.

use alloc::collections::BTreeMap;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use glam::DVec3;

use crate::primitive::{Edge, Face, Vertex};
use crate::tag::Tag;
use crate::types::{Aabb3D, Plane};

/// A vertex of a [`PolyMesh`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshVertex {
    /// Position of the vertex.
    pub position: DVec3,
}

impl MeshVertex {
    /// Create a vertex at `position`.
    pub const fn new(position: DVec3) -> Self {
        Self { position }
    }
}

impl Vertex for MeshVertex {
    fn position(&self) -> DVec3 {
        self.position
    }
}

/// An undirected edge of a [`PolyMesh`].
#[derive(Clone, Debug)]
pub struct MeshEdge {
    vertices: [usize; 2],
    a: DVec3,
    b: DVec3,
    tag: Tag,
}

impl MeshEdge {
    /// Create an edge between vertex indices `vertices` located at `a` and `b`.
    pub const fn new(vertices: [usize; 2], a: DVec3, b: DVec3) -> Self {
        Self {
            vertices,
            a,
            b,
            tag: Tag::new(),
        }
    }

    /// Indices of the two endpoint vertices.
    pub const fn vertices(&self) -> [usize; 2] {
        self.vertices
    }
}

impl Edge for MeshEdge {
    fn endpoints(&self) -> (DVec3, DVec3) {
        (self.a, self.b)
    }

    fn tag(&self) -> &Tag {
        &self.tag
    }
}

/// A planar polygon of a [`PolyMesh`] with its bounding box and plane cached.
#[derive(Clone, Debug)]
pub struct MeshFace {
    vertices: Vec<usize>,
    points: Vec<DVec3>,
    aabb: Aabb3D,
    plane: Plane,
    tag: Tag,
}

impl MeshFace {
    /// Create a face from its vertex indices and the matching positions.
    pub fn new(vertices: Vec<usize>, points: Vec<DVec3>) -> Self {
        debug_assert_eq!(
            vertices.len(),
            points.len(),
            "every face vertex index needs a position"
        );
        let aabb = Aabb3D::from_points(points.iter().copied())
            .unwrap_or(Aabb3D::new(DVec3::ZERO, DVec3::ZERO));
        let plane = Plane::from_polygon(&points);
        Self {
            vertices,
            points,
            aabb,
            plane,
            tag: Tag::new(),
        }
    }

    /// Indices of the face loop vertices.
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Average of the face loop positions.
    pub fn centroid(&self) -> DVec3 {
        if self.points.is_empty() {
            return DVec3::ZERO;
        }
        self.points.iter().copied().sum::<DVec3>() / self.points.len() as f64
    }
}

impl Face for MeshFace {
    fn vertex_count(&self) -> usize {
        self.points.len()
    }

    fn vertex(&self, i: usize) -> DVec3 {
        self.points[i]
    }

    fn aabb(&self) -> Aabb3D {
        self.aabb
    }

    fn plane(&self) -> Plane {
        self.plane
    }

    fn tag(&self) -> &Tag {
        &self.tag
    }
}

/// Indexed polygon mesh: vertices, unique undirected edges, and faces.
#[derive(Clone, Debug, Default)]
pub struct PolyMesh {
    vertices: Vec<MeshVertex>,
    edges: Vec<MeshEdge>,
    faces: Vec<MeshFace>,
}

impl PolyMesh {
    /// Build a mesh from vertex positions and polygon loops of vertex indices.
    ///
    /// Edges are derived from the loops; each undirected edge appears once, in
    /// first-seen order.
    ///
    /// # Panics
    ///
    /// Panics if a loop references a vertex index out of range.
    pub fn from_polygons<I, P>(positions: &[DVec3], polygons: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[usize]>,
    {
        let vertices: Vec<MeshVertex> = positions.iter().copied().map(MeshVertex::new).collect();
        let mut seen = BTreeSet::new();
        let mut edges = Vec::new();
        let mut faces = Vec::new();
        for polygon in polygons {
            let ring = polygon.as_ref();
            for (i, &v1) in ring.iter().enumerate() {
                let v2 = ring[(i + 1) % ring.len()];
                if seen.insert((v1.min(v2), v1.max(v2))) {
                    edges.push(MeshEdge::new([v1, v2], positions[v1], positions[v2]));
                }
            }
            let points = ring.iter().map(|&v| positions[v]).collect();
            faces.push(MeshFace::new(ring.to_vec(), points));
        }
        Self {
            vertices,
            edges,
            faces,
        }
    }

    /// Closed axis-aligned box from `min` to `max` with each side cut into a
    /// `divisions` × `divisions` grid of quads, each split into two triangles.
    ///
    /// Faces wind counter-clockwise seen from outside. `divisions` below 1 is
    /// treated as 1.
    pub fn box_grid(min: DVec3, max: DVec3, divisions: usize) -> Self {
        let n = divisions.max(1);
        let step = (max - min) / n as f64;
        let mut index: BTreeMap<[usize; 3], usize> = BTreeMap::new();
        let mut positions = Vec::new();
        let mut lattice = |p: [usize; 3]| {
            *index.entry(p).or_insert_with(|| {
                positions.push(min + step * DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64));
                positions.len() - 1
            })
        };

        let mut triangles = Vec::with_capacity(12 * n * n);
        for axis in 0..3 {
            let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
            for side in [0, n] {
                for i in 0..n {
                    for j in 0..n {
                        let mut corner = |di: usize, dj: usize| {
                            let mut p = [0; 3];
                            p[axis] = side;
                            p[u] = i + di;
                            p[v] = j + dj;
                            lattice(p)
                        };
                        let mut quad = [corner(0, 0), corner(1, 0), corner(1, 1), corner(0, 1)];
                        if side == 0 {
                            quad.reverse();
                        }
                        triangles.push([quad[0], quad[1], quad[2]]);
                        triangles.push([quad[0], quad[2], quad[3]]);
                    }
                }
            }
        }
        Self::from_polygons(&positions, triangles)
    }

    /// Closed box of twelve triangles.
    pub fn cube(min: DVec3, max: DVec3) -> Self {
        Self::box_grid(min, max, 1)
    }

    /// Mesh vertices.
    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    /// Unique undirected edges.
    pub fn edges(&self) -> &[MeshEdge] {
        &self.edges
    }

    /// Mesh faces.
    pub fn faces(&self) -> &[MeshFace] {
        &self.faces
    }

    /// Bounding box of all vertices, or `None` for an empty mesh.
    pub fn aabb(&self) -> Option<Aabb3D> {
        Aabb3D::from_points(self.vertices.iter().map(|v| v.position))
    }
}
