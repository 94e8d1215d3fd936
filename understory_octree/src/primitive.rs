// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only views of mesh primitives.
//!
//! The octree never owns mesh data. It stores `&'m` references to whatever
//! vertex, edge, and face types the mesh uses, and reads them through these
//! traits.

use glam::DVec3;

use crate::tag::Tag;
use crate::types::{Aabb3D, Plane, Segment};

/// A mesh vertex.
pub trait Vertex {
    /// Position of the vertex.
    fn position(&self) -> DVec3;
}

/// A mesh edge between two vertices.
pub trait Edge {
    /// Positions of the two endpoints.
    fn endpoints(&self) -> (DVec3, DVec3);

    /// Generation stamp used to de-duplicate query results.
    fn tag(&self) -> &Tag;

    /// The edge as a segment.
    fn segment(&self) -> Segment {
        let (a, b) = self.endpoints();
        Segment::new(a, b)
    }
}

/// A planar mesh face with three or more vertices.
pub trait Face {
    /// Number of vertices in the face loop.
    fn vertex_count(&self) -> usize;

    /// Position of vertex `i` of the face loop, `i < vertex_count()`.
    fn vertex(&self, i: usize) -> DVec3;

    /// Bounding box of the face. Meshes usually keep this precomputed.
    fn aabb(&self) -> Aabb3D;

    /// Supporting plane of the face. Meshes usually keep this precomputed.
    fn plane(&self) -> Plane;

    /// Generation stamp used to de-duplicate query results.
    fn tag(&self) -> &Tag;

    /// The three corners if this face is a triangle.
    fn triangle(&self) -> Option<[DVec3; 3]> {
        (self.vertex_count() == 3).then(|| [self.vertex(0), self.vertex(1), self.vertex(2)])
    }
}

impl Vertex for DVec3 {
    fn position(&self) -> DVec3 {
        *self
    }
}
