// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query shapes accepted by the `find_*_near` family.
//!
//! A shape answers two kinds of questions: whether a node's query volume is
//! worth visiting, and whether a primitive found in a visited leaf matches.
//! Both are widened by the octree's epsilon.

use glam::DVec3;

use crate::primitive::Face;
use crate::types::{Aabb3D, Segment};

/// A region that can be searched for nearby primitives.
///
/// Implemented for [`Aabb3D`] (box query), [`Segment`] (line-segment query),
/// and [`DVec3`] (point query).
pub trait QueryShape {
    /// Whether a node with this query volume may hold matches.
    fn overlaps_volume(&self, volume: &Aabb3D, eps: f64) -> bool;

    /// Whether a vertex at `p` matches.
    fn matches_vertex(&self, p: DVec3, eps: f64) -> bool;

    /// Whether an edge along `segment` matches.
    fn matches_edge(&self, segment: &Segment, eps: f64) -> bool;

    /// Whether `face` matches.
    fn matches_face<F: Face + ?Sized>(&self, face: &F, eps: f64) -> bool;
}

/// Whether `face` may touch `volume`.
///
/// Triangles get an exact triangle/box test. Larger polygons must pass both
/// the face bounding box test and the face plane test.
pub(crate) fn face_meets_volume<F: Face + ?Sized>(volume: &Aabb3D, face: &F, eps: f64) -> bool {
    match face.triangle() {
        Some(tri) => volume.intersects_triangle(tri, eps),
        None => volume.intersects(&face.aabb(), eps) && volume.intersects_plane(&face.plane(), eps),
    }
}

impl QueryShape for Aabb3D {
    fn overlaps_volume(&self, volume: &Aabb3D, eps: f64) -> bool {
        volume.intersects(self, eps)
    }

    fn matches_vertex(&self, p: DVec3, eps: f64) -> bool {
        self.contains_point(p, eps)
    }

    fn matches_edge(&self, segment: &Segment, eps: f64) -> bool {
        self.intersects_segment(segment.a, segment.b, eps)
    }

    fn matches_face<F: Face + ?Sized>(&self, face: &F, eps: f64) -> bool {
        face_meets_volume(self, face, eps)
    }
}

impl QueryShape for Segment {
    fn overlaps_volume(&self, volume: &Aabb3D, eps: f64) -> bool {
        volume.intersects_segment(self.a, self.b, eps)
    }

    fn matches_vertex(&self, p: DVec3, eps: f64) -> bool {
        self.distance_squared_to_point(p) <= eps * eps
    }

    fn matches_edge(&self, segment: &Segment, eps: f64) -> bool {
        self.distance_squared_to_segment(segment) <= eps * eps
    }

    fn matches_face<F: Face + ?Sized>(&self, face: &F, eps: f64) -> bool {
        if !face.aabb().intersects_segment(self.a, self.b, eps) {
            return false;
        }
        // The segment must reach the face plane: endpoints on opposite sides,
        // or one of them within `eps` of it.
        let plane = face.plane();
        let da = plane.signed_distance(self.a);
        let db = plane.signed_distance(self.b);
        da.min(db) <= eps && da.max(db) >= -eps
    }
}

impl QueryShape for DVec3 {
    fn overlaps_volume(&self, volume: &Aabb3D, eps: f64) -> bool {
        volume.contains_point(*self, eps)
    }

    fn matches_vertex(&self, p: DVec3, eps: f64) -> bool {
        (p - *self).length_squared() <= eps * eps
    }

    fn matches_edge(&self, segment: &Segment, eps: f64) -> bool {
        segment.distance_squared_to_point(*self) <= eps * eps
    }

    fn matches_face<F: Face + ?Sized>(&self, face: &F, eps: f64) -> bool {
        let point = Aabb3D::new(*self, Self::ZERO);
        match face.triangle() {
            Some(tri) => point.intersects_triangle(tri, eps),
            None => {
                face.aabb().contains_point(*self, eps)
                    && face.plane().signed_distance(*self).abs() <= eps
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PolyMesh;
    use crate::primitive::Edge;

    fn tri_mesh() -> PolyMesh {
        PolyMesh::from_polygons(
            &[
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(4.0, 0.0, 0.0),
                DVec3::new(0.0, 4.0, 0.0),
            ],
            [[0_usize, 1, 2]],
        )
    }

    #[test]
    fn point_query_matches() {
        let m = tri_mesh();
        let face = &m.faces()[0];
        let eps = 1e-6;
        assert!(DVec3::new(1.0, 1.0, 0.0).matches_face(face, eps));
        assert!(!DVec3::new(1.0, 1.0, 0.1).matches_face(face, eps));
        assert!(!DVec3::new(3.0, 3.0, 0.0).matches_face(face, eps));

        let seg = Segment::new(DVec3::ZERO, DVec3::new(4.0, 0.0, 0.0));
        assert!(DVec3::new(2.0, 1e-7, 0.0).matches_edge(&seg, eps));
        assert!(!DVec3::new(2.0, 1e-3, 0.0).matches_edge(&seg, eps));
        assert!(DVec3::new(4.0, 0.0, 0.0).matches_vertex(DVec3::new(4.0, 0.0, 5e-7), eps));
        assert!(!DVec3::new(4.0, 0.0, 0.0).matches_vertex(DVec3::new(4.0, 0.0, 2e-6), eps));
    }

    #[test]
    fn segment_query_matches() {
        let m = tri_mesh();
        let face = &m.faces()[0];
        let eps = 1e-6;
        let piercing = Segment::new(DVec3::new(1.0, 1.0, -1.0), DVec3::new(1.0, 1.0, 1.0));
        let hovering = Segment::new(DVec3::new(1.0, 1.0, 0.5), DVec3::new(1.0, 1.0, 1.0));
        let outside = Segment::new(DVec3::new(5.0, 5.0, -1.0), DVec3::new(5.0, 5.0, 1.0));
        assert!(piercing.matches_face(face, eps));
        assert!(!hovering.matches_face(face, eps));
        assert!(!outside.matches_face(face, eps));

        let edge = Segment::new(DVec3::new(1.0, -1.0, 0.0), DVec3::new(1.0, 1.0, 0.0));
        assert!(piercing.matches_edge(&edge, eps));
        assert!(hovering.matches_edge(&edge, 0.6));
        assert!(!hovering.matches_edge(&edge, eps));
    }

    #[test]
    fn box_query_matches() {
        let m = tri_mesh();
        let face = &m.faces()[0];
        let near_corner = Aabb3D::new(DVec3::new(0.5, 0.5, 0.0), DVec3::splat(0.1));
        let off_hypotenuse = Aabb3D::new(DVec3::new(3.0, 3.0, 0.0), DVec3::splat(0.1));
        assert!(near_corner.matches_face(face, 0.0));
        assert!(!off_hypotenuse.matches_face(face, 0.0));
        assert!(near_corner.matches_vertex(DVec3::new(0.55, 0.45, 0.05), 0.0));
        assert!(near_corner.matches_edge(
            &Segment::new(DVec3::ZERO, DVec3::new(1.0, 1.0, 0.0)),
            0.0
        ));
        assert!(!near_corner.matches_edge(&Segment::new(DVec3::ZERO, DVec3::ONE), 0.0));
    }

    #[test]
    fn larger_epsilon_never_loses_matches() {
        let m = PolyMesh::box_grid(DVec3::ZERO, DVec3::ONE, 3);
        let probes = [
            DVec3::new(0.5, 0.5, 0.0),
            DVec3::new(0.5, 0.5, 1e-4),
            DVec3::new(0.3, 1.0 + 5e-4, 0.3),
            DVec3::new(0.5, 0.5, 0.5),
        ];
        for p in probes {
            for f in m.faces() {
                if p.matches_face(f, 1e-6) {
                    assert!(p.matches_face(f, 1e-3));
                }
            }
            for e in m.edges() {
                let s = e.segment();
                if p.matches_edge(&s, 1e-6) {
                    assert!(p.matches_edge(&s, 1e-3));
                }
            }
        }
    }
}
