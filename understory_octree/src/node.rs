// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Octree nodes and the node split.
//!
//! Nodes live in an arena owned by the [`Octree`](crate::Octree). The eight
//! children of a split node occupy eight consecutive arena slots, so a node
//! only records the id of its first child.

use alloc::vec::Vec;
use core::fmt;
use core::mem;
use core::ops::Range;

use glam::{BVec3, DVec3};

use crate::primitive::{Edge, Face, Vertex};
use crate::query::face_meets_volume;
use crate::types::Aabb3D;

/// Identifier of a node within one [`Octree`](crate::Octree).
///
/// Ids stay valid until the next call to
/// [`Octree::set_bounds`](crate::Octree::set_bounds), which discards the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node id.
    pub const ROOT: Self = Self(0);

    /// Arena slot of this node.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A cube-shaped region of the octree.
///
/// A node is either a leaf holding primitive references, or an internal node
/// with exactly eight children and empty lists. Once split a node stays
/// internal.
pub struct Node<'m, V: ?Sized, E: ?Sized, F: ?Sized> {
    min: DVec3,
    max: DVec3,
    query_volume: Aabb3D,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    depth: u32,
    pub(crate) vertices: Vec<&'m V>,
    pub(crate) edges: Vec<&'m E>,
    pub(crate) faces: Vec<&'m F>,
}

impl<'m, V: ?Sized, E: ?Sized, F: ?Sized> Node<'m, V, E, F> {
    /// An empty leaf spanning `min..max` at `depth`.
    pub(crate) fn new(
        min: DVec3,
        max: DVec3,
        parent: Option<NodeId>,
        depth: u32,
        slack: f64,
    ) -> Self {
        Self {
            min,
            max,
            query_volume: Aabb3D::from_min_max(min, max).inflated(slack),
            parent,
            first_child: None,
            depth,
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Exact region covered by the node.
    pub fn bounds(&self) -> Aabb3D {
        Aabb3D::from_min_max(self.min, self.max)
    }

    /// Minimum corner.
    pub fn min(&self) -> DVec3 {
        self.min
    }

    /// Maximum corner.
    pub fn max(&self) -> DVec3 {
        self.max
    }

    /// [`bounds`](Self::bounds) inflated by the slack factor.
    ///
    /// Primitives and queries are tested against this volume.
    pub fn query_volume(&self) -> &Aabb3D {
        &self.query_volume
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Distance from the root.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether the node has not been split.
    pub fn is_leaf(&self) -> bool {
        self.first_child.is_none()
    }

    /// Whether the node has been split.
    pub fn has_children(&self) -> bool {
        !self.is_leaf()
    }

    /// Whether any primitive list is non-empty.
    pub fn has_geometry(&self) -> bool {
        !self.vertices.is_empty() || !self.edges.is_empty() || !self.faces.is_empty()
    }

    /// Child ids in octant order; empty for a leaf.
    pub fn children(&self) -> Children {
        let start = self.first_child.map_or(0, NodeId::index);
        let len = if self.is_leaf() { 0 } else { 8 };
        Children(start..start + len)
    }

    /// Child covering `octant`.
    ///
    /// Octant `i` takes the upper half on x when `i & 1`, on y when `i & 2`,
    /// and on z when `i & 4`. Returns `None` for a leaf or `octant >= 8`.
    pub fn child(&self, octant: usize) -> Option<NodeId> {
        match self.first_child {
            Some(first) if octant < 8 => Some(NodeId(first.0 + octant)),
            _ => None,
        }
    }

    /// Vertices referenced by this leaf.
    pub fn vertices(&self) -> &[&'m V] {
        &self.vertices
    }

    /// Edges referenced by this leaf.
    pub fn edges(&self) -> &[&'m E] {
        &self.edges
    }

    /// Faces referenced by this leaf.
    pub fn faces(&self) -> &[&'m F] {
        &self.faces
    }
}

impl<V: Vertex + ?Sized, E: Edge + ?Sized, F: Face + ?Sized> Node<'_, V, E, F> {
    /// Whether `vertex` lies in the query volume.
    pub fn might_contain_vertex(&self, vertex: &V, eps: f64) -> bool {
        self.query_volume.contains_point(vertex.position(), eps)
    }

    /// Whether `edge` crosses the query volume.
    pub fn might_contain_edge(&self, edge: &E, eps: f64) -> bool {
        let (a, b) = edge.endpoints();
        self.query_volume.intersects_segment(a, b, eps)
    }

    /// Whether `face` may touch the query volume.
    ///
    /// Triangles are tested exactly. Larger polygons must overlap the volume
    /// with both their bounding box and their plane.
    pub fn might_contain_face(&self, face: &F, eps: f64) -> bool {
        face_meets_volume(&self.query_volume, face, eps)
    }
}

impl<V: ?Sized, E: ?Sized, F: ?Sized> fmt::Debug for Node<'_, V, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("depth", &self.depth)
            .field("parent", &self.parent)
            .field("first_child", &self.first_child)
            .field("vertices", &self.vertices.len())
            .field("edges", &self.edges.len())
            .field("faces", &self.faces.len())
            .finish_non_exhaustive()
    }
}

/// Iterator over the children of a node, from [`Node::children`].
#[derive(Clone, Debug)]
pub struct Children(Range<usize>);

impl Iterator for Children {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.0.next().map(NodeId)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl DoubleEndedIterator for Children {
    fn next_back(&mut self) -> Option<NodeId> {
        self.0.next_back().map(NodeId)
    }
}

impl ExactSizeIterator for Children {}

fn octant_corners(min: DVec3, mid: DVec3, max: DVec3, octant: usize) -> (DVec3, DVec3) {
    let upper = BVec3::new(octant & 1 != 0, octant & 2 != 0, octant & 4 != 0);
    (DVec3::select(upper, mid, min), DVec3::select(upper, max, mid))
}

/// Split leaf `id` into eight children and move its primitives into them.
///
/// Returns `true` if the node is still a leaf afterwards, which happens when
/// it holds no geometry; no children are allocated then. Splitting an
/// internal node does nothing and returns `false`.
///
/// A primitive is copied into every child whose query volume it reaches, so
/// primitives near a split plane end up in several children.
pub(crate) fn split<'m, V, E, F>(
    arena: &mut Vec<Node<'m, V, E, F>>,
    id: NodeId,
    eps: f64,
    slack: f64,
) -> bool
where
    V: Vertex + ?Sized,
    E: Edge + ?Sized,
    F: Face + ?Sized,
{
    let node = &mut arena[id.0];
    if node.has_children() {
        return false;
    }
    if !node.has_geometry() {
        return true;
    }

    let vertices = mem::take(&mut node.vertices);
    let edges = mem::take(&mut node.edges);
    let faces = mem::take(&mut node.faces);
    let (min, max, depth) = (node.min, node.max, node.depth);
    let mid = (min + max) * 0.5;
    let first = NodeId(arena.len());
    arena[id.0].first_child = Some(first);

    arena.reserve(8);
    for octant in 0..8 {
        let (lo, hi) = octant_corners(min, mid, max, octant);
        let mut child: Node<'m, V, E, F> = Node::new(lo, hi, Some(id), depth + 1, slack);
        child.vertices = vertices
            .iter()
            .copied()
            .filter(|v| child.might_contain_vertex(v, eps))
            .collect();
        child.edges = edges
            .iter()
            .copied()
            .filter(|e| child.might_contain_edge(e, eps))
            .collect();
        child.faces = faces
            .iter()
            .copied()
            .filter(|f| child.might_contain_face(f, eps))
            .collect();
        arena.push(child);
    }

    if log::log_enabled!(log::Level::Trace) {
        let (nv, ne, nf) = arena[first.0..]
            .iter()
            .fold((0, 0, 0), |(v, e, f), n| {
                (v + n.vertices.len(), e + n.edges.len(), f + n.faces.len())
            });
        log::trace!(
            "split node {} at depth {depth} into {}..{}: {}/{}/{} vertices/edges/faces became {nv}/{ne}/{nf}",
            id.0,
            first.0,
            first.0 + 8,
            vertices.len(),
            edges.len(),
            faces.len(),
        );
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SLACK_FACTOR;
    use crate::mesh::{MeshEdge, MeshFace, MeshVertex, PolyMesh};

    type TestNode<'m> = Node<'m, MeshVertex, MeshEdge, MeshFace>;

    const EPS: f64 = 1e-6;

    fn root<'m>() -> Vec<TestNode<'m>> {
        alloc::vec![Node::new(DVec3::ZERO, DVec3::splat(8.0), None, 0, SLACK_FACTOR)]
    }

    #[test]
    fn split_empty_leaf_is_noop() {
        let mut arena = root();
        assert!(split(&mut arena, NodeId::ROOT, EPS, SLACK_FACTOR));
        assert_eq!(arena.len(), 1);
        assert!(arena[0].is_leaf());
        assert_eq!(arena[0].children().len(), 0);
    }

    #[test]
    fn split_moves_geometry_into_children() {
        let mesh = PolyMesh::cube(DVec3::splat(1.0), DVec3::splat(3.0));
        let mut arena = root();
        arena[0].vertices.extend(mesh.vertices());
        arena[0].edges.extend(mesh.edges());
        arena[0].faces.extend(mesh.faces());

        assert!(!split(&mut arena, NodeId::ROOT, EPS, SLACK_FACTOR));
        assert_eq!(arena.len(), 9);
        let root = &arena[0];
        assert!(root.has_children());
        assert!(!root.has_geometry());
        let kids: Vec<_> = root.children().collect();
        assert_eq!(kids, (1..9).map(NodeId).collect::<Vec<_>>());
        for id in kids {
            let child = &arena[id.index()];
            assert_eq!(child.parent(), Some(NodeId::ROOT));
            assert_eq!(child.depth(), 1);
            assert!(child.is_leaf());
        }
        // The cube sits entirely in the lower octant.
        assert_eq!(arena[1].vertices().len(), 8);
        assert_eq!(arena[1].edges().len(), 18);
        assert_eq!(arena[1].faces().len(), 12);
        for empty in &arena[2..9] {
            assert!(!empty.has_geometry());
        }

        // Splitting again is a no-op.
        assert!(!split(&mut arena, NodeId::ROOT, EPS, SLACK_FACTOR));
        assert_eq!(arena.len(), 9);
    }

    #[test]
    fn octant_layout() {
        let mesh = PolyMesh::cube(DVec3::splat(1.0), DVec3::splat(2.0));
        let mut arena = root();
        arena[0].faces.extend(mesh.faces());
        split(&mut arena, NodeId::ROOT, EPS, SLACK_FACTOR);
        let n = &arena[0];
        let c5 = &arena[n.child(5).unwrap().index()];
        assert_eq!(c5.min(), DVec3::new(4.0, 0.0, 4.0));
        assert_eq!(c5.max(), DVec3::new(8.0, 4.0, 8.0));
        let c2 = &arena[n.child(2).unwrap().index()];
        assert_eq!(c2.min(), DVec3::new(0.0, 4.0, 0.0));
        assert!(n.child(8).is_none());
    }

    #[test]
    fn straddling_primitives_are_duplicated() {
        // A quad lying on the x = 4 split plane, and an edge along it.
        let positions = [
            DVec3::new(4.0, 1.0, 1.0),
            DVec3::new(4.0, 3.0, 1.0),
            DVec3::new(4.0, 3.0, 3.0),
            DVec3::new(4.0, 1.0, 3.0),
        ];
        let mesh = PolyMesh::from_polygons(&positions, [[0_usize, 1, 2, 3]]);
        let mut arena = root();
        arena[0].edges.extend(mesh.edges());
        arena[0].faces.extend(mesh.faces());
        split(&mut arena, NodeId::ROOT, EPS, SLACK_FACTOR);

        let lower = &arena[arena[0].child(0).unwrap().index()];
        let upper_x = &arena[arena[0].child(1).unwrap().index()];
        assert_eq!(lower.faces().len(), 1);
        assert_eq!(upper_x.faces().len(), 1);
        assert_eq!(lower.edges().len(), 4);
        assert_eq!(upper_x.edges().len(), 4);
        assert!(!arena[arena[0].child(2).unwrap().index()].has_geometry());
    }

    #[test]
    fn query_volume_is_inflated_bounds() {
        let arena = root();
        let n = &arena[0];
        assert_eq!(n.bounds().center, DVec3::splat(4.0));
        assert_eq!(n.query_volume().center, DVec3::splat(4.0));
        assert_eq!(n.query_volume().half_extents, DVec3::splat(4.0 * SLACK_FACTOR));
    }

    #[test]
    fn vertex_on_split_plane_reaches_both_sides() {
        let v = MeshVertex::new(DVec3::new(4.0, 1.0, 1.0));
        let mut arena = root();
        arena[0].vertices.push(&v);
        split(&mut arena, NodeId::ROOT, EPS, SLACK_FACTOR);
        assert_eq!(arena[1].vertices().len(), 1);
        assert_eq!(arena[2].vertices().len(), 1);
    }
}
