// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The octree: setup, bulk loading, pre-splitting, and queries.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use glam::DVec3;

use crate::config::OctreeConfig;
use crate::error::OctreeError;
use crate::mesh::{MeshEdge, MeshFace, MeshVertex};
use crate::node::{Node, NodeId, split};
use crate::primitive::{Edge, Face, Vertex};
use crate::query::QueryShape;
use crate::tag::Generation;
use crate::types::Aabb3D;

/// Adaptive octree over borrowed mesh vertices, edges, and faces.
///
/// All primitives are added to the root. The tree is refined either up front
/// with [`split_tree`](Self::split_tree) or lazily: a query that reaches a leaf
/// holding more primitives of the queried kind than the configured threshold
/// splits that leaf before scanning it. Queries therefore take `&mut self`.
///
/// The octree never owns primitives. They are borrowed for `'m` and must
/// outlive it.
pub struct Octree<'m, V: ?Sized = MeshVertex, E: ?Sized = MeshEdge, F: ?Sized = MeshFace> {
    epsilon: f64,
    config: OctreeConfig,
    // Root at index 0 once bounds are set. Children of a node are 8
    // consecutive slots.
    arena: Vec<Node<'m, V, E, F>>,
}

/// Shape of an octree, from [`Octree::stats`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct OctreeStats {
    /// Total number of nodes.
    pub nodes: usize,
    /// Number of leaves.
    pub leaves: usize,
    /// Depth of the deepest node.
    pub max_depth: u32,
    /// Vertex references summed over all leaves.
    pub vertex_refs: usize,
    /// Edge references summed over all leaves.
    pub edge_refs: usize,
    /// Face references summed over all leaves.
    pub face_refs: usize,
}

impl<V: ?Sized, E: ?Sized, F: ?Sized> fmt::Debug for Octree<'_, V, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Octree")
            .field("epsilon", &self.epsilon)
            .field("config", &self.config)
            .field("bounds", &self.arena.first().map(Node::bounds))
            .field("nodes", &self.arena.len())
            .finish_non_exhaustive()
    }
}

impl<'m, V, E, F> Octree<'m, V, E, F>
where
    V: Vertex + ?Sized,
    E: Edge + ?Sized,
    F: Face + ?Sized,
{
    /// Create an empty octree using `epsilon` for every geometric test.
    ///
    /// The octree has no bounds yet; call [`set_bounds`](Self::set_bounds)
    /// before adding primitives.
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            config: OctreeConfig::new(),
            arena: Vec::new(),
        }
    }

    /// Create an empty octree with custom tuning.
    pub fn with_config(epsilon: f64, config: OctreeConfig) -> Result<Self, OctreeError> {
        config.validate()?;
        Ok(Self {
            epsilon,
            config,
            arena: Vec::new(),
        })
    }

    /// Tolerance used by every geometric test.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Tuning in effect.
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Discard the tree and start over with an empty root spanning `min..max`.
    pub fn set_bounds(&mut self, min: DVec3, max: DVec3) {
        log::debug!("octree bounds set to {min}..{max}, dropping {} nodes", self.arena.len());
        self.arena.clear();
        self.arena.push(Node::new(min, max, None, 0, self.config.slack_factor));
    }

    /// Like [`set_bounds`](Self::set_bounds), with the half extents of
    /// `aabb` first scaled by the bounds margin.
    ///
    /// Pass the bounding box of the mesh here; the margin keeps primitives on
    /// its surface away from the root boundary.
    pub fn set_bounds_aabb(&mut self, aabb: Aabb3D) {
        let bounds = aabb.inflated(self.config.bounds_margin);
        self.set_bounds(bounds.min(), bounds.max());
    }

    /// Exact region of the root, or `None` before bounds are set.
    pub fn bounds(&self) -> Option<Aabb3D> {
        self.arena.first().map(Node::bounds)
    }

    fn unsplit_root(&mut self) -> Result<&mut Node<'m, V, E, F>, OctreeError> {
        let root = self.arena.first_mut().ok_or(OctreeError::BoundsNotSet)?;
        if root.has_children() {
            return Err(OctreeError::AlreadySplit);
        }
        Ok(root)
    }

    /// Append vertices to the root.
    ///
    /// Nothing is sorted into the tree here; splitting happens in
    /// [`split_tree`](Self::split_tree) or during queries.
    pub fn add_vertices<I>(&mut self, vertices: I) -> Result<(), OctreeError>
    where
        I: IntoIterator<Item = &'m V>,
    {
        self.unsplit_root()?.vertices.extend(vertices);
        Ok(())
    }

    /// Append edges to the root.
    pub fn add_edges<I>(&mut self, edges: I) -> Result<(), OctreeError>
    where
        I: IntoIterator<Item = &'m E>,
    {
        self.unsplit_root()?.edges.extend(edges);
        Ok(())
    }

    /// Append faces to the root.
    pub fn add_faces<I>(&mut self, faces: I) -> Result<(), OctreeError>
    where
        I: IntoIterator<Item = &'m F>,
    {
        self.unsplit_root()?.faces.extend(faces);
        Ok(())
    }

    /// Pre-split the tree a few levels deep.
    ///
    /// Leaves holding at least the configured minimum of edges plus faces are
    /// split, down to the configured depth budget below the root. Subtrees
    /// that are already split are walked and refined, never undone.
    pub fn split_tree(&mut self) {
        if self.arena.is_empty() {
            return;
        }
        let mut stack = vec![(NodeId::ROOT, self.config.presplit_depth)];
        while let Some((id, budget)) = stack.pop() {
            if budget == 0 {
                continue;
            }
            let node = &self.arena[id.0];
            if node.is_leaf() {
                if node.edges.len() + node.faces.len() < self.config.presplit_min_population {
                    continue;
                }
                split(&mut self.arena, id, self.epsilon, self.config.slack_factor);
            }
            stack.extend(self.arena[id.0].children().rev().map(|c| (c, budget - 1)));
        }
        log::debug!("split_tree finished with {} nodes", self.arena.len());
    }

    /// Split a single leaf.
    ///
    /// Returns `None` for an unknown id, otherwise whether the node is still a
    /// leaf: `Some(true)` for a leaf without geometry, `Some(false)` once it
    /// has children.
    pub fn split_node(&mut self, id: NodeId) -> Option<bool> {
        (id.0 < self.arena.len())
            .then(|| split(&mut self.arena, id, self.epsilon, self.config.slack_factor))
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node<'m, V, E, F>> {
        self.arena.get(id.0)
    }

    /// Root id, or `None` before bounds are set.
    pub fn root(&self) -> Option<NodeId> {
        (!self.arena.is_empty()).then_some(NodeId::ROOT)
    }

    /// Depth-first walk from the root.
    ///
    /// `visit` is called for every node `filter` accepts; the children of a
    /// rejected node are skipped.
    pub fn visit_nodes(
        &self,
        mut filter: impl FnMut(&Node<'m, V, E, F>) -> bool,
        mut visit: impl FnMut(NodeId, &Node<'m, V, E, F>),
    ) {
        if self.arena.is_empty() {
            return;
        }
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.arena[id.0];
            if !filter(node) {
                continue;
            }
            visit(id, node);
            stack.extend(node.children().rev());
        }
    }

    /// Node counts, depth, and reference totals.
    pub fn stats(&self) -> OctreeStats {
        let mut stats = OctreeStats {
            nodes: self.arena.len(),
            ..OctreeStats::default()
        };
        for node in &self.arena {
            stats.max_depth = stats.max_depth.max(node.depth());
            if node.is_leaf() {
                stats.leaves += 1;
                stats.vertex_refs += node.vertices.len();
                stats.edge_refs += node.edges.len();
                stats.face_refs += node.faces.len();
            }
        }
        stats
    }

    /// Append every edge matching `shape` to `out`, each at most once.
    ///
    /// `shape` is an [`Aabb3D`], a [`Segment`](crate::Segment), or a point
    /// ([`DVec3`]). Leaves crowded with edges are split on the way.
    pub fn find_edges_near<Q>(&mut self, shape: &Q, out: &mut Vec<&'m E>)
    where
        Q: QueryShape + ?Sized,
    {
        let generation = Generation::begin();
        let eps = self.epsilon;
        let threshold = self.config.edge_split_threshold;
        self.search(
            shape,
            threshold,
            |n| n.edges(),
            |e: &E| shape.matches_edge(&e.segment(), eps) && e.tag().once(generation),
            out,
        );
    }

    /// Append every face matching `shape` to `out`, each at most once.
    ///
    /// See [`find_edges_near`](Self::find_edges_near) for the accepted shapes.
    ///
    /// Segment queries test faces by bounding box and plane only. A face whose
    /// box and plane the segment crosses away from the face itself may or may
    /// not be reported, depending on how the tree is split. Every face the
    /// segment actually touches is always reported.
    pub fn find_faces_near<Q>(&mut self, shape: &Q, out: &mut Vec<&'m F>)
    where
        Q: QueryShape + ?Sized,
    {
        let generation = Generation::begin();
        let eps = self.epsilon;
        let threshold = self.config.face_split_threshold;
        self.search(
            shape,
            threshold,
            |n| n.faces(),
            |f: &F| shape.matches_face(f, eps) && f.tag().once(generation),
            out,
        );
    }

    /// Edges near the segment spanned by `edge`.
    ///
    /// `edge` itself is reported too if the octree holds it.
    pub fn find_edges_near_edge<G>(&mut self, edge: &G, out: &mut Vec<&'m E>)
    where
        G: Edge + ?Sized,
    {
        self.find_edges_near(&edge.segment(), out);
    }

    /// Faces near the segment spanned by `edge`.
    pub fn find_faces_near_edge<G>(&mut self, edge: &G, out: &mut Vec<&'m F>)
    where
        G: Edge + ?Sized,
    {
        self.find_faces_near(&edge.segment(), out);
    }

    /// Append every vertex matching `shape` to `out`.
    ///
    /// Vertices carry no tag, so one lying near a split plane is reported
    /// once per leaf holding it.
    pub fn find_vertices_near_allow_dupes<Q>(&mut self, shape: &Q, out: &mut Vec<&'m V>)
    where
        Q: QueryShape + ?Sized,
    {
        let eps = self.epsilon;
        let threshold = self.config.point_split_threshold;
        self.search(
            shape,
            threshold,
            |n| n.vertices(),
            |v: &V| shape.matches_vertex(v.position(), eps),
            out,
        );
    }

    /// Depth-first walk over the nodes `shape` overlaps, splitting crowded
    /// leaves and scanning the selected list of the rest.
    fn search<Q, P>(
        &mut self,
        shape: &Q,
        threshold: usize,
        list: impl for<'n> Fn(&'n Node<'m, V, E, F>) -> &'n [&'m P],
        mut keep: impl FnMut(&P) -> bool,
        out: &mut Vec<&'m P>,
    ) where
        Q: QueryShape + ?Sized,
        P: ?Sized,
    {
        if self.arena.is_empty() {
            return;
        }
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.arena[id.0];
            if !shape.overlaps_volume(node.query_volume(), self.epsilon) {
                continue;
            }
            if node.is_leaf()
                && node.depth() < self.config.max_split_depth
                && list(node).len() > threshold
            {
                split(&mut self.arena, id, self.epsilon, self.config.slack_factor);
            }
            let node = &self.arena[id.0];
            if node.has_children() {
                stack.extend(node.children().rev());
                continue;
            }
            out.extend(list(node).iter().copied().filter(|p| keep(*p)));
        }
    }
}
