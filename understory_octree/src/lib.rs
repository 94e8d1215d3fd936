// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_octree --heading-base-level=0

//! Understory Octree: an adaptive octree broad-phase index over mesh primitives.
//!
//! Understory Octree answers "which vertices, edges, and faces of this mesh are near here?"
//! for mesh-processing code such as CSG boolean operations, where every candidate pair must
//! otherwise be tested against every other.
//!
//! - Bulk-loads borrowed vertices, edges, and faces into a single root.
//! - Refines itself lazily: a query that meets a crowded leaf splits it before scanning.
//! - Reports each edge and face at most once per query, even when it straddles node boundaries.
//!
//! ## Model
//!
//! Every node covers an axis-aligned cube of space and is tested through its *query volume*,
//! the node bounds inflated by a small slack factor. Splitting a node moves each primitive into
//! every child whose query volume it reaches, so a primitive lying on a split plane is held by
//! several leaves. Queries de-duplicate edges and faces through a per-primitive [`Tag`] stamped
//! with the query's [`Generation`].
//!
//! All geometric tests are widened by the octree's epsilon. A larger epsilon never removes a
//! result.
//!
//! ## API overview
//!
//! - [`Octree`]: the index. Build it with [`Octree::new`], give it a region with
//!   [`Octree::set_bounds`] or [`Octree::set_bounds_aabb`], then add primitives.
//! - [`Vertex`], [`Edge`], [`Face`]: how the octree reads your mesh. Edges and faces carry a
//!   [`Tag`].
//! - [`PolyMesh`]: a small ready-made mesh implementing those traits.
//! - [`QueryShape`]: query by [`Aabb3D`], [`Segment`], or point ([`glam::DVec3`]).
//! - [`OctreeConfig`]: split thresholds, depth caps, and slack.
//!
//! Key operations:
//! - [`Octree::add_vertices`], [`Octree::add_edges`], [`Octree::add_faces`]
//! - [`Octree::split_tree`] for an eager coarse subdivision.
//! - [`Octree::find_faces_near`], [`Octree::find_edges_near`], and
//!   [`Octree::find_vertices_near_allow_dupes`].
//! - [`Octree::find_faces_near_edge`] and [`Octree::find_edges_near_edge`].
//!
//! ## Concurrency
//!
//! Queries take `&mut self` because they may split nodes, and [`Tag`] is not `Sync`. Two queries
//! over the same mesh must not run at the same time, even against different octrees.
//!
//! This crate is `no_std` and uses `alloc`.
//!
//! # Example
//!
//! ```rust
//! use glam::DVec3;
//! use understory_octree::{Aabb3D, Octree, PolyMesh, Segment};
//!
//! // A box made of 2 × 2 quads per side, each split into two triangles.
//! let mesh = PolyMesh::box_grid(DVec3::ZERO, DVec3::splat(4.0), 2);
//!
//! let mut tree: Octree<'_> = Octree::new(1e-6);
//! tree.set_bounds_aabb(mesh.aabb().unwrap());
//! tree.add_edges(mesh.edges()).unwrap();
//! tree.add_faces(mesh.faces()).unwrap();
//! tree.split_tree();
//!
//! // Faces touching a small box on the x = 0 side.
//! let mut faces = Vec::new();
//! let window = Aabb3D::new(DVec3::new(0.0, 1.0, 1.0), DVec3::splat(0.25));
//! tree.find_faces_near(&window, &mut faces);
//! assert_eq!(faces.len(), 2);
//!
//! // A segment piercing the box reaches two opposite sides. Segment queries are a broad
//! // phase over face bounds and planes, so the other triangle of a pierced quad may come
//! // back as well.
//! let mut faces = Vec::new();
//! let ray = Segment::new(DVec3::new(-1.0, 1.5, 0.25), DVec3::new(5.0, 1.5, 0.25));
//! tree.find_faces_near(&ray, &mut faces);
//! assert!((2..=4).contains(&faces.len()));
//!
//! // Nothing near the middle of the box.
//! let mut edges = Vec::new();
//! tree.find_edges_near(&DVec3::splat(2.0), &mut edges);
//! assert!(edges.is_empty());
//! ```

#![no_std]

extern crate alloc;

pub mod config;
pub mod error;
pub mod mesh;
pub mod node;
pub mod octree;
pub mod primitive;
pub mod query;
pub mod tag;
pub mod types;

pub use config::{
    BOUNDS_MARGIN, EDGE_SPLIT_THRESHOLD, FACE_SPLIT_THRESHOLD, MAX_SPLIT_DEPTH,
    OctreeConfig, POINT_SPLIT_THRESHOLD, PRESPLIT_DEPTH, PRESPLIT_MIN_POPULATION, SLACK_FACTOR,
};
pub use error::OctreeError;
pub use mesh::{MeshEdge, MeshFace, MeshVertex, PolyMesh};
pub use node::{Children, Node, NodeId};
pub use octree::{Octree, OctreeStats};
pub use primitive::{Edge, Face, Vertex};
pub use query::QueryShape;
pub use tag::{Generation, Tag};
pub use types::{Aabb3D, Plane, Segment};
