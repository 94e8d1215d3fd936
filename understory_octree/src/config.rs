// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning constants and their runtime grouping.

use crate::error::OctreeError;

/// Depth below which a leaf may still be split by a query.
pub const MAX_SPLIT_DEPTH: u32 = 32;

/// Vertex count above which a queried leaf is split.
pub const POINT_SPLIT_THRESHOLD: usize = 20;

/// Edge count above which a queried leaf is split.
pub const EDGE_SPLIT_THRESHOLD: usize = 50;

/// Face count above which a queried leaf is split.
pub const FACE_SPLIT_THRESHOLD: usize = 50;

/// Factor applied to a node's half extents to get its query volume.
///
/// Slightly above 1 so primitives lying exactly on a split plane reach both
/// sides.
pub const SLACK_FACTOR: f64 = 1.0009765625;

/// Depth budget of [`Octree::split_tree`](crate::Octree::split_tree).
pub const PRESPLIT_DEPTH: u32 = 4;

/// Minimum edge plus face count for [`Octree::split_tree`](crate::Octree::split_tree)
/// to split a leaf.
pub const PRESPLIT_MIN_POPULATION: usize = 5;

/// Scale applied to the half extents passed to
/// [`Octree::set_bounds_aabb`](crate::Octree::set_bounds_aabb).
pub const BOUNDS_MARGIN: f64 = 1.1;

/// Octree tuning knobs. [`Default`] gives the crate constants.
///
/// ```
/// use understory_octree::OctreeConfig;
///
/// let cfg = OctreeConfig::default().with_face_split_threshold(8);
/// assert_eq!(cfg.face_split_threshold, 8);
/// assert!(cfg.validate().is_ok());
/// assert!(cfg.with_slack_factor(1.0).validate().is_err());
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OctreeConfig {
    /// See [`MAX_SPLIT_DEPTH`].
    pub max_split_depth: u32,
    /// See [`POINT_SPLIT_THRESHOLD`].
    pub point_split_threshold: usize,
    /// See [`EDGE_SPLIT_THRESHOLD`].
    pub edge_split_threshold: usize,
    /// See [`FACE_SPLIT_THRESHOLD`].
    pub face_split_threshold: usize,
    /// See [`SLACK_FACTOR`].
    pub slack_factor: f64,
    /// See [`PRESPLIT_DEPTH`].
    pub presplit_depth: u32,
    /// See [`PRESPLIT_MIN_POPULATION`].
    pub presplit_min_population: usize,
    /// See [`BOUNDS_MARGIN`].
    pub bounds_margin: f64,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OctreeConfig {
    /// Configuration with the crate constants.
    pub const fn new() -> Self {
        Self {
            max_split_depth: MAX_SPLIT_DEPTH,
            point_split_threshold: POINT_SPLIT_THRESHOLD,
            edge_split_threshold: EDGE_SPLIT_THRESHOLD,
            face_split_threshold: FACE_SPLIT_THRESHOLD,
            slack_factor: SLACK_FACTOR,
            presplit_depth: PRESPLIT_DEPTH,
            presplit_min_population: PRESPLIT_MIN_POPULATION,
            bounds_margin: BOUNDS_MARGIN,
        }
    }

    /// Set the maximum depth for query-time splits.
    pub const fn with_max_split_depth(mut self, depth: u32) -> Self {
        self.max_split_depth = depth;
        self
    }

    /// Set the vertex split threshold.
    pub const fn with_point_split_threshold(mut self, n: usize) -> Self {
        self.point_split_threshold = n;
        self
    }

    /// Set the edge split threshold.
    pub const fn with_edge_split_threshold(mut self, n: usize) -> Self {
        self.edge_split_threshold = n;
        self
    }

    /// Set the face split threshold.
    pub const fn with_face_split_threshold(mut self, n: usize) -> Self {
        self.face_split_threshold = n;
        self
    }

    /// Set the query volume slack factor.
    pub const fn with_slack_factor(mut self, factor: f64) -> Self {
        self.slack_factor = factor;
        self
    }

    /// Set the [`Octree::split_tree`](crate::Octree::split_tree) depth budget.
    pub const fn with_presplit_depth(mut self, depth: u32) -> Self {
        self.presplit_depth = depth;
        self
    }

    /// Set the [`Octree::split_tree`](crate::Octree::split_tree) population floor.
    pub const fn with_presplit_min_population(mut self, n: usize) -> Self {
        self.presplit_min_population = n;
        self
    }

    /// Set the [`Octree::set_bounds_aabb`](crate::Octree::set_bounds_aabb) margin.
    pub const fn with_bounds_margin(mut self, margin: f64) -> Self {
        self.bounds_margin = margin;
        self
    }

    /// Check the floating point knobs.
    pub fn validate(&self) -> Result<(), OctreeError> {
        if !self.slack_factor.is_finite() || self.slack_factor <= 1.0 {
            return Err(OctreeError::InvalidSlackFactor(self.slack_factor));
        }
        if !self.bounds_margin.is_finite() || self.bounds_margin < 1.0 {
            return Err(OctreeError::InvalidBoundsMargin(self.bounds_margin));
        }
        Ok(())
    }
}
