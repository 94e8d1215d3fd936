// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for octree setup.

/// Errors returned while configuring or filling an [`Octree`](crate::Octree).
///
/// Queries never fail; a query on an octree without bounds finds nothing.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum OctreeError {
    /// Primitives were added before [`Octree::set_bounds`](crate::Octree::set_bounds).
    #[error("octree bounds are not set")]
    BoundsNotSet,
    /// Primitives were added after the root was split.
    ///
    /// Bulk inserts only fill the root; add everything before splitting.
    #[error("octree root is already split")]
    AlreadySplit,
    /// The slack factor must be finite and greater than 1.
    #[error("slack factor {0} must be finite and greater than 1")]
    InvalidSlackFactor(f64),
    /// The bounds margin must be finite and at least 1.
    #[error("bounds margin {0} must be finite and at least 1")]
    InvalidBoundsMargin(f64),
}
