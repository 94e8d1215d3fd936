// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generation stamps for de-duplicating query results.
//!
//! A boundary-straddling primitive is referenced from several leaves, so one
//! traversal can meet it more than once. Instead of clearing a "seen" flag on
//! every primitive between queries, each query starts a new [`Generation`]
//! and each primitive carries a [`Tag`] remembering the last generation that
//! emitted it.

use core::cell::Cell;
use core::sync::atomic::{AtomicU32, Ordering};

static GENERATION: AtomicU32 = AtomicU32::new(0);

/// One query's generation, obtained from [`Generation::begin`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Generation(u32);

impl Generation {
    /// Start a new generation. Every call returns a value different from the
    /// previous one and never returns the stamp of a fresh [`Tag`].
    pub fn begin() -> Self {
        loop {
            let g = GENERATION.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
            if g != 0 {
                return Self(g);
            }
        }
    }

    /// Raw counter value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Per-primitive generation stamp.
///
/// Embed one in each mesh edge and face. The stamp is interior-mutable, so a
/// tagged primitive is not `Sync`: two threads must not query over the same
/// mesh at once.
#[derive(Clone, Debug, Default)]
pub struct Tag(Cell<u32>);

impl Tag {
    /// A tag that has never been stamped.
    pub const fn new() -> Self {
        Self(Cell::new(0))
    }

    /// Stamp with `generation`. Returns `true` the first time a given
    /// generation is seen, `false` on every later call with it.
    pub fn once(&self, generation: Generation) -> bool {
        if self.0.get() == generation.0 {
            false
        } else {
            self.0.set(generation.0);
            true
        }
    }
}
