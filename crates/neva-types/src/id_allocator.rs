// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Process-wide node id allocation.
//!
//! One allocator is shared by everything that mints node ids: callers
//! building seed records, templates, and tests. Ids are monotonic and never
//! reused. The allocator is a cloneable handle around an atomic counter, so
//! any number of threads may draw from it without coordination.

use crate::NodeId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Thread-safe monotonic id allocator.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: Arc<AtomicU64>,
}

impl IdAllocator {
    /// Create an allocator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an allocator whose first handed-out id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: Arc::new(AtomicU64::new(first)),
        }
    }

    /// Allocate the next node id.
    pub fn next_node_id(&self) -> NodeId {
        NodeId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Ensure future allocations land strictly after `id`.
    ///
    /// Called after loading records from disk so freshly minted ids cannot
    /// collide with ids already present in the loaded set.
    pub fn advance_past(&self, id: NodeId) {
        self.next.fetch_max(id.0 + 1, Ordering::Relaxed);
    }

    /// The id the next call to [`IdAllocator::next_node_id`] would return.
    pub fn peek(&self) -> NodeId {
        NodeId(self.next.load(Ordering::Relaxed))
    }
}
