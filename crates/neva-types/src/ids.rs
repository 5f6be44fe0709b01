// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Identifier newtypes and aliases used across the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-unique identifier of one node (sensor, neuron or actuator).
///
/// Allocated monotonically and preserved across the record/live conversion,
/// so a node keeps its id through construct, think cycles and teardown.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Id of the node that would follow this one in allocation order.
    pub fn next(self) -> NodeId {
        NodeId(self.0 + 1)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(raw: u64) -> Self {
        NodeId(raw)
    }
}

/// Identifier of one candidate network within a generation.
///
/// The scheduler assigns these densely from 0 when it evolves a generation.
pub type NetworkId = u64;

/// Key into a caller-supplied function table (activation functions, sync
/// function sources, output hooks). Records store only the id; the code
/// lives in the caller's registry.
pub type FunctionId = String;

/// Opaque key of one inbound connection inside a node record.
pub type ConnectionId = uuid::Uuid;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_next() {
        assert_eq!(NodeId(3).next(), NodeId(4));
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(17).to_string(), "n17");
    }

    #[test]
    fn test_connection_ids_are_unique() {
        let a = ConnectionId::new_v4();
        let b = ConnectionId::new_v4();
        assert_ne!(a, b);
    }
}
