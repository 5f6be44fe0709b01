// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
The record data model: the canonical static description of a network.

A network is a map from [`NodeId`] to [`NodeRecord`]. Connectivity is stored
inbound-only: each record carries the connections feeding into it, keyed by
an opaque [`ConnectionId`]. Outbound fan-out is therefore encoded as other
records referencing this node as `from_node`, which keeps sensors free of
inbound state and actuators free of outbound state by construction.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use neva_types::{ConnectionId, FunctionId, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The variant of a node, tagged with sensor-only bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRecordType {
    Neuron,
    /// `outbound_count` tracks how many inbound connections elsewhere point
    /// at this sensor, so mutations can respect its maximum fan-out.
    Sensor { outbound_count: u32 },
    Actuator,
}

/// Per-neuron learning mode applied while the network is live.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum LearningAlgorithm {
    #[default]
    NoLearning,
    Hebbian {
        rate: f64,
    },
}

/// One inbound connection as stored in a record.
///
/// `connection_order` is meaningful only when `from_node` is a sensor: it is
/// the positional index into the sensor's output vector that feeds this
/// edge. Per sensor, the orders of all edges sourced from it form a dense
/// prefix `0..outbound_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InactiveConnection {
    pub connection_order: Option<u32>,
    pub from_node: NodeId,
    pub weight: f64,
}

/// The serialisable description of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_id: NodeId,
    /// Structural layer. Zero is reserved for sensors; the value steers
    /// splice-position arithmetic in the mutator, not runtime ordering.
    pub layer: i32,
    pub node_type: NodeRecordType,
    pub inbound_connections: HashMap<ConnectionId, InactiveConnection>,
    pub bias: Option<f64>,
    pub activation_function_id: Option<FunctionId>,
    pub sync_function_id: Option<FunctionId>,
    pub output_hook_id: Option<FunctionId>,
    /// Sensor fan-out cap. `Some(0)` means unbounded.
    pub maximum_vector_length: Option<u32>,
    #[serde(default)]
    pub learning_algorithm: LearningAlgorithm,
}

/// A whole network in record form, keyed by node id.
pub type NodeRecords = HashMap<NodeId, NodeRecord>;

impl NodeRecord {
    /// Create a neuron record with no inbound connections yet.
    pub fn neuron(node_id: NodeId, layer: i32, activation_function_id: FunctionId) -> Self {
        Self {
            node_id,
            layer,
            node_type: NodeRecordType::Neuron,
            inbound_connections: HashMap::new(),
            bias: None,
            activation_function_id: Some(activation_function_id),
            sync_function_id: None,
            output_hook_id: None,
            maximum_vector_length: None,
            learning_algorithm: LearningAlgorithm::NoLearning,
        }
    }

    /// Create a sensor record at layer 0 with no outbound references yet.
    pub fn sensor(
        node_id: NodeId,
        sync_function_id: FunctionId,
        maximum_vector_length: Option<u32>,
    ) -> Self {
        Self {
            node_id,
            layer: 0,
            node_type: NodeRecordType::Sensor { outbound_count: 0 },
            inbound_connections: HashMap::new(),
            bias: None,
            activation_function_id: None,
            sync_function_id: Some(sync_function_id),
            output_hook_id: None,
            maximum_vector_length,
            learning_algorithm: LearningAlgorithm::NoLearning,
        }
    }

    /// Create an actuator record with no inbound connections yet.
    pub fn actuator(node_id: NodeId, layer: i32, output_hook_id: FunctionId) -> Self {
        Self {
            node_id,
            layer,
            node_type: NodeRecordType::Actuator,
            inbound_connections: HashMap::new(),
            bias: None,
            activation_function_id: None,
            sync_function_id: None,
            output_hook_id: Some(output_hook_id),
            maximum_vector_length: None,
            learning_algorithm: LearningAlgorithm::NoLearning,
        }
    }

    pub fn is_neuron(&self) -> bool {
        matches!(self.node_type, NodeRecordType::Neuron)
    }

    pub fn is_sensor(&self) -> bool {
        matches!(self.node_type, NodeRecordType::Sensor { .. })
    }

    pub fn is_actuator(&self) -> bool {
        matches!(self.node_type, NodeRecordType::Actuator)
    }

    /// Sensor fan-out as currently recorded. Zero for non-sensors.
    pub fn outbound_count(&self) -> u32 {
        match self.node_type {
            NodeRecordType::Sensor { outbound_count } => outbound_count,
            _ => 0,
        }
    }

    /// Overwrite the sensor fan-out counter. No-op on non-sensors.
    pub fn set_outbound_count(&mut self, count: u32) {
        if let NodeRecordType::Sensor { outbound_count } = &mut self.node_type {
            *outbound_count = count;
        }
    }

    /// Add an inbound connection under a fresh key and return that key.
    pub fn add_inbound(&mut self, connection: InactiveConnection) -> ConnectionId {
        let id = ConnectionId::new_v4();
        self.inbound_connections.insert(id, connection);
        id
    }
}

/// Highest node id present in the record set, if any.
pub fn max_node_id(records: &NodeRecords) -> Option<NodeId> {
    records.keys().max().copied()
}

/// Ids of all neurons, in ascending id order.
pub fn neuron_ids(records: &NodeRecords) -> Vec<NodeId> {
    ids_of(records, NodeRecord::is_neuron)
}

/// Ids of all sensors, in ascending id order.
pub fn sensor_ids(records: &NodeRecords) -> Vec<NodeId> {
    ids_of(records, NodeRecord::is_sensor)
}

/// Ids of all actuators, in ascending id order.
pub fn actuator_ids(records: &NodeRecords) -> Vec<NodeId> {
    ids_of(records, NodeRecord::is_actuator)
}

fn ids_of(records: &NodeRecords, pred: impl Fn(&NodeRecord) -> bool) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = records
        .values()
        .filter(|r| pred(*r))
        .map(|r| r.node_id)
        .collect();
    ids.sort();
    ids
}

/// Every inbound connection sourced from `sensor`, anywhere in the set, as
/// `(downstream node, connection key, connection_order)` sorted by order.
pub fn sensor_outbound_connections(
    records: &NodeRecords,
    sensor: NodeId,
) -> Vec<(NodeId, ConnectionId, Option<u32>)> {
    let mut edges: Vec<(NodeId, ConnectionId, Option<u32>)> = Vec::new();
    for record in records.values() {
        for (conn_id, conn) in &record.inbound_connections {
            if conn.from_node == sensor {
                edges.push((record.node_id, *conn_id, conn.connection_order));
            }
        }
    }
    edges.sort_by_key(|(node, _, order)| (order.unwrap_or(u32::MAX), *node));
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_node_net() -> NodeRecords {
        let mut records = NodeRecords::new();
        let mut sensor = NodeRecord::sensor(NodeId(0), "const".into(), Some(1));
        sensor.set_outbound_count(1);
        let mut neuron = NodeRecord::neuron(NodeId(1), 1, "tanh".into());
        neuron.add_inbound(InactiveConnection {
            connection_order: Some(0),
            from_node: NodeId(0),
            weight: 0.5,
        });
        let mut actuator = NodeRecord::actuator(NodeId(2), 2, "out".into());
        actuator.add_inbound(InactiveConnection {
            connection_order: None,
            from_node: NodeId(1),
            weight: 1.0,
        });
        records.insert(NodeId(0), sensor);
        records.insert(NodeId(1), neuron);
        records.insert(NodeId(2), actuator);
        records
    }

    #[test]
    fn test_constructors_set_function_ids() {
        let records = three_node_net();
        assert!(records[&NodeId(0)].sync_function_id.is_some());
        assert!(records[&NodeId(0)].activation_function_id.is_none());
        assert!(records[&NodeId(1)].activation_function_id.is_some());
        assert!(records[&NodeId(2)].output_hook_id.is_some());
    }

    #[test]
    fn test_max_node_id() {
        assert_eq!(max_node_id(&three_node_net()), Some(NodeId(2)));
        assert_eq!(max_node_id(&NodeRecords::new()), None);
    }

    #[test]
    fn test_id_queries_partition_the_set() {
        let records = three_node_net();
        assert_eq!(sensor_ids(&records), vec![NodeId(0)]);
        assert_eq!(neuron_ids(&records), vec![NodeId(1)]);
        assert_eq!(actuator_ids(&records), vec![NodeId(2)]);
    }

    #[test]
    fn test_sensor_outbound_connections_sorted_by_order() {
        let mut records = three_node_net();
        // Second edge from the sensor, at the next output slot.
        records
            .get_mut(&NodeId(1))
            .unwrap()
            .add_inbound(InactiveConnection {
                connection_order: Some(1),
                from_node: NodeId(0),
                weight: 2.0,
            });
        let edges = sensor_outbound_connections(&records, NodeId(0));
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].2, Some(0));
        assert_eq!(edges[1].2, Some(1));
    }

    #[test]
    fn test_outbound_count_roundtrip() {
        let mut sensor = NodeRecord::sensor(NodeId(9), "s".into(), None);
        sensor.set_outbound_count(4);
        assert_eq!(sensor.outbound_count(), 4);

        let mut neuron = NodeRecord::neuron(NodeId(10), 1, "tanh".into());
        neuron.set_outbound_count(4);
        assert_eq!(neuron.outbound_count(), 0);
    }
}
