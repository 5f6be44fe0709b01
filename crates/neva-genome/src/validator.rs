// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Record validation for NEVA.

Validates the structural invariants of a record set before it is
materialised or persisted. Provides clear error messages for debugging.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::records::{NodeRecordType, NodeRecords};
use neva_types::NodeId;
use std::collections::HashMap;

/// Validation result
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the record set is valid
    pub valid: bool,
    /// List of errors (blocking issues)
    pub errors: Vec<String>,
    /// List of warnings (non-blocking issues)
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a new valid result
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error
    pub fn add_error(&mut self, error: String) {
        self.valid = false;
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a record set against the structural invariants.
pub fn validate_records(records: &NodeRecords) -> ValidationResult {
    let mut result = ValidationResult::new();

    if records.is_empty() {
        result.add_warning("Record set is empty".to_string());
        return result;
    }

    validate_node_fields(records, &mut result);
    validate_connection_targets(records, &mut result);
    validate_sensor_fanout(records, &mut result);

    result
}

/// Per-node field coherence: function ids and inbound state must match the
/// node type.
fn validate_node_fields(records: &NodeRecords, result: &mut ValidationResult) {
    for (key, record) in records {
        if *key != record.node_id {
            result.add_error(format!(
                "Record keyed {} carries node_id {}",
                key, record.node_id
            ));
        }

        match record.node_type {
            NodeRecordType::Neuron => {
                if record.activation_function_id.is_none() {
                    result.add_error(format!("Neuron {} has no activation function id", key));
                }
                if record.sync_function_id.is_some() || record.output_hook_id.is_some() {
                    result.add_error(format!(
                        "Neuron {} carries sensor or actuator function ids",
                        key
                    ));
                }
                if record.inbound_connections.is_empty() {
                    result.add_warning(format!(
                        "Neuron {} has no inbound connections and can never fire",
                        key
                    ));
                }
                if record.layer == 0 {
                    result.add_warning(format!("Neuron {} sits at layer 0 (sensor layer)", key));
                }
            }
            NodeRecordType::Sensor { .. } => {
                if record.sync_function_id.is_none() {
                    result.add_error(format!("Sensor {} has no sync function id", key));
                }
                if record.activation_function_id.is_some() || record.output_hook_id.is_some() {
                    result.add_error(format!(
                        "Sensor {} carries neuron or actuator function ids",
                        key
                    ));
                }
                if !record.inbound_connections.is_empty() {
                    result.add_error(format!("Sensor {} has inbound connections", key));
                }
            }
            NodeRecordType::Actuator => {
                if record.output_hook_id.is_none() {
                    result.add_error(format!("Actuator {} has no output hook id", key));
                }
                if record.activation_function_id.is_some() || record.sync_function_id.is_some() {
                    result.add_error(format!(
                        "Actuator {} carries neuron or sensor function ids",
                        key
                    ));
                }
                if record.inbound_connections.is_empty() {
                    result.add_warning(format!("Actuator {} has no inbound connections", key));
                }
            }
        }
    }
}

/// Every `from_node` must resolve in the same set, and never to an actuator.
fn validate_connection_targets(records: &NodeRecords, result: &mut ValidationResult) {
    for record in records.values() {
        for conn in record.inbound_connections.values() {
            match records.get(&conn.from_node) {
                None => result.add_error(format!(
                    "Node {} has an inbound connection from unknown node {}",
                    record.node_id, conn.from_node
                )),
                Some(source) if source.is_actuator() => result.add_error(format!(
                    "Node {} has an inbound connection from actuator {}",
                    record.node_id, conn.from_node
                )),
                Some(source) => {
                    if source.is_sensor() && conn.connection_order.is_none() {
                        result.add_error(format!(
                            "Sensor-sourced connection {} -> {} has no connection_order",
                            conn.from_node, record.node_id
                        ));
                    }
                    if !source.is_sensor() && conn.connection_order.is_some() {
                        result.add_warning(format!(
                            "Connection {} -> {} carries a connection_order but its source is not a sensor",
                            conn.from_node, record.node_id
                        ));
                    }
                }
            }
        }
    }
}

/// Per-sensor bookkeeping: reference counts, fan-out caps, and the dense
/// `connection_order` prefix over all edges sourced from each sensor.
fn validate_sensor_fanout(records: &NodeRecords, result: &mut ValidationResult) {
    let mut orders_by_sensor: HashMap<NodeId, Vec<u32>> = HashMap::new();
    let mut refs_by_sensor: HashMap<NodeId, u32> = HashMap::new();

    for record in records.values() {
        for conn in record.inbound_connections.values() {
            if let Some(source) = records.get(&conn.from_node) {
                if source.is_sensor() {
                    *refs_by_sensor.entry(conn.from_node).or_default() += 1;
                    if let Some(order) = conn.connection_order {
                        orders_by_sensor.entry(conn.from_node).or_default().push(order);
                    }
                }
            }
        }
    }

    for (sensor_id, record) in records.iter().filter(|(_, r)| r.is_sensor()) {
        let refs = refs_by_sensor.get(sensor_id).copied().unwrap_or(0);

        if record.outbound_count() != refs {
            result.add_error(format!(
                "Sensor {} records outbound_count {} but {} connections reference it",
                sensor_id,
                record.outbound_count(),
                refs
            ));
        }

        // Some(0) means unbounded.
        if let Some(cap) = record.maximum_vector_length {
            if cap > 0 && refs > cap {
                result.add_error(format!(
                    "Sensor {} has {} outbound references, above its maximum vector length {}",
                    sensor_id, refs, cap
                ));
            }
        }

        if let Some(mut orders) = orders_by_sensor.get(sensor_id).cloned() {
            orders.sort_unstable();
            let dense = orders.iter().enumerate().all(|(i, &o)| o == i as u32);
            if !dense {
                result.add_error(format!(
                    "Sensor {} connection orders {:?} are not a dense prefix from 0",
                    sensor_id, orders
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{InactiveConnection, NodeRecord};

    fn valid_net() -> NodeRecords {
        let mut records = NodeRecords::new();
        let mut sensor = NodeRecord::sensor(NodeId(0), "feed".into(), Some(2));
        sensor.set_outbound_count(2);
        let mut neuron = NodeRecord::neuron(NodeId(1), 1, "tanh".into());
        neuron.add_inbound(InactiveConnection {
            connection_order: Some(0),
            from_node: NodeId(0),
            weight: 2.0,
        });
        neuron.add_inbound(InactiveConnection {
            connection_order: Some(1),
            from_node: NodeId(0),
            weight: 4.0,
        });
        let mut actuator = NodeRecord::actuator(NodeId(2), 2, "emit".into());
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
    fn test_valid_net_passes() {
        let result = validate_records(&valid_net());
        assert!(result.valid, "errors: {:?}", result.errors);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_empty_set_warns() {
        let result = validate_records(&NodeRecords::new());
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_dangling_from_node_is_an_error() {
        let mut records = valid_net();
        records
            .get_mut(&NodeId(1))
            .unwrap()
            .add_inbound(InactiveConnection {
                connection_order: None,
                from_node: NodeId(99),
                weight: 1.0,
            });
        let result = validate_records(&records);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("unknown node")));
    }

    #[test]
    fn test_actuator_with_outbound_is_an_error() {
        let mut records = valid_net();
        records
            .get_mut(&NodeId(1))
            .unwrap()
            .add_inbound(InactiveConnection {
                connection_order: None,
                from_node: NodeId(2),
                weight: 1.0,
            });
        let result = validate_records(&records);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("from actuator")));
    }

    #[test]
    fn test_sensor_with_inbound_is_an_error() {
        let mut records = valid_net();
        records
            .get_mut(&NodeId(0))
            .unwrap()
            .inbound_connections
            .insert(
                uuid::Uuid::new_v4(),
                InactiveConnection {
                    connection_order: None,
                    from_node: NodeId(1),
                    weight: 1.0,
                },
            );
        let result = validate_records(&records);
        assert!(!result.valid);
    }

    #[test]
    fn test_outbound_count_mismatch_is_an_error() {
        let mut records = valid_net();
        records.get_mut(&NodeId(0)).unwrap().set_outbound_count(5);
        let result = validate_records(&records);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("outbound_count")));
    }

    #[test]
    fn test_gapped_connection_orders_are_an_error() {
        let mut records = valid_net();
        for conn in records
            .get_mut(&NodeId(1))
            .unwrap()
            .inbound_connections
            .values_mut()
        {
            if conn.connection_order == Some(1) {
                conn.connection_order = Some(2);
            }
        }
        let result = validate_records(&records);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("dense prefix")));
    }

    #[test]
    fn test_missing_sync_id_is_an_error() {
        let mut records = valid_net();
        records.get_mut(&NodeId(0)).unwrap().sync_function_id = None;
        let result = validate_records(&records);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("sync function")));
    }

    #[test]
    fn test_fanout_above_cap_is_an_error() {
        let mut records = valid_net();
        records.get_mut(&NodeId(0)).unwrap().maximum_vector_length = Some(1);
        let result = validate_records(&records);
        assert!(!result.valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("maximum vector length")));
    }

    #[test]
    fn test_zero_cap_means_unbounded() {
        let mut records = valid_net();
        records.get_mut(&NodeId(0)).unwrap().maximum_vector_length = Some(0);
        let result = validate_records(&records);
        assert!(result.valid, "errors: {:?}", result.errors);
    }
}
