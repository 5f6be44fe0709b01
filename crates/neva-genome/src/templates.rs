// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Seed record templates.

Evolution has to start from something that already carries signal end to
end, so the canonical seed is the smallest live-able network: one sensor
feeding one neuron feeding one actuator. Callers grow everything else from
there through mutation.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::records::{InactiveConnection, NodeRecord, NodeRecords};
use neva_types::{FunctionId, IdAllocator};

/// Create a minimal seed network: sensor -> neuron -> actuator.
///
/// The sensor starts with a fan-out of one and a maximum vector length of
/// one; `AddSensorLink` style mutations widen it later. Node ids come from
/// the shared allocator so seeds never collide with other record sets in
/// the same process.
pub fn create_seed_records(
    allocator: &IdAllocator,
    activation_id: FunctionId,
    sync_id: FunctionId,
    output_hook_id: FunctionId,
) -> NodeRecords {
    let sensor_id = allocator.next_node_id();
    let neuron_id = allocator.next_node_id();
    let actuator_id = allocator.next_node_id();

    let mut sensor = NodeRecord::sensor(sensor_id, sync_id, Some(1));
    sensor.set_outbound_count(1);

    let mut neuron = NodeRecord::neuron(neuron_id, 1, activation_id);
    neuron.add_inbound(InactiveConnection {
        connection_order: Some(0),
        from_node: sensor_id,
        weight: 1.0,
    });

    let mut actuator = NodeRecord::actuator(actuator_id, 2, output_hook_id);
    actuator.add_inbound(InactiveConnection {
        connection_order: None,
        from_node: neuron_id,
        weight: 1.0,
    });

    let mut records = NodeRecords::new();
    records.insert(sensor_id, sensor);
    records.insert(neuron_id, neuron);
    records.insert(actuator_id, actuator);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate_records;

    #[test]
    fn test_seed_records_are_valid() {
        let allocator = IdAllocator::new();
        let records =
            create_seed_records(&allocator, "tanh".into(), "feed".into(), "emit".into());
        assert_eq!(records.len(), 3);
        let result = validate_records(&records);
        assert!(result.valid, "errors: {:?}", result.errors);
    }

    #[test]
    fn test_seeds_from_one_allocator_do_not_collide() {
        let allocator = IdAllocator::new();
        let a = create_seed_records(&allocator, "tanh".into(), "feed".into(), "emit".into());
        let b = create_seed_records(&allocator, "tanh".into(), "feed".into(), "emit".into());
        for id in a.keys() {
            assert!(!b.contains_key(id));
        }
    }
}
