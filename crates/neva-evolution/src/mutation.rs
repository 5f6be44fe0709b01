// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Topology and weight mutation over record-form networks.

One mutation pass draws `k = ceil(u * sqrt(n))` kinds (u uniform in [0,1),
n the node count, k at least 1) with replacement from the caller's mutation
sequence and applies them to a working copy of the records. A kind whose
precondition does not hold is resampled when the sequence has more than one
kind, and is a no-op when it is the only kind. Structural invariants of the
record form survive every kind; shapes a kind must never see (a sensor
spliced straight into an actuator) abort the pass as an error.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::random::{choose, random_bool, random_f64, random_range_inclusive, random_weight};
use crate::types::{EvolutionError, EvolutionResult};
use neva_genome::{
    actuator_ids, max_node_id, neuron_ids, sensor_ids, sensor_outbound_connections,
    InactiveConnection, LearningAlgorithm, NodeRecord, NodeRecords,
};
use neva_types::{FunctionId, NodeId};
use tracing::debug;

/// The structural and parametric edits the mutator can apply.
///
/// `AddInboundConnection`/`AddOutboundConnection` and the two splice kinds
/// share implementations; the duplicate names exist as separate probability
/// slots in the mutation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MutationKind {
    MutateActivationFunction,
    AddBias,
    RemoveBias,
    MutateWeights,
    ResetWeights,
    AddInboundConnection,
    AddOutboundConnection,
    AddNeuron,
    AddNeuronOutSplice,
    AddNeuronInSplice,
    AddSensor,
    AddActuator,
    AddSensorLink,
    AddActuatorLink,
    RemoveSensorLink,
    RemoveActuatorLink,
    RemoveInboundConnection,
    RemoveOutboundConnection,
    ChangeNeuronLayer,
}

impl MutationKind {
    /// Every kind once: the default mutation sequence.
    pub fn standard_sequence() -> Vec<MutationKind> {
        use MutationKind::*;
        vec![
            MutateActivationFunction,
            AddBias,
            RemoveBias,
            MutateWeights,
            ResetWeights,
            AddInboundConnection,
            AddOutboundConnection,
            AddNeuron,
            AddNeuronOutSplice,
            AddNeuronInSplice,
            AddSensor,
            AddActuator,
            AddSensorLink,
            AddActuatorLink,
            RemoveSensorLink,
            RemoveActuatorLink,
            RemoveInboundConnection,
            RemoveOutboundConnection,
            ChangeNeuronLayer,
        ]
    }
}

/// Everything one mutation pass needs besides the records themselves.
#[derive(Clone)]
pub struct MutationProperties {
    pub mutations: Vec<MutationKind>,
    pub activation_ids: Vec<FunctionId>,
    pub sync_ids: Vec<FunctionId>,
    pub output_hook_ids: Vec<FunctionId>,
    /// Learning mode stamped onto neurons minted by this pass.
    pub learning_algorithm: LearningAlgorithm,
}

#[derive(Debug)]
enum Outcome {
    Applied,
    PreconditionFailed,
}

/// Upper bound on precondition resampling per applied kind, so a record set
/// where nothing in the sequence applies cannot spin forever.
const MAX_RESAMPLES: usize = 50;

/// Apply one full mutation pass and return the mutated copy.
pub fn mutate_records(
    records: &NodeRecords,
    props: &MutationProperties,
) -> EvolutionResult<NodeRecords> {
    let mut next = records.clone();
    let count = mutation_count(next.len());
    for _ in 0..count {
        apply_one(&mut next, props)?;
    }
    Ok(next)
}

/// `k = ceil(u * sqrt(n))`, at least 1.
fn mutation_count(node_count: usize) -> usize {
    let k = (random_f64() * (node_count as f64).sqrt()).ceil() as usize;
    k.max(1)
}

fn apply_one(records: &mut NodeRecords, props: &MutationProperties) -> EvolutionResult<()> {
    if props.mutations.is_empty() {
        return Ok(());
    }

    for _ in 0..MAX_RESAMPLES {
        let kind = match choose(&props.mutations) {
            Some(kind) => *kind,
            None => return Ok(()),
        };
        match apply_kind(records, kind, props)? {
            Outcome::Applied => return Ok(()),
            Outcome::PreconditionFailed if props.mutations.len() > 1 => continue,
            Outcome::PreconditionFailed => return Ok(()),
        }
    }

    debug!("[MUTATOR] No sampled mutation kind applied after {MAX_RESAMPLES} draws");
    Ok(())
}

fn apply_kind(
    records: &mut NodeRecords,
    kind: MutationKind,
    props: &MutationProperties,
) -> EvolutionResult<Outcome> {
    match kind {
        MutationKind::MutateActivationFunction => {
            Ok(mutate_activation_function(records, &props.activation_ids))
        }
        MutationKind::AddBias => Ok(add_bias(records)),
        MutationKind::RemoveBias => Ok(remove_bias(records)),
        MutationKind::MutateWeights => Ok(mutate_weights(records)),
        MutationKind::ResetWeights => Ok(reset_weights(records)),
        MutationKind::AddInboundConnection | MutationKind::AddOutboundConnection => {
            Ok(add_connection(records))
        }
        MutationKind::AddNeuron => Ok(add_neuron(records, props)),
        MutationKind::AddNeuronOutSplice | MutationKind::AddNeuronInSplice => {
            splice_neuron(records, props)
        }
        MutationKind::AddSensor => Ok(add_sensor(records, &props.sync_ids)),
        MutationKind::AddActuator => Ok(add_actuator(records, &props.output_hook_ids)),
        MutationKind::AddSensorLink => Ok(add_sensor_link(records)),
        MutationKind::AddActuatorLink => Ok(add_actuator_link(records)),
        MutationKind::RemoveSensorLink => Ok(remove_sensor_link(records)),
        MutationKind::RemoveActuatorLink => Ok(remove_actuator_link(records)),
        MutationKind::RemoveInboundConnection | MutationKind::RemoveOutboundConnection => {
            Ok(remove_connection(records))
        }
        MutationKind::ChangeNeuronLayer => Ok(change_neuron_layer(records)),
    }
}

fn pick(ids: &[NodeId]) -> Option<NodeId> {
    choose(ids).copied()
}

/// Next fresh node id for this record set.
fn fresh_node_id(records: &NodeRecords) -> NodeId {
    max_node_id(records).map(NodeId::next).unwrap_or(NodeId(0))
}

/// Whether a sensor can grow another outbound edge. `Some(0)` and `None`
/// mean unbounded.
fn sensor_has_capacity(record: &NodeRecord) -> bool {
    match record.maximum_vector_length {
        Some(cap) if cap > 0 => record.outbound_count() < cap,
        _ => true,
    }
}

/// Grow one edge out of a sensor: the new connection takes the next slot of
/// the sensor's output vector.
fn attach_sensor_edge(records: &mut NodeRecords, sensor: NodeId, target: NodeId, weight: f64) {
    let order = records
        .get(&sensor)
        .map(|r| r.outbound_count())
        .unwrap_or(0);
    if let Some(target_record) = records.get_mut(&target) {
        target_record.add_inbound(InactiveConnection {
            connection_order: Some(order),
            from_node: sensor,
            weight,
        });
    }
    if let Some(sensor_record) = records.get_mut(&sensor) {
        sensor_record.set_outbound_count(order + 1);
    }
}

fn mutate_activation_function(records: &mut NodeRecords, activation_ids: &[FunctionId]) -> Outcome {
    let (Some(neuron), Some(activation)) = (pick(&neuron_ids(records)), choose(activation_ids))
    else {
        return Outcome::PreconditionFailed;
    };
    let activation = activation.clone();
    if let Some(record) = records.get_mut(&neuron) {
        record.activation_function_id = Some(activation);
    }
    Outcome::Applied
}

fn add_bias(records: &mut NodeRecords) -> Outcome {
    let Some(neuron) = pick(&neuron_ids(records)) else {
        return Outcome::PreconditionFailed;
    };
    let Some(record) = records.get_mut(&neuron) else {
        return Outcome::PreconditionFailed;
    };
    match record.bias {
        None => {
            record.bias = Some(random_f64());
            Outcome::Applied
        }
        Some(bias) if bias == 0.0 => {
            record.bias = Some(random_f64());
            Outcome::Applied
        }
        Some(_) => Outcome::PreconditionFailed,
    }
}

fn remove_bias(records: &mut NodeRecords) -> Outcome {
    let Some(neuron) = pick(&neuron_ids(records)) else {
        return Outcome::PreconditionFailed;
    };
    let Some(record) = records.get_mut(&neuron) else {
        return Outcome::PreconditionFailed;
    };
    match record.bias {
        Some(bias) if bias > 0.0 => {
            record.bias = None;
            Outcome::Applied
        }
        _ => Outcome::PreconditionFailed,
    }
}

/// Perturb each inbound weight of one neuron independently with probability
/// `1 / sqrt(in_degree)`.
fn mutate_weights(records: &mut NodeRecords) -> Outcome {
    let Some(neuron) = pick(&neuron_ids(records)) else {
        return Outcome::PreconditionFailed;
    };
    let Some(record) = records.get_mut(&neuron) else {
        return Outcome::PreconditionFailed;
    };
    let degree = record.inbound_connections.len();
    if degree == 0 {
        return Outcome::PreconditionFailed;
    }
    let probability = 1.0 / (degree as f64).sqrt();
    for conn in record.inbound_connections.values_mut() {
        if random_bool(probability) {
            conn.weight = random_weight();
        }
    }
    Outcome::Applied
}

fn reset_weights(records: &mut NodeRecords) -> Outcome {
    let Some(neuron) = pick(&neuron_ids(records)) else {
        return Outcome::PreconditionFailed;
    };
    let Some(record) = records.get_mut(&neuron) else {
        return Outcome::PreconditionFailed;
    };
    if record.inbound_connections.is_empty() {
        return Outcome::PreconditionFailed;
    }
    for conn in record.inbound_connections.values_mut() {
        conn.weight = random_weight();
    }
    Outcome::Applied
}

/// Add an inbound connection on a random neuron, sourced from a random
/// neuron (possibly itself; recurrent edges are allowed). Sources are never
/// sensors, which keeps sensor slot bookkeeping out of this kind, and never
/// actuators, which have no outbound by invariant.
fn add_connection(records: &mut NodeRecords) -> Outcome {
    let neurons = neuron_ids(records);
    let (Some(target), Some(source)) = (pick(&neurons), pick(&neurons)) else {
        return Outcome::PreconditionFailed;
    };
    if let Some(record) = records.get_mut(&target) {
        record.add_inbound(InactiveConnection {
            connection_order: None,
            from_node: source,
            weight: 1.0,
        });
    }
    Outcome::Applied
}

/// Insert a fresh neuron and wire it between a random non-actuator source
/// and a random non-sensor target.
fn add_neuron(records: &mut NodeRecords, props: &MutationProperties) -> Outcome {
    let neurons = neuron_ids(records);
    let (Some(layer_donor), Some(activation)) = (pick(&neurons), choose(&props.activation_ids))
    else {
        return Outcome::PreconditionFailed;
    };
    let activation = activation.clone();
    let layer = match records.get(&layer_donor) {
        Some(record) => record.layer,
        None => return Outcome::PreconditionFailed,
    };

    // Source: any neuron, or any sensor that still has slot capacity.
    let mut sources = neurons.clone();
    for sensor in sensor_ids(records) {
        if records.get(&sensor).is_some_and(sensor_has_capacity) {
            sources.push(sensor);
        }
    }
    // Target: any neuron or actuator.
    let mut targets = neurons;
    targets.extend(actuator_ids(records));

    let (Some(source), Some(target)) = (pick(&sources), pick(&targets)) else {
        return Outcome::PreconditionFailed;
    };

    let new_id = fresh_node_id(records);
    let mut neuron = NodeRecord::neuron(new_id, layer, activation);
    neuron.learning_algorithm = props.learning_algorithm;
    records.insert(new_id, neuron);

    let source_is_sensor = records.get(&source).is_some_and(NodeRecord::is_sensor);
    if source_is_sensor {
        attach_sensor_edge(records, source, new_id, 1.0);
    } else if let Some(record) = records.get_mut(&new_id) {
        record.add_inbound(InactiveConnection {
            connection_order: None,
            from_node: source,
            weight: 1.0,
        });
    }

    if let Some(record) = records.get_mut(&target) {
        record.add_inbound(InactiveConnection {
            connection_order: None,
            from_node: new_id,
            weight: 1.0,
        });
    }

    Outcome::Applied
}

/// Splice a fresh neuron into an existing edge: the edge F -> T becomes
/// F -> N -> T, with N's layer chosen between the endpoints.
fn splice_neuron(
    records: &mut NodeRecords,
    props: &MutationProperties,
) -> EvolutionResult<Outcome> {
    // Any non-sensor node with inbound edges can host a splice.
    let mut hosts: Vec<NodeId> = Vec::new();
    for record in records.values() {
        if !record.is_sensor() && !record.inbound_connections.is_empty() {
            hosts.push(record.node_id);
        }
    }
    hosts.sort();

    let (Some(target), Some(activation)) = (pick(&hosts), choose(&props.activation_ids)) else {
        return Ok(Outcome::PreconditionFailed);
    };
    let activation = activation.clone();

    let (conn_id, conn) = {
        let Some(record) = records.get(&target) else {
            return Ok(Outcome::PreconditionFailed);
        };
        let mut conn_ids: Vec<_> = record.inbound_connections.keys().copied().collect();
        conn_ids.sort();
        let Some(conn_id) = choose(&conn_ids).copied() else {
            return Ok(Outcome::PreconditionFailed);
        };
        (conn_id, record.inbound_connections[&conn_id].clone())
    };

    let target_is_actuator = records
        .get(&target)
        .is_some_and(NodeRecord::is_actuator);
    let (source_is_sensor, source_layer) = match records.get(&conn.from_node) {
        Some(source) => (source.is_sensor(), source.layer),
        None => return Ok(Outcome::PreconditionFailed),
    };
    let target_layer = match records.get(&target) {
        Some(record) => record.layer,
        None => return Ok(Outcome::PreconditionFailed),
    };

    let layer = match (target_is_actuator, source_is_sensor) {
        (true, true) => {
            return Err(EvolutionError::InvalidMutation(format!(
                "splice of sensor {} directly into actuator {}",
                conn.from_node, target
            )))
        }
        (true, false) => source_layer + 1,
        (false, false) => (source_layer + target_layer) / 2,
        (false, true) => (target_layer + 1) / 2,
    };

    let new_id = fresh_node_id(records);
    let mut neuron = NodeRecord::neuron(new_id, layer, activation);
    neuron.learning_algorithm = props.learning_algorithm;
    // The upstream half keeps the original slot in a sensor's output
    // vector, so per-sensor order stays dense.
    neuron.add_inbound(InactiveConnection {
        connection_order: if source_is_sensor {
            conn.connection_order
        } else {
            None
        },
        from_node: conn.from_node,
        weight: 1.0,
    });
    records.insert(new_id, neuron);

    if let Some(record) = records.get_mut(&target) {
        if let Some(redirected) = record.inbound_connections.get_mut(&conn_id) {
            redirected.from_node = new_id;
            redirected.connection_order = None;
        }
    }

    Ok(Outcome::Applied)
}

/// Grow a new sensor, one per unused sync id, wired into a random neuron.
fn add_sensor(records: &mut NodeRecords, sync_ids: &[FunctionId]) -> Outcome {
    let used: Vec<FunctionId> = sensor_ids(records)
        .iter()
        .filter_map(|id| records.get(id).and_then(|r| r.sync_function_id.clone()))
        .collect();
    let unused: Vec<FunctionId> = sync_ids
        .iter()
        .filter(|id| !used.contains(id))
        .cloned()
        .collect();

    if sensor_ids(records).len() >= sync_ids.len() {
        return Outcome::PreconditionFailed;
    }
    let (Some(sync_id), Some(neuron)) = (choose(&unused), pick(&neuron_ids(records))) else {
        return Outcome::PreconditionFailed;
    };
    let sync_id = sync_id.clone();

    let new_id = fresh_node_id(records);
    records.insert(new_id, NodeRecord::sensor(new_id, sync_id, Some(1)));
    attach_sensor_edge(records, new_id, neuron, 1.0);
    Outcome::Applied
}

/// Grow a new actuator, one per unused output hook id, fed by a random
/// neuron.
fn add_actuator(records: &mut NodeRecords, output_hook_ids: &[FunctionId]) -> Outcome {
    let used: Vec<FunctionId> = actuator_ids(records)
        .iter()
        .filter_map(|id| records.get(id).and_then(|r| r.output_hook_id.clone()))
        .collect();
    let unused: Vec<FunctionId> = output_hook_ids
        .iter()
        .filter(|id| !used.contains(id))
        .cloned()
        .collect();

    if actuator_ids(records).len() >= output_hook_ids.len() {
        return Outcome::PreconditionFailed;
    }
    let (Some(hook_id), Some(neuron)) = (choose(&unused), pick(&neuron_ids(records))) else {
        return Outcome::PreconditionFailed;
    };
    let hook_id = hook_id.clone();

    let layer = records.values().map(|r| r.layer).max().unwrap_or(0) + 1;
    let new_id = fresh_node_id(records);
    let mut actuator = NodeRecord::actuator(new_id, layer, hook_id);
    actuator.add_inbound(InactiveConnection {
        connection_order: None,
        from_node: neuron,
        weight: 1.0,
    });
    records.insert(new_id, actuator);
    Outcome::Applied
}

/// Widen a sensor that still has slot capacity by one edge into a random
/// neuron.
fn add_sensor_link(records: &mut NodeRecords) -> Outcome {
    let eligible: Vec<NodeId> = sensor_ids(records)
        .into_iter()
        .filter(|id| records.get(id).is_some_and(sensor_has_capacity))
        .collect();
    let (Some(sensor), Some(neuron)) = (pick(&eligible), pick(&neuron_ids(records))) else {
        return Outcome::PreconditionFailed;
    };
    attach_sensor_edge(records, sensor, neuron, 1.0);
    Outcome::Applied
}

fn add_actuator_link(records: &mut NodeRecords) -> Outcome {
    let (Some(neuron), Some(actuator)) = (pick(&neuron_ids(records)), pick(&actuator_ids(records)))
    else {
        return Outcome::PreconditionFailed;
    };
    if let Some(record) = records.get_mut(&actuator) {
        record.add_inbound(InactiveConnection {
            connection_order: None,
            from_node: neuron,
            weight: 1.0,
        });
    }
    Outcome::Applied
}

/// Remove one edge of a sensor with fan-out above one, then renumber the
/// surviving edges densely in their prior order.
fn remove_sensor_link(records: &mut NodeRecords) -> Outcome {
    let wide_sensors: Vec<NodeId> = sensor_ids(records)
        .into_iter()
        .filter(|id| records.get(id).map(|r| r.outbound_count()).unwrap_or(0) > 1)
        .collect();
    let Some(sensor) = pick(&wide_sensors) else {
        return Outcome::PreconditionFailed;
    };

    // Only edges whose downstream keeps at least one other inbound may go,
    // so removal never orphans a node.
    let removable: Vec<(NodeId, neva_types::ConnectionId)> =
        sensor_outbound_connections(records, sensor)
            .into_iter()
            .filter(|(downstream, _, _)| {
                records
                    .get(downstream)
                    .map(|r| r.inbound_connections.len() > 1)
                    .unwrap_or(false)
            })
            .map(|(downstream, conn_id, _)| (downstream, conn_id))
            .collect();
    let Some((downstream, conn_id)) = choose(&removable).cloned() else {
        return Outcome::PreconditionFailed;
    };

    if let Some(record) = records.get_mut(&downstream) {
        record.inbound_connections.remove(&conn_id);
    }

    renumber_sensor_orders(records, sensor);
    let remaining = sensor_outbound_connections(records, sensor).len() as u32;
    if let Some(record) = records.get_mut(&sensor) {
        record.set_outbound_count(remaining);
    }
    Outcome::Applied
}

/// Reassign the connection orders of every edge sourced from `sensor`
/// densely from 0, keeping their prior sort order.
fn renumber_sensor_orders(records: &mut NodeRecords, sensor: NodeId) {
    let edges = sensor_outbound_connections(records, sensor);
    for (slot, (downstream, conn_id, _)) in edges.into_iter().enumerate() {
        if let Some(record) = records.get_mut(&downstream) {
            if let Some(conn) = record.inbound_connections.get_mut(&conn_id) {
                conn.connection_order = Some(slot as u32);
            }
        }
    }
}

fn remove_actuator_link(records: &mut NodeRecords) -> Outcome {
    let eligible: Vec<NodeId> = actuator_ids(records)
        .into_iter()
        .filter(|id| {
            records
                .get(id)
                .map(|r| r.inbound_connections.len() > 1)
                .unwrap_or(false)
        })
        .collect();
    let Some(actuator) = pick(&eligible) else {
        return Outcome::PreconditionFailed;
    };
    let Some(record) = records.get_mut(&actuator) else {
        return Outcome::PreconditionFailed;
    };
    let mut conn_ids: Vec<_> = record.inbound_connections.keys().copied().collect();
    conn_ids.sort();
    if let Some(conn_id) = choose(&conn_ids) {
        record.inbound_connections.remove(conn_id);
    }
    Outcome::Applied
}

/// Drop one non-sensor-sourced inbound edge of a neuron. Eligible neurons
/// keep at least two inbound edges afterwards, so removal cannot create a
/// degenerate single-recurrent-loop node.
fn remove_connection(records: &mut NodeRecords) -> Outcome {
    let mut eligible: Vec<(NodeId, Vec<neva_types::ConnectionId>)> = Vec::new();
    for neuron in neuron_ids(records) {
        let Some(record) = records.get(&neuron) else {
            continue;
        };
        if record.inbound_connections.len() < 3 {
            continue;
        }
        let mut droppable: Vec<_> = record
            .inbound_connections
            .iter()
            .filter(|(_, conn)| {
                records
                    .get(&conn.from_node)
                    .map(|source| !source.is_sensor())
                    .unwrap_or(false)
            })
            .map(|(conn_id, _)| *conn_id)
            .collect();
        droppable.sort();
        if !droppable.is_empty() {
            eligible.push((neuron, droppable));
        }
    }

    let Some((neuron, droppable)) = choose(&eligible).cloned() else {
        return Outcome::PreconditionFailed;
    };
    let Some(conn_id) = choose(&droppable).copied() else {
        return Outcome::PreconditionFailed;
    };
    if let Some(record) = records.get_mut(&neuron) {
        record.inbound_connections.remove(&conn_id);
    }
    Outcome::Applied
}

/// Move a random neuron to a uniform layer in `[1, max_layer + 1]`. Layer 0
/// stays reserved for sensors.
fn change_neuron_layer(records: &mut NodeRecords) -> Outcome {
    let Some(neuron) = pick(&neuron_ids(records)) else {
        return Outcome::PreconditionFailed;
    };
    let max_layer = records.values().map(|r| r.layer).max().unwrap_or(0).max(0);
    let layer = random_range_inclusive(1, max_layer + 1);
    if let Some(record) = records.get_mut(&neuron) {
        record.layer = layer;
    }
    Outcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use neva_genome::validate_records;

    fn props_with(kinds: Vec<MutationKind>) -> MutationProperties {
        MutationProperties {
            mutations: kinds,
            activation_ids: vec!["identity".into(), "tanh".into()],
            sync_ids: vec!["feed-a".into(), "feed-b".into()],
            output_hook_ids: vec!["emit-a".into(), "emit-b".into()],
            learning_algorithm: LearningAlgorithm::NoLearning,
        }
    }

    /// sensor(0) -> neuron(1) -> actuator(2), weights 1.0
    fn seed() -> NodeRecords {
        let mut records = NodeRecords::new();
        let mut sensor = NodeRecord::sensor(NodeId(0), "feed-a".into(), Some(1));
        sensor.set_outbound_count(1);
        let mut neuron = NodeRecord::neuron(NodeId(1), 1, "identity".into());
        neuron.add_inbound(InactiveConnection {
            connection_order: Some(0),
            from_node: NodeId(0),
            weight: 1.0,
        });
        let mut actuator = NodeRecord::actuator(NodeId(2), 2, "emit-a".into());
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
    fn test_mutation_count_is_at_least_one() {
        for _ in 0..100 {
            assert!(mutation_count(0) >= 1);
            assert!(mutation_count(1) >= 1);
            let k = mutation_count(100);
            assert!((1..=10).contains(&k), "k = {k}");
        }
    }

    #[test]
    fn test_single_kind_precondition_failure_is_a_no_op() {
        // RemoveBias on a biasless neuron cannot apply.
        let records = seed();
        let props = props_with(vec![MutationKind::RemoveBias]);
        let mutated = mutate_records(&records, &props).unwrap();
        assert_eq!(mutated, records);
    }

    #[test]
    fn test_add_bias_then_remove_bias() {
        let mut records = seed();
        assert!(matches!(add_bias(&mut records), Outcome::Applied));
        let bias = records[&NodeId(1)].bias.unwrap();
        assert!((0.0..1.0).contains(&bias));
        // A second add on the same biased neuron fails its precondition.
        assert!(matches!(add_bias(&mut records), Outcome::PreconditionFailed));

        if bias > 0.0 {
            assert!(matches!(remove_bias(&mut records), Outcome::Applied));
            assert_eq!(records[&NodeId(1)].bias, None);
        }
    }

    #[test]
    fn test_mutate_activation_function_stays_in_allowed_set() {
        let mut records = seed();
        let props = props_with(vec![MutationKind::MutateActivationFunction]);
        for _ in 0..20 {
            mutate_activation_function(&mut records, &props.activation_ids);
            let id = records[&NodeId(1)].activation_function_id.clone().unwrap();
            assert!(props.activation_ids.contains(&id));
        }
    }

    #[test]
    fn test_mutate_weights_respects_sqrt_d_probability() {
        // One neuron fanned in by 100 sensors: in-degree 100, so each edge
        // changes with probability 0.1.
        let mut records = NodeRecords::new();
        let mut neuron = NodeRecord::neuron(NodeId(0), 1, "identity".into());
        for i in 1..=100u64 {
            let mut sensor = NodeRecord::sensor(NodeId(i), format!("feed-{i}"), Some(1));
            sensor.set_outbound_count(1);
            records.insert(NodeId(i), sensor);
            neuron.add_inbound(InactiveConnection {
                connection_order: Some(0),
                from_node: NodeId(i),
                weight: 10.0,
            });
        }
        records.insert(NodeId(0), neuron);

        let runs = 200;
        let mut changed = 0usize;
        for _ in 0..runs {
            let mut working = records.clone();
            assert!(matches!(mutate_weights(&mut working), Outcome::Applied));
            changed += working[&NodeId(0)]
                .inbound_connections
                .values()
                .filter(|c| c.weight != 10.0)
                .count();
        }

        let observed = changed as f64 / (runs * 100) as f64;
        assert!(
            (0.08..=0.12).contains(&observed),
            "observed change probability {observed}"
        );
    }

    #[test]
    fn test_reset_weights_touches_every_edge() {
        let mut records = seed();
        records
            .get_mut(&NodeId(1))
            .unwrap()
            .inbound_connections
            .values_mut()
            .for_each(|c| c.weight = 100.0);
        assert!(matches!(reset_weights(&mut records), Outcome::Applied));
        for conn in records[&NodeId(1)].inbound_connections.values() {
            assert!(conn.weight.abs() <= std::f64::consts::FRAC_PI_2);
        }
    }

    #[test]
    fn test_add_neuron_keeps_records_valid() {
        for _ in 0..50 {
            let mut records = seed();
            let props = props_with(vec![MutationKind::AddNeuron]);
            assert!(matches!(add_neuron(&mut records, &props), Outcome::Applied));
            assert_eq!(records.len(), 4);
            assert!(records.contains_key(&NodeId(3)));
            let result = validate_records(&records);
            assert!(result.valid, "errors: {:?}", result.errors);
        }
    }

    #[test]
    fn test_splice_keeps_records_valid_and_redirects() {
        for _ in 0..50 {
            let mut records = seed();
            let props = props_with(vec![MutationKind::AddNeuronOutSplice]);
            let outcome = splice_neuron(&mut records, &props).unwrap();
            assert!(matches!(outcome, Outcome::Applied));
            assert_eq!(records.len(), 4);

            let spliced = &records[&NodeId(3)];
            assert!(spliced.is_neuron());
            assert_eq!(spliced.inbound_connections.len(), 1);

            let result = validate_records(&records);
            assert!(result.valid, "errors: {:?}", result.errors);
        }
    }

    #[test]
    fn test_sensor_to_actuator_splice_fails_loudly() {
        // A record set where the only inbound edge anywhere runs from a
        // sensor straight into an actuator.
        let mut records = NodeRecords::new();
        let mut sensor = NodeRecord::sensor(NodeId(0), "feed-a".into(), Some(1));
        sensor.set_outbound_count(1);
        let mut actuator = NodeRecord::actuator(NodeId(1), 1, "emit-a".into());
        actuator.add_inbound(InactiveConnection {
            connection_order: Some(0),
            from_node: NodeId(0),
            weight: 1.0,
        });
        records.insert(NodeId(0), sensor);
        records.insert(NodeId(1), actuator);

        let props = props_with(vec![MutationKind::AddNeuronInSplice]);
        let err = splice_neuron(&mut records, &props).unwrap_err();
        assert!(matches!(err, EvolutionError::InvalidMutation(_)));
    }

    #[test]
    fn test_splice_layer_rules() {
        // F neuron at layer 2, T neuron at layer 6: spliced layer is 4.
        let mut records = seed();
        records.get_mut(&NodeId(1)).unwrap().layer = 2;
        let mut upper = NodeRecord::neuron(NodeId(3), 6, "identity".into());
        upper.add_inbound(InactiveConnection {
            connection_order: None,
            from_node: NodeId(1),
            weight: 1.0,
        });
        records.insert(NodeId(3), upper);
        // Remove the actuator and sensor edges from play by splicing a
        // fixed edge: run until the n1 -> n3 edge is the one spliced.
        let props = props_with(vec![MutationKind::AddNeuronInSplice]);
        for _ in 0..200 {
            let mut working = records.clone();
            splice_neuron(&mut working, &props).unwrap();
            let new_id = max_node_id(&working).unwrap();
            let spliced = &working[&new_id];
            let feeds_upper = working[&NodeId(3)]
                .inbound_connections
                .values()
                .any(|c| c.from_node == new_id);
            if feeds_upper {
                assert_eq!(spliced.layer, 4);
                return;
            }
        }
        panic!("the n1 -> n3 edge was never chosen for splicing");
    }

    #[test]
    fn test_add_sensor_is_bounded_by_sync_ids() {
        let mut records = seed();
        let sync_ids: Vec<FunctionId> = vec!["feed-a".into(), "feed-b".into()];

        assert!(matches!(add_sensor(&mut records, &sync_ids), Outcome::Applied));
        let result = validate_records(&records);
        assert!(result.valid, "errors: {:?}", result.errors);

        // Both sync ids are used now, so growth stops.
        assert!(matches!(
            add_sensor(&mut records, &sync_ids),
            Outcome::PreconditionFailed
        ));
        // The new sensor uses the one id that was free.
        let new_sensor = &records[&NodeId(3)];
        assert_eq!(new_sensor.sync_function_id, Some("feed-b".into()));
    }

    #[test]
    fn test_add_actuator_is_bounded_by_hook_ids() {
        let mut records = seed();
        let hook_ids: Vec<FunctionId> = vec!["emit-a".into(), "emit-b".into()];

        assert!(matches!(
            add_actuator(&mut records, &hook_ids),
            Outcome::Applied
        ));
        let result = validate_records(&records);
        assert!(result.valid, "errors: {:?}", result.errors);
        assert!(matches!(
            add_actuator(&mut records, &hook_ids),
            Outcome::PreconditionFailed
        ));
    }

    #[test]
    fn test_add_sensor_link_assigns_next_slot() {
        let mut records = seed();
        records.get_mut(&NodeId(0)).unwrap().maximum_vector_length = Some(2);
        assert!(matches!(add_sensor_link(&mut records), Outcome::Applied));

        let sensor = &records[&NodeId(0)];
        assert_eq!(sensor.outbound_count(), 2);
        let orders: Vec<_> = sensor_outbound_connections(&records, NodeId(0))
            .into_iter()
            .map(|(_, _, order)| order)
            .collect();
        assert_eq!(orders, vec![Some(0), Some(1)]);

        // At capacity now.
        assert!(matches!(
            add_sensor_link(&mut records),
            Outcome::PreconditionFailed
        ));
    }

    #[test]
    fn test_zero_cap_sensor_is_unbounded_for_links() {
        let mut records = seed();
        records.get_mut(&NodeId(0)).unwrap().maximum_vector_length = Some(0);
        for _ in 0..5 {
            assert!(matches!(add_sensor_link(&mut records), Outcome::Applied));
        }
        assert_eq!(records[&NodeId(0)].outbound_count(), 6);
        let result = validate_records(&records);
        assert!(result.valid, "errors: {:?}", result.errors);
    }

    #[test]
    fn test_remove_sensor_link_renumbers_densely() {
        // Sensor 0 feeds neurons 1, 2, 3 at orders 0, 1, 2. Every neuron
        // carries a second inbound from hub neuron 4 so none is orphaned.
        let mut records = NodeRecords::new();
        let mut sensor = NodeRecord::sensor(NodeId(0), "feed-a".into(), Some(3));
        sensor.set_outbound_count(3);
        records.insert(NodeId(0), sensor);

        let mut hub = NodeRecord::neuron(NodeId(4), 1, "identity".into());
        hub.add_inbound(InactiveConnection {
            connection_order: None,
            from_node: NodeId(1),
            weight: 1.0,
        });

        for i in 1..=3u64 {
            let mut neuron = NodeRecord::neuron(NodeId(i), 1, "identity".into());
            neuron.add_inbound(InactiveConnection {
                connection_order: Some((i - 1) as u32),
                from_node: NodeId(0),
                weight: 1.0,
            });
            neuron.add_inbound(InactiveConnection {
                connection_order: None,
                from_node: NodeId(4),
                weight: 1.0,
            });
            records.insert(NodeId(i), neuron);
        }
        records.insert(NodeId(4), hub);

        assert!(matches!(remove_sensor_link(&mut records), Outcome::Applied));

        let sensor = &records[&NodeId(0)];
        assert_eq!(sensor.outbound_count(), 2);
        let orders: Vec<_> = sensor_outbound_connections(&records, NodeId(0))
            .into_iter()
            .map(|(_, _, order)| order)
            .collect();
        assert_eq!(orders, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_remove_sensor_link_needs_fanout_above_one() {
        let mut records = seed();
        assert!(matches!(
            remove_sensor_link(&mut records),
            Outcome::PreconditionFailed
        ));
    }

    #[test]
    fn test_remove_connection_never_drops_below_two_inbound() {
        // Neuron 1 has two inbound edges: too few to remove from.
        let mut records = seed();
        records
            .get_mut(&NodeId(1))
            .unwrap()
            .add_inbound(InactiveConnection {
                connection_order: None,
                from_node: NodeId(1),
                weight: 1.0,
            });
        assert!(matches!(
            remove_connection(&mut records),
            Outcome::PreconditionFailed
        ));

        // A third edge makes it eligible; the sensor edge must survive.
        records
            .get_mut(&NodeId(1))
            .unwrap()
            .add_inbound(InactiveConnection {
                connection_order: None,
                from_node: NodeId(1),
                weight: 0.5,
            });
        assert!(matches!(remove_connection(&mut records), Outcome::Applied));
        let neuron = &records[&NodeId(1)];
        assert_eq!(neuron.inbound_connections.len(), 2);
        assert!(neuron
            .inbound_connections
            .values()
            .any(|c| c.from_node == NodeId(0)));
    }

    #[test]
    fn test_change_neuron_layer_stays_positive() {
        let mut records = seed();
        for _ in 0..50 {
            let ceiling = records.values().map(|r| r.layer).max().unwrap() + 1;
            assert!(matches!(change_neuron_layer(&mut records), Outcome::Applied));
            let layer = records[&NodeId(1)].layer;
            assert!(
                (1..=ceiling).contains(&layer),
                "layer {layer} above ceiling {ceiling}"
            );
        }
    }

    #[test]
    fn test_full_pass_preserves_invariants() {
        let props = props_with(MutationKind::standard_sequence());
        let mut records = seed();
        for step in 0..200 {
            records = match mutate_records(&records, &props) {
                Ok(records) => records,
                Err(EvolutionError::InvalidMutation(msg)) => {
                    panic!("invariant-violating shape after {step} passes: {msg}")
                }
                Err(other) => panic!("unexpected error: {other}"),
            };
            let result = validate_records(&records);
            assert!(
                result.valid,
                "invalid after {} passes: {:?}",
                step + 1,
                result.errors
            );
        }
        // Growth happened somewhere along the way.
        assert!(records.len() >= 3);
    }
}
