// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Cortex coordinator: one owner per live network.

Construction turns a validated record set into one actor per node, resolves
every inbound connection into an outbound edge on its source, and raises
barrier thresholds one acknowledged increment per edge, so no node can fire
before its in-degree is fully known. A think cycle posts `Sync` to every
sensor and waits, under a timeout, for every actuator to report a completed
barrier. Teardown retires every actor back into its record.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::actuator::spawn_actuator;
use crate::message::{CortexEvent, NodeHandle, NodeSignal, OutboundEdge};
use crate::neuron::spawn_neuron;
use crate::registry::NetworkBindings;
use crate::sensor::spawn_sensor;
use crate::types::{SubstrateError, SubstrateResult};
use ahash::{AHashMap, AHashSet};
use neva_genome::{validate_records, NodeRecordType, NodeRecords};
use neva_types::{NetworkId, NodeId};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// How a think cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThinkCycleOutcome {
    /// Every actuator fired at least once since the sync.
    Finished,
    /// The timeout elapsed first. Scoring proceeds with whatever the score
    /// keeper holds.
    Incomplete,
}

/// Live coordinator owning one network's actors.
#[derive(Debug)]
pub struct Cortex {
    network_id: NetworkId,
    handles: AHashMap<NodeId, NodeHandle>,
    sensors: Vec<NodeHandle>,
    actuators: AHashSet<NodeId>,
    events_rx: mpsc::UnboundedReceiver<CortexEvent>,
    think_timeout: Duration,
}

impl Cortex {
    /// Materialise a record set into a live actor graph.
    ///
    /// Fails if the records violate the structural invariants or name a
    /// function the bindings do not carry.
    pub async fn construct(
        network_id: NetworkId,
        records: NodeRecords,
        bindings: &NetworkBindings,
        think_timeout: Duration,
    ) -> SubstrateResult<Self> {
        let validation = validate_records(&records);
        if !validation.valid {
            return Err(SubstrateError::InvalidRecords(
                validation.errors.join("; "),
            ));
        }
        for warning in &validation.warnings {
            debug!("[CORTEX] Network {}: {}", network_id, warning);
        }

        let mut handles: AHashMap<NodeId, NodeHandle> = AHashMap::with_capacity(records.len());
        let mut mailboxes = AHashMap::with_capacity(records.len());
        for id in records.keys() {
            let (handle, rx) = NodeHandle::channel(*id);
            handles.insert(*id, handle);
            mailboxes.insert(*id, rx);
        }

        // Invert the inbound-only record form into per-source outbound
        // edge lists, counting in-degrees as we go.
        let mut outbound: AHashMap<NodeId, Vec<OutboundEdge>> = AHashMap::new();
        let mut inbound_counts: AHashMap<NodeId, u32> = AHashMap::new();
        for (node_id, record) in &records {
            for conn in record.inbound_connections.values() {
                let Some(target) = handles.get(node_id).cloned() else {
                    continue;
                };
                outbound.entry(conn.from_node).or_default().push(OutboundEdge {
                    target,
                    weight: conn.weight,
                    connection_order: conn.connection_order,
                });
                *inbound_counts.entry(*node_id).or_default() += 1;
            }
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut sensors = Vec::new();
        let mut actuators = AHashSet::new();

        let mut ids: Vec<NodeId> = records.keys().copied().collect();
        ids.sort();
        let mut records = records;

        for id in ids {
            let Some(record) = records.remove(&id) else {
                continue;
            };
            let Some(rx) = mailboxes.remove(&id) else {
                continue;
            };
            let edges = outbound.remove(&id).unwrap_or_default();

            match record.node_type {
                NodeRecordType::Neuron => {
                    let Some(fid) = record.activation_function_id.clone() else {
                        return Err(SubstrateError::InvalidRecords(format!(
                            "neuron {id} has no activation function id"
                        )));
                    };
                    let activation = bindings.activations.get(&fid).cloned().ok_or(
                        SubstrateError::MissingFunction {
                            kind: "activation",
                            id: fid,
                        },
                    )?;
                    spawn_neuron(record, activation, edges, rx);
                }
                NodeRecordType::Sensor { .. } => {
                    let Some(fid) = record.sync_function_id.clone() else {
                        return Err(SubstrateError::InvalidRecords(format!(
                            "sensor {id} has no sync function id"
                        )));
                    };
                    let sync_fn = bindings.sync_functions.get(&fid).cloned().ok_or(
                        SubstrateError::MissingFunction {
                            kind: "sync",
                            id: fid,
                        },
                    )?;
                    if let Some(handle) = handles.get(&id) {
                        sensors.push(handle.clone());
                    }
                    spawn_sensor(record, sync_fn, edges, rx);
                }
                NodeRecordType::Actuator => {
                    let Some(fid) = record.output_hook_id.clone() else {
                        return Err(SubstrateError::InvalidRecords(format!(
                            "actuator {id} has no output hook id"
                        )));
                    };
                    let hook = bindings.output_hooks.get(&fid).cloned().ok_or(
                        SubstrateError::MissingFunction {
                            kind: "output hook",
                            id: fid,
                        },
                    )?;
                    actuators.insert(id);
                    spawn_actuator(record, hook, events_tx.clone(), rx);
                }
            }
        }

        // Wire barriers: one acknowledged increment per inbound edge. The
        // ack keeps construction strictly ordered before any sync.
        let mut count_pairs: Vec<(NodeId, u32)> = inbound_counts.into_iter().collect();
        count_pairs.sort();
        for (node_id, count) in count_pairs {
            let Some(handle) = handles.get(&node_id) else {
                continue;
            };
            for _ in 0..count {
                handle.increment_barrier_threshold().await?;
            }
        }

        debug!(
            "[CORTEX] Network {} constructed: {} nodes, {} sensors, {} actuators",
            network_id,
            handles.len(),
            sensors.len(),
            actuators.len()
        );

        Ok(Self {
            network_id,
            handles,
            sensors,
            actuators,
            events_rx,
            think_timeout,
        })
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn node_count(&self) -> usize {
        self.handles.len()
    }

    /// Drive one think cycle: sync every sensor, then wait until every
    /// actuator has fired once or the timeout elapses.
    pub async fn think_and_act(&mut self) -> SubstrateResult<ThinkCycleOutcome> {
        // Discard actuator events left over from a timed-out wave.
        while self.events_rx.try_recv().is_ok() {}

        for sensor in &self.sensors {
            sensor.send(NodeSignal::Sync)?;
        }

        if self.actuators.is_empty() {
            return Ok(ThinkCycleOutcome::Finished);
        }

        let mut fired: AHashSet<NodeId> = AHashSet::new();
        let actuator_count = self.actuators.len();
        let actuators = &self.actuators;
        let events_rx = &mut self.events_rx;

        let wave = async {
            while fired.len() < actuator_count {
                match events_rx.recv().await {
                    Some(CortexEvent::ActuatorFired(id)) => {
                        if actuators.contains(&id) {
                            fired.insert(id);
                        }
                    }
                    None => break,
                }
            }
        };

        let waited = tokio::time::timeout(self.think_timeout, wave).await;
        if waited.is_ok() && fired.len() == actuator_count {
            Ok(ThinkCycleOutcome::Finished)
        } else {
            debug!(
                "[CORTEX] Network {} think cycle incomplete: {}/{} actuators fired",
                self.network_id,
                fired.len(),
                actuator_count
            );
            Ok(ThinkCycleOutcome::Incomplete)
        }
    }

    /// Tear the network down: retire every actor back into its record and
    /// return the reassembled record set.
    pub async fn kill(mut self) -> SubstrateResult<NodeRecords> {
        let mut records = NodeRecords::new();
        let mut ids: Vec<NodeId> = self.handles.keys().copied().collect();
        ids.sort();
        for id in ids {
            if let Some(handle) = self.handles.remove(&id) {
                let record = handle.retire().await?;
                records.insert(id, record);
            }
        }
        debug!(
            "[CORTEX] Network {} torn down into {} records",
            self.network_id,
            records.len()
        );
        Ok(records)
    }
}
