// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Neuron actor.

Collects one synapse per inbound edge behind a barrier, then fires:
`activation(dot(values, weights) + bias)`, delivered along every outbound
edge. When the record asks for Hebbian learning, the firing also nudges the
neuron's own inbound weight table; those updated weights are what teardown
serialises back into the record.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::message::{NodeSignal, OutboundEdge, Synapse};
use crate::registry::ActivationFn;
use ahash::AHashMap;
use neva_genome::{LearningAlgorithm, NodeRecord};
use neva_types::{ConnectionId, NodeId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

pub(crate) struct NeuronActor {
    record: NodeRecord,
    activation: ActivationFn,
    outbound: Vec<OutboundEdge>,
    barrier_threshold: u32,
    barrier: Vec<Synapse>,
    /// Connection keys grouped by source, in connection_order. Used to match
    /// arrived synapses back to record connections for Hebbian updates.
    inbound_by_source: AHashMap<NodeId, Vec<ConnectionId>>,
    rx: mpsc::UnboundedReceiver<NodeSignal>,
}

pub(crate) fn spawn_neuron(
    record: NodeRecord,
    activation: ActivationFn,
    outbound: Vec<OutboundEdge>,
    rx: mpsc::UnboundedReceiver<NodeSignal>,
) -> JoinHandle<()> {
    let mut inbound_by_source: AHashMap<NodeId, Vec<(Option<u32>, ConnectionId)>> =
        AHashMap::new();
    for (conn_id, conn) in &record.inbound_connections {
        inbound_by_source
            .entry(conn.from_node)
            .or_default()
            .push((conn.connection_order, *conn_id));
    }
    let inbound_by_source = inbound_by_source
        .into_iter()
        .map(|(from, mut conns)| {
            conns.sort_by_key(|(order, id)| (order.unwrap_or(u32::MAX), *id));
            (from, conns.into_iter().map(|(_, id)| id).collect())
        })
        .collect();

    let actor = NeuronActor {
        record,
        activation,
        outbound,
        barrier_threshold: 0,
        barrier: Vec::new(),
        inbound_by_source,
        rx,
    };
    tokio::spawn(actor.run())
}

impl NeuronActor {
    async fn run(mut self) {
        while let Some(signal) = self.rx.recv().await {
            match signal {
                NodeSignal::Sync => {}
                NodeSignal::ReceiveInput(synapse) => {
                    self.barrier.push(synapse);
                    if self.barrier_threshold > 0
                        && self.barrier.len() as u32 >= self.barrier_threshold
                    {
                        self.fire();
                    }
                }
                NodeSignal::IncrementBarrierThreshold { ack } => {
                    self.barrier_threshold += 1;
                    let _ = ack.send(());
                }
                NodeSignal::Retire { reply } => {
                    let _ = reply.send(self.record);
                    return;
                }
            }
        }
    }

    fn fire(&mut self) {
        let mut sum = 0.0;
        for synapse in &self.barrier {
            sum += synapse.value * synapse.weight;
        }
        sum += self.record.bias.unwrap_or(0.0);

        let output = (self.activation)(sum);

        if let LearningAlgorithm::Hebbian { rate } = self.record.learning_algorithm {
            self.apply_hebbian(rate, output);
        }

        let node_id = self.record.node_id;
        for edge in &self.outbound {
            if edge.deliver(node_id, output).is_err() {
                trace!(
                    "[NEURON] {} could not deliver to retired node {}",
                    node_id,
                    edge.target.node_id()
                );
            }
        }

        self.barrier.clear();
    }

    /// Hebbian update over the inbound weight table: each arrived synapse is
    /// matched to one record connection per source in arrival order, then
    /// `weight += rate * input * output`.
    fn apply_hebbian(&mut self, rate: f64, output: f64) {
        let mut cursor: AHashMap<NodeId, usize> = AHashMap::new();
        for synapse in &self.barrier {
            let Some(conn_ids) = self.inbound_by_source.get(&synapse.from) else {
                continue;
            };
            let next = cursor.entry(synapse.from).or_insert(0);
            if let Some(conn_id) = conn_ids.get(*next) {
                if let Some(conn) = self.record.inbound_connections.get_mut(conn_id) {
                    conn.weight += rate * synapse.value * output;
                }
                *next += 1;
            }
        }
    }
}
