// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Sensor actor.

A sensor has no inbound edges. On `Sync` it reads its bound input function
and emits one synapse per outbound edge, in connection order. When the read
sequence is shorter than the fan-out, values are reused cyclically, head
first.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::message::{NodeSignal, OutboundEdge};
use crate::registry::SyncFn;
use neva_genome::NodeRecord;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, trace};

pub(crate) struct SensorActor {
    record: NodeRecord,
    sync_fn: SyncFn,
    /// Outbound edges sorted by connection_order; edge i reads slot i of
    /// the sync output vector (modulo its length).
    outbound: Vec<OutboundEdge>,
    rx: mpsc::UnboundedReceiver<NodeSignal>,
}

pub(crate) fn spawn_sensor(
    record: NodeRecord,
    sync_fn: SyncFn,
    mut outbound: Vec<OutboundEdge>,
    rx: mpsc::UnboundedReceiver<NodeSignal>,
) -> JoinHandle<()> {
    outbound.sort_by_key(|edge| edge.connection_order.unwrap_or(u32::MAX));
    let actor = SensorActor {
        record,
        sync_fn,
        outbound,
        rx,
    };
    tokio::spawn(actor.run())
}

impl SensorActor {
    async fn run(mut self) {
        while let Some(signal) = self.rx.recv().await {
            match signal {
                NodeSignal::Sync => self.emit(),
                NodeSignal::ReceiveInput(synapse) => {
                    // Sensors have no inbound edges; a synapse here means a
                    // wiring bug upstream.
                    trace!(
                        "[SENSOR] {} ignoring stray synapse from {}",
                        self.record.node_id,
                        synapse.from
                    );
                }
                NodeSignal::IncrementBarrierThreshold { ack } => {
                    let _ = ack.send(());
                }
                NodeSignal::Retire { reply } => {
                    let _ = reply.send(self.record);
                    return;
                }
            }
        }
    }

    fn emit(&self) {
        if self.outbound.is_empty() {
            return;
        }

        let values = (self.sync_fn)();
        if values.is_empty() {
            error!(
                "[SENSOR] {} sync function returned no values, wave will stall",
                self.record.node_id
            );
            return;
        }

        let node_id = self.record.node_id;
        for (slot, edge) in self.outbound.iter().enumerate() {
            let value = values[slot % values.len()];
            if edge.deliver(node_id, value).is_err() {
                trace!(
                    "[SENSOR] {} could not deliver to retired node {}",
                    node_id,
                    edge.target.node_id()
                );
            }
        }
    }
}
