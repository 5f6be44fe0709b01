// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Actuator actor.

Same barrier rule as a neuron, but the aggregate is a plain sum: weights
were already applied by the upstream senders. Each completed barrier
invokes the output hook and notifies the owning cortex, which is how a
think cycle learns that the wave reached this actuator.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::message::{CortexEvent, NodeSignal, Synapse};
use crate::registry::OutputHookFn;
use neva_genome::NodeRecord;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

pub(crate) struct ActuatorActor {
    record: NodeRecord,
    hook: OutputHookFn,
    events: mpsc::UnboundedSender<CortexEvent>,
    barrier_threshold: u32,
    barrier: Vec<Synapse>,
    rx: mpsc::UnboundedReceiver<NodeSignal>,
}

pub(crate) fn spawn_actuator(
    record: NodeRecord,
    hook: OutputHookFn,
    events: mpsc::UnboundedSender<CortexEvent>,
    rx: mpsc::UnboundedReceiver<NodeSignal>,
) -> JoinHandle<()> {
    let actor = ActuatorActor {
        record,
        hook,
        events,
        barrier_threshold: 0,
        barrier: Vec::new(),
        rx,
    };
    tokio::spawn(actor.run())
}

impl ActuatorActor {
    async fn run(mut self) {
        while let Some(signal) = self.rx.recv().await {
            match signal {
                NodeSignal::Sync => {}
                NodeSignal::ReceiveInput(synapse) => {
                    self.barrier.push(synapse);
                    if self.barrier_threshold > 0
                        && self.barrier.len() as u32 >= self.barrier_threshold
                    {
                        self.act();
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

    fn act(&mut self) {
        let mut sum = 0.0;
        for synapse in &self.barrier {
            sum += synapse.value;
        }

        (self.hook)(sum);

        if self
            .events
            .send(CortexEvent::ActuatorFired(self.record.node_id))
            .is_err()
        {
            trace!(
                "[ACTUATOR] {} fired after its cortex went away",
                self.record.node_id
            );
        }

        self.barrier.clear();
    }
}
