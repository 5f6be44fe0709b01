// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
The message alphabet shared by all node actors, and the handle type the
cortex uses to reach them.

Every node actor owns one unbounded FIFO mailbox. Fire-and-forget signals
(`Sync`, `ReceiveInput`) go straight into the mailbox; wiring and teardown
(`IncrementBarrierThreshold`, `Retire`) are oneshot request-reply so the
caller can sequence construction and collect records deterministically.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::types::{SubstrateError, SubstrateResult};
use neva_genome::NodeRecord;
use neva_types::NodeId;
use tokio::sync::{mpsc, oneshot};

/// One delivered synapse: who sent it, what they computed, and the weight
/// stored on the edge it travelled.
#[derive(Debug, Clone, Copy)]
pub struct Synapse {
    pub from: NodeId,
    pub value: f64,
    pub weight: f64,
}

/// The substrate message alphabet.
#[derive(Debug)]
pub enum NodeSignal {
    /// Instruct a sensor to read its source and emit one synapse per
    /// outbound edge. Neurons and actuators ignore it.
    Sync,
    /// One arrived synapse.
    ReceiveInput(Synapse),
    /// Raise the expected inbound count by one. Sent once per inbound edge
    /// during wiring, acknowledged before the next edge is attached, so a
    /// node can never fire before its in-degree is fully known.
    IncrementBarrierThreshold { ack: oneshot::Sender<()> },
    /// Drain the actor back into its record and terminate.
    Retire { reply: oneshot::Sender<NodeRecord> },
}

/// Cloneable address of one live node actor.
#[derive(Debug, Clone)]
pub struct NodeHandle {
    node_id: NodeId,
    tx: mpsc::UnboundedSender<NodeSignal>,
}

impl NodeHandle {
    /// Create the handle/mailbox pair for a node that is about to spawn.
    pub(crate) fn channel(node_id: NodeId) -> (Self, mpsc::UnboundedReceiver<NodeSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { node_id, tx }, rx)
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Post a fire-and-forget signal into the node's mailbox.
    pub fn send(&self, signal: NodeSignal) -> SubstrateResult<()> {
        self.tx
            .send(signal)
            .map_err(|_| SubstrateError::MailboxClosed(self.node_id))
    }

    /// Raise the node's barrier threshold and wait for the acknowledgement.
    pub async fn increment_barrier_threshold(&self) -> SubstrateResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(NodeSignal::IncrementBarrierThreshold { ack: ack_tx })?;
        ack_rx
            .await
            .map_err(|_| SubstrateError::ReplyDropped(self.node_id))
    }

    /// Ask the node to convert itself back into a record and terminate.
    pub async fn retire(&self) -> SubstrateResult<NodeRecord> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(NodeSignal::Retire { reply: reply_tx })?;
        reply_rx
            .await
            .map_err(|_| SubstrateError::ReplyDropped(self.node_id))
    }
}

/// One resolved outbound edge: where to deliver, at what stored weight, and
/// (for sensor sources) which slot of the sensor's output vector feeds it.
#[derive(Debug, Clone)]
pub struct OutboundEdge {
    pub target: NodeHandle,
    pub weight: f64,
    pub connection_order: Option<u32>,
}

impl OutboundEdge {
    /// Deliver one synapse along this edge.
    pub fn deliver(&self, from: NodeId, value: f64) -> SubstrateResult<()> {
        self.target.send(NodeSignal::ReceiveInput(Synapse {
            from,
            value,
            weight: self.weight,
        }))
    }
}

/// Events the node actors raise back to their owning cortex.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CortexEvent {
    ActuatorFired(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_into_closed_mailbox_fails() {
        let (handle, rx) = NodeHandle::channel(NodeId(7));
        drop(rx);
        let err = handle.send(NodeSignal::Sync).unwrap_err();
        assert!(matches!(err, SubstrateError::MailboxClosed(NodeId(7))));
    }

    #[tokio::test]
    async fn test_deliver_carries_the_edge_weight() {
        let (handle, mut rx) = NodeHandle::channel(NodeId(1));
        let edge = OutboundEdge {
            target: handle,
            weight: 0.25,
            connection_order: None,
        };
        edge.deliver(NodeId(0), 2.0).unwrap();

        match rx.recv().await.unwrap() {
            NodeSignal::ReceiveInput(syn) => {
                assert_eq!(syn.from, NodeId(0));
                assert_eq!(syn.value, 2.0);
                assert_eq!(syn.weight, 0.25);
            }
            other => panic!("unexpected signal {other:?}"),
        }
    }
}
