// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Per-network score keeper.

One keeper actor rides along with every live network. Actuator output hooks
gather values into its buffer (latest value per hook id, not a history);
the driver then asks for a score, which invokes the caller's fitness
function over the buffer and clears it for the next cycle.

`Gather` is fire-and-forget into the keeper's FIFO mailbox. Because
`GetScore` travels the same mailbox, every gather posted before it is
applied before the score is computed.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::types::{SubstrateError, SubstrateResult};
use ahash::AHashMap;
use neva_types::{FunctionId, NetworkId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// What the fitness function wants the driver to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitnessDirective {
    ContinueGeneration,
    EndGeneration,
}

/// Caller-supplied fitness function: network id plus the latest actuator
/// outputs, keyed by output hook id.
pub type FitnessFn =
    Arc<dyn Fn(NetworkId, &AHashMap<FunctionId, f64>) -> (f64, FitnessDirective) + Send + Sync>;

#[derive(Debug)]
enum ScoreKeeperSignal {
    Gather {
        output_hook_id: FunctionId,
        value: f64,
    },
    GetScore {
        reply: oneshot::Sender<(f64, FitnessDirective)>,
    },
    Kill {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable address of one score keeper actor.
#[derive(Clone)]
pub struct ScoreKeeperHandle {
    network_id: NetworkId,
    tx: mpsc::UnboundedSender<ScoreKeeperSignal>,
}

impl ScoreKeeperHandle {
    /// Spawn a keeper for one network.
    pub fn spawn(network_id: NetworkId, fitness: FitnessFn) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(network_id, fitness, rx));
        Self { network_id, tx }
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    /// Overwrite the buffer entry for one output hook.
    pub fn gather(&self, output_hook_id: FunctionId, value: f64) {
        // A keeper that is already gone just drops late actuator output.
        if self
            .tx
            .send(ScoreKeeperSignal::Gather {
                output_hook_id,
                value,
            })
            .is_err()
        {
            debug!(
                "[SCORE-KEEPER] Network {} dropped a gather, keeper is gone",
                self.network_id
            );
        }
    }

    /// Score the current buffer with the fitness function and clear it.
    pub async fn get_score(&self) -> SubstrateResult<(f64, FitnessDirective)> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(ScoreKeeperSignal::GetScore { reply: reply_tx })
            .map_err(|_| SubstrateError::ScoreKeeperGone(self.network_id))?;
        reply_rx
            .await
            .map_err(|_| SubstrateError::ScoreKeeperGone(self.network_id))
    }

    /// Terminate the keeper, waiting for the acknowledgement.
    pub async fn kill(&self) -> SubstrateResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(ScoreKeeperSignal::Kill { reply: reply_tx })
            .map_err(|_| SubstrateError::ScoreKeeperGone(self.network_id))?;
        reply_rx
            .await
            .map_err(|_| SubstrateError::ScoreKeeperGone(self.network_id))
    }
}

async fn run(
    network_id: NetworkId,
    fitness: FitnessFn,
    mut rx: mpsc::UnboundedReceiver<ScoreKeeperSignal>,
) {
    let mut buffer: AHashMap<FunctionId, f64> = AHashMap::new();

    while let Some(signal) = rx.recv().await {
        match signal {
            ScoreKeeperSignal::Gather {
                output_hook_id,
                value,
            } => {
                buffer.insert(output_hook_id, value);
            }
            ScoreKeeperSignal::GetScore { reply } => {
                let scored = fitness(network_id, &buffer);
                buffer.clear();
                let _ = reply.send(scored);
            }
            ScoreKeeperSignal::Kill { reply } => {
                let _ = reply.send(());
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_fitness() -> FitnessFn {
        Arc::new(|_, outputs| {
            let score: f64 = outputs.values().sum();
            (score, FitnessDirective::ContinueGeneration)
        })
    }

    #[tokio::test]
    async fn test_gather_overwrites_per_hook() {
        let keeper = ScoreKeeperHandle::spawn(0, sum_fitness());
        keeper.gather("left".into(), 1.0);
        keeper.gather("left".into(), 5.0);
        keeper.gather("right".into(), 2.0);

        let (score, directive) = keeper.get_score().await.unwrap();
        assert_eq!(score, 7.0);
        assert_eq!(directive, FitnessDirective::ContinueGeneration);
        keeper.kill().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_score_clears_the_buffer() {
        let keeper = ScoreKeeperHandle::spawn(3, sum_fitness());
        keeper.gather("out".into(), 4.0);
        let (first, _) = keeper.get_score().await.unwrap();
        let (second, _) = keeper.get_score().await.unwrap();
        assert_eq!(first, 4.0);
        assert_eq!(second, 0.0);
        keeper.kill().await.unwrap();
    }

    #[tokio::test]
    async fn test_end_generation_directive_passes_through() {
        let fitness: FitnessFn = Arc::new(|_, _| (1.0, FitnessDirective::EndGeneration));
        let keeper = ScoreKeeperHandle::spawn(9, fitness);
        let (_, directive) = keeper.get_score().await.unwrap();
        assert_eq!(directive, FitnessDirective::EndGeneration);
        keeper.kill().await.unwrap();
    }

    #[tokio::test]
    async fn test_calls_after_kill_fail() {
        let keeper = ScoreKeeperHandle::spawn(1, sum_fitness());
        keeper.kill().await.unwrap();
        // Give the task a moment to drop the receiver.
        tokio::task::yield_now().await;
        assert!(keeper.get_score().await.is_err());
    }
}
