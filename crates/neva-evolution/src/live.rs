// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Live (online) evolution.

Sequential alternative to the generation scheduler for tasks that exist
outside the process: only one cortex is alive at a time, and the caller
pumps synchronization calls at whatever cadence the task dictates. Each
call drives one think cycle of the active network and accumulates its
score. A network retires when the fitness directive ends its run or it
exhausts its think-cycle budget; when a full generation has retired, the
fit-population selector picks survivors and the mutator breeds the next
generation in place.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::config::EvolutionProperties;
use crate::mutation::{mutate_records, MutationProperties};
use crate::scheduler::{select_survivors, ScoredNodeRecords};
use crate::types::{EvolutionError, EvolutionResult};
use neva_genome::NodeRecords;
use neva_substrate::{Cortex, FitnessDirective, FitnessFn, FunctionRegistry, ScoreKeeperHandle};
use neva_types::NetworkId;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

/// Picks the survivors a new generation is bred from.
pub type FitPopulationSelector =
    Arc<dyn Fn(ScoredNodeRecords) -> Vec<(NetworkId, NodeRecords)> + Send + Sync>;

/// What one synchronization call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiveStatus {
    /// The active network thought one cycle and stays live.
    Thinking {
        network_id: NetworkId,
        think_cycle: u32,
        score: f64,
    },
    /// The active network retired; the next call starts the next one.
    NetworkRetired { network_id: NetworkId, score: f64 },
}

struct ActiveNetwork {
    id: NetworkId,
    cortex: Cortex,
    keeper: ScoreKeeperHandle,
    score: f64,
    cycles: u32,
}

/// One-cortex-at-a-time evolution driver.
pub struct LiveEvolution {
    props: EvolutionProperties,
    registry: Arc<FunctionRegistry>,
    fitness: FitnessFn,
    selector: FitPopulationSelector,
    mutation_props: MutationProperties,
    pending: VecDeque<(NetworkId, NodeRecords)>,
    scored: ScoredNodeRecords,
    active: Option<ActiveNetwork>,
    generation: u32,
}

impl LiveEvolution {
    /// Breed the first generation from the starting records and stand by.
    pub fn new(
        props: EvolutionProperties,
        registry: Arc<FunctionRegistry>,
        fitness: FitnessFn,
        starting_records: Vec<NodeRecords>,
    ) -> EvolutionResult<Self> {
        if starting_records.is_empty() {
            return Err(EvolutionError::EmptyPopulation(
                "no starting records supplied".to_string(),
            ));
        }

        let mutation_props = MutationProperties {
            mutations: props.mutation_sequence.clone(),
            activation_ids: registry.activation_ids(),
            sync_ids: registry.sync_ids(),
            output_hook_ids: registry.output_hook_ids(),
            learning_algorithm: props.neuron_learning_algorithm,
        };

        let divide_population_by = props.divide_population_by;
        let mut this = Self {
            props,
            registry,
            fitness,
            selector: Arc::new(move |scored| select_survivors(scored, divide_population_by)),
            mutation_props,
            pending: VecDeque::new(),
            scored: Vec::new(),
            active: None,
            generation: 0,
        };

        let survivors: Vec<(NetworkId, NodeRecords)> = starting_records
            .into_iter()
            .enumerate()
            .map(|(slot, records)| (slot as NetworkId, records))
            .collect();
        this.breed(&survivors)?;
        Ok(this)
    }

    /// Replace the default top-block selector.
    pub fn with_selector(mut self, selector: FitPopulationSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Generations completed so far.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Drive one think cycle of the active cortex, starting or evolving
    /// networks as needed.
    pub async fn synchronize_active_cortex(&mut self) -> EvolutionResult<LiveStatus> {
        let mut active = match self.active.take() {
            Some(active) => active,
            None => self.start_next_network().await?,
        };

        active.cortex.think_and_act().await?;
        active.cycles += 1;
        let (score, directive) = active.keeper.get_score().await?;
        active.score += score;

        let budget_spent = active.cycles >= self.props.maximum_think_cycles;
        if directive == FitnessDirective::EndGeneration || budget_spent {
            let status = LiveStatus::NetworkRetired {
                network_id: active.id,
                score: active.score,
            };
            self.retire(active).await?;
            return Ok(status);
        }

        let status = LiveStatus::Thinking {
            network_id: active.id,
            think_cycle: active.cycles,
            score: active.score,
        };
        self.active = Some(active);
        Ok(status)
    }

    /// Kill whatever is live and return every scored record set.
    pub async fn end_evolution(mut self) -> EvolutionResult<ScoredNodeRecords> {
        if let Some(active) = self.active.take() {
            self.retire(active).await?;
        }
        let mut scored = self.scored;
        scored.sort_by(|a, b| {
            b.1 .0
                .partial_cmp(&a.1 .0)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        info!(
            "[LIVE-EVOLUTION] Ending after {} generations with {} scored networks",
            self.generation,
            scored.len()
        );
        Ok(scored)
    }

    async fn start_next_network(&mut self) -> EvolutionResult<ActiveNetwork> {
        if self.pending.is_empty() {
            // A full generation has been scored; select and breed the next.
            let scored = std::mem::take(&mut self.scored);
            let survivors = (self.selector)(scored);
            if survivors.is_empty() {
                return Err(EvolutionError::EmptyPopulation(
                    "fit-population selector returned nothing".to_string(),
                ));
            }
            self.breed(&survivors)?;
            self.generation += 1;
            debug!(
                "[LIVE-EVOLUTION] Generation {} bred from {} survivors",
                self.generation,
                survivors.len()
            );
        }

        let (id, records) = self
            .pending
            .pop_front()
            .ok_or_else(|| EvolutionError::EmptyPopulation("empty generation bred".to_string()))?;

        let keeper = ScoreKeeperHandle::spawn(id, self.fitness.clone());
        let bindings = self.registry.bind(id, &keeper);
        let cortex = Cortex::construct(id, records, &bindings, self.props.think_timeout()).await?;
        Ok(ActiveNetwork {
            id,
            cortex,
            keeper,
            score: 0.0,
            cycles: 0,
        })
    }

    async fn retire(&mut self, active: ActiveNetwork) -> EvolutionResult<()> {
        let records = active.cortex.kill().await?;
        active.keeper.kill().await?;
        debug!(
            "[LIVE-EVOLUTION] Network {} retired after {} cycles, score {:.4}",
            active.id, active.cycles, active.score
        );
        self.scored.push((active.id, (active.score, records)));
        Ok(())
    }

    /// Rotate the survivors into `maximum_minds` mutated children with
    /// dense ids from zero.
    fn breed(&mut self, survivors: &[(NetworkId, NodeRecords)]) -> EvolutionResult<()> {
        for slot in 0..self.props.maximum_minds {
            let (_, parent) = &survivors[slot % survivors.len()];
            let child = mutate_records(parent, &self.mutation_props)?;
            self.pending.push_back((slot as NetworkId, child));
        }
        Ok(())
    }
}
