// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Generation scheduler.

Runs the evolve / materialise / drive / score / select loop: survivors are
rotated and mutated into a fresh generation, every candidate is built into
a live cortex with its own score keeper, think cycles are driven (in
parallel or sequentially) and scored, then the networks are torn back down
into records and the top block survives into the next generation.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::config::EvolutionProperties;
use crate::mutation::{mutate_records, MutationProperties};
use crate::types::{EvolutionError, EvolutionResult};
use crate::EvolutionStats;
use futures::future::join_all;
use neva_genome::NodeRecords;
use neva_substrate::{Cortex, FitnessDirective, FitnessFn, FunctionRegistry, ScoreKeeperHandle};
use neva_types::NetworkId;
use std::sync::Arc;
use tracing::{debug, info};

/// Final records of a generation, paired with each network's accumulated
/// score and sorted descending by score.
pub type ScoredNodeRecords = Vec<(NetworkId, (f64, NodeRecords))>;

/// Hook invoked with the scored records at the end of every generation.
pub type EndOfGenerationFn = Arc<dyn Fn(&ScoredNodeRecords) + Send + Sync>;

struct LiveNetwork {
    id: NetworkId,
    cortex: Cortex,
    keeper: ScoreKeeperHandle,
    score: f64,
}

/// Drives whole populations through repeated generations.
pub struct GenerationScheduler {
    props: EvolutionProperties,
    registry: Arc<FunctionRegistry>,
    fitness: FitnessFn,
    end_of_generation: Option<EndOfGenerationFn>,
    stats: EvolutionStats,
}

impl GenerationScheduler {
    pub fn new(
        props: EvolutionProperties,
        registry: Arc<FunctionRegistry>,
        fitness: FitnessFn,
    ) -> Self {
        Self {
            props,
            registry,
            fitness,
            end_of_generation: None,
            stats: EvolutionStats::default(),
        }
    }

    /// Install a hook that observes each generation's scored records.
    pub fn with_end_of_generation_hook(mut self, hook: EndOfGenerationFn) -> Self {
        self.end_of_generation = Some(hook);
        self
    }

    pub fn stats(&self) -> &EvolutionStats {
        &self.stats
    }

    /// Run the configured number of generations starting from the given
    /// record sets and return the final generation, scored and sorted.
    pub async fn evolve_for_x_generations(
        &mut self,
        starting_records: Vec<NodeRecords>,
    ) -> EvolutionResult<ScoredNodeRecords> {
        if starting_records.is_empty() {
            return Err(EvolutionError::EmptyPopulation(
                "no starting records supplied".to_string(),
            ));
        }

        let mutation_props = MutationProperties {
            mutations: self.props.mutation_sequence.clone(),
            activation_ids: self.registry.activation_ids(),
            sync_ids: self.registry.sync_ids(),
            output_hook_ids: self.registry.output_hook_ids(),
            learning_algorithm: self.props.neuron_learning_algorithm,
        };

        let mut survivors: Vec<(NetworkId, NodeRecords)> = starting_records
            .into_iter()
            .enumerate()
            .map(|(slot, records)| (slot as NetworkId, records))
            .collect();
        let mut scored: ScoredNodeRecords = Vec::new();

        for generation in 0..self.props.generations {
            let population = evolve_generation(
                &survivors,
                self.props.maximum_minds,
                &mutation_props,
            )?;
            scored = self.run_generation(population).await?;

            if let Some(hook) = &self.end_of_generation {
                hook(&scored);
            }

            self.stats.generations_run += 1;
            let best = scored.first().map(|(_, (score, _))| *score);
            if let Some(best) = best {
                self.stats.record_score(best);
            }
            info!(
                "[SCHEDULER] Generation {}/{} complete: population {}, best score {:?}",
                generation + 1,
                self.props.generations,
                scored.len(),
                best
            );

            survivors = select_survivors(scored.clone(), self.props.divide_population_by);
        }

        info!(
            "[SCHEDULER] Evolution finished after {} generations, {} networks evaluated",
            self.stats.generations_run, self.stats.networks_evaluated
        );
        Ok(scored)
    }

    /// Materialise, drive and tear down one generation.
    async fn run_generation(
        &mut self,
        population: Vec<(NetworkId, NodeRecords)>,
    ) -> EvolutionResult<ScoredNodeRecords> {
        let mut live: Vec<LiveNetwork> = Vec::with_capacity(population.len());
        for (id, records) in population {
            let keeper = ScoreKeeperHandle::spawn(id, self.fitness.clone());
            let bindings = self.registry.bind(id, &keeper);
            let cortex =
                Cortex::construct(id, records, &bindings, self.props.think_timeout()).await?;
            live.push(LiveNetwork {
                id,
                cortex,
                keeper,
                score: 0.0,
            });
        }

        let mut end_generation = false;
        for cycle in 0..self.props.maximum_think_cycles {
            if end_generation {
                debug!(
                    "[SCHEDULER] Generation ended early at think cycle {}",
                    cycle
                );
                break;
            }

            if self.props.asynchronous_scoring {
                let outcomes =
                    join_all(live.iter_mut().map(|net| net.cortex.think_and_act())).await;
                for outcome in outcomes {
                    self.stats.note_cycle(outcome?);
                }
            } else {
                for net in live.iter_mut() {
                    let outcome = net.cortex.think_and_act().await?;
                    self.stats.note_cycle(outcome);
                }
            }

            for net in live.iter_mut() {
                let (score, directive) = net.keeper.get_score().await?;
                net.score += score;
                if directive == FitnessDirective::EndGeneration {
                    end_generation = true;
                }
            }
        }

        let mut scored: ScoredNodeRecords = Vec::with_capacity(live.len());
        for net in live {
            let records = net.cortex.kill().await?;
            net.keeper.kill().await?;
            self.stats.networks_evaluated += 1;
            scored.push((net.id, (net.score, records)));
        }
        sort_by_score(&mut scored);
        Ok(scored)
    }
}

/// Produce a fresh generation of `maximum_minds` record sets by rotating
/// the survivor list and mutating once per slot. Network ids are dense from
/// zero.
fn evolve_generation(
    survivors: &[(NetworkId, NodeRecords)],
    maximum_minds: usize,
    mutation_props: &MutationProperties,
) -> EvolutionResult<Vec<(NetworkId, NodeRecords)>> {
    if survivors.is_empty() {
        return Err(EvolutionError::EmptyPopulation(
            "no survivors to evolve from".to_string(),
        ));
    }

    let mut population = Vec::with_capacity(maximum_minds);
    for slot in 0..maximum_minds {
        let (_, parent) = &survivors[slot % survivors.len()];
        let child = mutate_records(parent, mutation_props)?;
        population.push((slot as NetworkId, child));
    }
    Ok(population)
}

/// Sort descending by score, chunk into blocks of
/// `max(ceil(population / divisor), 2)` and keep the first block.
pub fn select_survivors(
    mut scored: ScoredNodeRecords,
    divide_population_by: usize,
) -> Vec<(NetworkId, NodeRecords)> {
    sort_by_score(&mut scored);
    let divisor = divide_population_by.max(1);
    let block = scored.len().div_ceil(divisor).max(2);
    scored.truncate(block);
    scored
        .into_iter()
        .map(|(id, (_, records))| (id, records))
        .collect()
}

fn sort_by_score(scored: &mut ScoredNodeRecords) {
    scored.sort_by(|a, b| {
        b.1 .0
            .partial_cmp(&a.1 .0)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
