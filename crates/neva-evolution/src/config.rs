// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Configuration for evolution runs.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::mutation::MutationKind;
use neva_genome::LearningAlgorithm;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Knobs of one evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionProperties {
    /// Candidate networks per generation
    pub maximum_minds: usize,
    /// Think cycles driven per generation (fewer if a fitness directive
    /// ends the generation early)
    pub maximum_think_cycles: u32,
    /// Generations to run before returning
    pub generations: u32,
    /// Selection keeps the top `ceil(population / divide_population_by)`
    /// networks, never fewer than two
    pub divide_population_by: usize,
    /// Per-think-cycle timeout before a wave counts as incomplete
    pub think_timeout_ms: u64,
    /// Drive think cycles across the generation in parallel or one by one
    pub asynchronous_scoring: bool,
    /// Mutation kinds sampled when evolving a generation; duplicate entries
    /// raise a kind's probability
    pub mutation_sequence: Vec<MutationKind>,
    /// Learning mode stamped onto neurons minted by mutation
    pub neuron_learning_algorithm: LearningAlgorithm,
}

impl Default for EvolutionProperties {
    fn default() -> Self {
        Self {
            maximum_minds: 10,
            maximum_think_cycles: 100,
            generations: 10,
            divide_population_by: 2,
            think_timeout_ms: 2_000,
            asynchronous_scoring: true,
            mutation_sequence: MutationKind::standard_sequence(),
            neuron_learning_algorithm: LearningAlgorithm::NoLearning,
        }
    }
}

impl EvolutionProperties {
    pub fn think_timeout(&self) -> Duration {
        Duration::from_millis(self.think_timeout_ms)
    }
}
