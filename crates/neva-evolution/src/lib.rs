// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# NEVA Evolution

The evolution driver over record-form networks:

- Mutation engine (topology and weight edits, sampled per pass)
- Generation scheduler (evolve, materialise, drive, score, select)
- Live evolution variant (one cortex at a time, caller-paced)

## Architecture

This crate owns the **genotype-to-genotype** loop. It edits records with
the mutation engine, hands them to `neva-substrate` to run, and folds the
scores back into selection. Records never change while their live network
exists; all edits happen between lives.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

pub mod config;
pub mod live;
pub mod mutation;
pub mod random;
pub mod scheduler;
pub mod types;

pub use config::EvolutionProperties;
pub use live::{FitPopulationSelector, LiveEvolution, LiveStatus};
pub use mutation::{mutate_records, MutationKind, MutationProperties};
pub use scheduler::{
    select_survivors, EndOfGenerationFn, GenerationScheduler, ScoredNodeRecords,
};
pub use types::{EvolutionError, EvolutionResult};

use neva_substrate::ThinkCycleOutcome;

/// Aggregate statistics of one evolution run
#[derive(Debug, Clone, Default)]
pub struct EvolutionStats {
    pub generations_run: u64,
    pub networks_evaluated: u64,
    pub think_cycles_driven: u64,
    pub incomplete_cycles: u64,
    pub best_score: Option<f64>,
}

impl EvolutionStats {
    /// Count one driven think cycle. Incomplete waves count as driven.
    pub fn note_cycle(&mut self, outcome: ThinkCycleOutcome) {
        self.think_cycles_driven += 1;
        if outcome == ThinkCycleOutcome::Incomplete {
            self.incomplete_cycles += 1;
        }
    }

    /// Track the best score seen across the whole run.
    pub fn record_score(&mut self, score: f64) {
        match self.best_score {
            Some(best) if best >= score => {}
            _ => self.best_score = Some(score),
        }
    }

    /// Get average think cycles per evaluated network
    pub fn avg_cycles_per_network(&self) -> f64 {
        if self.networks_evaluated == 0 {
            0.0
        } else {
            self.think_cycles_driven as f64 / self.networks_evaluated as f64
        }
    }

    /// Get the fraction of think cycles that timed out
    pub fn incomplete_cycle_ratio(&self) -> f64 {
        if self.think_cycles_driven == 0 {
            0.0
        } else {
            self.incomplete_cycles as f64 / self.think_cycles_driven as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evolution_stats() {
        let mut stats = EvolutionStats::default();
        for _ in 0..8 {
            stats.note_cycle(ThinkCycleOutcome::Finished);
        }
        stats.note_cycle(ThinkCycleOutcome::Incomplete);
        stats.note_cycle(ThinkCycleOutcome::Incomplete);
        stats.networks_evaluated = 5;

        assert_eq!(stats.think_cycles_driven, 10);
        assert_eq!(stats.incomplete_cycles, 2);
        assert_eq!(stats.avg_cycles_per_network(), 2.0);
        assert_eq!(stats.incomplete_cycle_ratio(), 0.2);
    }

    #[test]
    fn test_best_score_keeps_the_maximum() {
        let mut stats = EvolutionStats::default();
        assert_eq!(stats.best_score, None);
        stats.record_score(1.0);
        stats.record_score(0.5);
        stats.record_score(2.0);
        assert_eq!(stats.best_score, Some(2.0));
    }
}
