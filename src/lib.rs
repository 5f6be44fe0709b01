// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # NEVA - Neuroevolution Engine
//!
//! NEVA evolves populations of artificial neural networks by mutating their
//! topology and weights, materialising each candidate as a message-passing
//! actor graph, scoring it against a caller-supplied task, and repeating.
//! Networks are genetic-algorithm candidates, not gradient-descent models:
//! fitness is measured by driving think cycles and observing actuator
//! outputs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: neva-types                                 │
//! │  (NodeId, NetworkId, id allocation)                     │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Genotype: neva-genome                                  │
//! │  (Record form, validation, JSON I/O, templates)         │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Phenotype: neva-substrate                              │
//! │  (Node actors, cortex, score keeper, registries)        │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Driver: neva-evolution                                 │
//! │  (Mutation engine, scheduler, live evolution)           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use neva::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(FunctionRegistry::with_standard_activations());
//! registry.register_sync_source(
//!     "feed".to_string(),
//!     Arc::new(|_network| Arc::new(|| vec![0.5, 0.25]) as SyncFn),
//! );
//! registry.register_output_hook_id("emit".to_string());
//!
//! let fitness: FitnessFn = Arc::new(|_network, outputs| {
//!     let total: f64 = outputs.values().sum();
//!     (total, FitnessDirective::ContinueGeneration)
//! });
//!
//! let seed = create_seed_records(
//!     &IdAllocator::new(),
//!     "tanh".to_string(),
//!     "feed".to_string(),
//!     "emit".to_string(),
//! );
//!
//! let mut scheduler =
//!     GenerationScheduler::new(EvolutionProperties::default(), registry, fitness);
//! let scored = scheduler.evolve_for_x_generations(vec![seed]).await?;
//! println!("best score: {:?}", scored.first().map(|(_, (s, _))| *s));
//! # Ok(())
//! # }
//! ```

pub use neva_evolution as evolution;
pub use neva_genome as genome;
pub use neva_observability as observability;
pub use neva_substrate as substrate;
pub use neva_types as types;

/// The commonly used surface of the workspace in one import.
pub mod prelude {
    pub use neva_evolution::{
        mutate_records, EvolutionProperties, EvolutionStats, GenerationScheduler, LiveEvolution,
        LiveStatus, MutationKind, MutationProperties, ScoredNodeRecords,
    };
    pub use neva_genome::{
        create_seed_records, load_records_from_file, save_records_to_file, validate_records,
        InactiveConnection, LearningAlgorithm, NodeRecord, NodeRecordType, NodeRecords,
    };
    pub use neva_observability::init_logging;
    pub use neva_substrate::{
        Cortex, FitnessDirective, FitnessFn, FunctionRegistry, NetworkBindings, ScoreKeeperHandle,
        SyncFn, ThinkCycleOutcome,
    };
    pub use neva_types::{ConnectionId, FunctionId, IdAllocator, NetworkId, NodeId};
}
