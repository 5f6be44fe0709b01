// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types and error handling for NEVA evolution.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use neva_genome::GenomeError;
use neva_substrate::SubstrateError;
use thiserror::Error;

/// Result type for evolution operations
pub type EvolutionResult<T> = Result<T, EvolutionError>;

/// Error types for evolution operations
#[derive(Error, Debug)]
pub enum EvolutionError {
    #[error("Substrate error: {0}")]
    Substrate(#[from] SubstrateError),

    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    /// A mutation hit a record shape it must never see. This is an
    /// invariant violation, not a failed precondition, so it aborts the
    /// whole mutation pass.
    #[error("Invalid mutation: {0}")]
    InvalidMutation(String),

    #[error("Empty population: {0}")]
    EmptyPopulation(String),
}
