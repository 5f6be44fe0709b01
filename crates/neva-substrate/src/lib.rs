// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # NEVA Substrate
//!
//! The live embodiment of a record-form network: a message-passing graph of
//! sensor, neuron and actuator actors that cooperatively computes one
//! activation wave per think cycle.
//!
//! ## Architecture
//! - One tokio task per node, one unbounded mailbox per task
//! - Barrier semantics: a node fires only after collecting exactly one
//!   synapse per inbound edge, which turns an asynchronous actor soup into
//!   a discrete synchronous wave
//! - The cortex owns construction, think-cycle drive and teardown; teardown
//!   converts every actor back into its record
//! - One score keeper per live network aggregates actuator outputs for the
//!   caller's fitness function
//!
//! Records stay data-only: activation functions, sync functions and output
//! hooks are resolved through caller-supplied registries at construction.

pub mod actuator;
pub mod cortex;
pub mod message;
pub mod neuron;
pub mod registry;
pub mod score_keeper;
pub mod sensor;
pub mod types;

pub use cortex::{Cortex, ThinkCycleOutcome};
pub use message::{NodeHandle, NodeSignal, OutboundEdge, Synapse};
pub use registry::{
    ActivationFn, FunctionRegistry, NetworkBindings, OutputHookFn, SyncFn, SyncFunctionSource,
};
pub use score_keeper::{FitnessDirective, FitnessFn, ScoreKeeperHandle};
pub use types::{SubstrateError, SubstrateResult};
