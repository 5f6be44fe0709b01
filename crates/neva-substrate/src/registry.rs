// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Caller-supplied function tables.

Records stay data-only: they carry function *ids*, and the code those ids
name lives here. The registry holds the process-wide tables; binding it to
one network resolves sync sources against that network's id and wraps
output hook ids into closures over the network's score keeper.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::score_keeper::ScoreKeeperHandle;
use ahash::AHashMap;
use neva_types::{FunctionId, NetworkId};
use parking_lot::RwLock;
use std::sync::Arc;

/// Neuron activation function.
pub type ActivationFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Sensor input function, already bound to one network.
pub type SyncFn = Arc<dyn Fn() -> Vec<f64> + Send + Sync>;

/// Factory producing a [`SyncFn`] for a given network, so every candidate
/// in a generation can read its own slice of the task data.
pub type SyncFunctionSource = Arc<dyn Fn(NetworkId) -> SyncFn + Send + Sync>;

/// Actuator output hook, invoked once per completed barrier.
pub type OutputHookFn = Arc<dyn Fn(f64) + Send + Sync>;

/// Process-wide function tables, shared across all generations.
#[derive(Default)]
pub struct FunctionRegistry {
    activations: RwLock<AHashMap<FunctionId, ActivationFn>>,
    sync_sources: RwLock<AHashMap<FunctionId, SyncFunctionSource>>,
    output_hook_ids: RwLock<Vec<FunctionId>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the standard activation functions:
    /// `identity`, `tanh`, `sigmoid` and `sin`.
    pub fn with_standard_activations() -> Self {
        let registry = Self::new();
        registry.register_activation("identity".to_string(), Arc::new(|x| x));
        registry.register_activation("tanh".to_string(), Arc::new(f64::tanh));
        registry.register_activation(
            "sigmoid".to_string(),
            Arc::new(|x: f64| 1.0 / (1.0 + (-x).exp())),
        );
        registry.register_activation("sin".to_string(), Arc::new(f64::sin));
        registry
    }

    pub fn register_activation(&self, id: FunctionId, f: ActivationFn) {
        self.activations.write().insert(id, f);
    }

    pub fn register_sync_source(&self, id: FunctionId, source: SyncFunctionSource) {
        self.sync_sources.write().insert(id, source);
    }

    /// Declare an output hook id. The hook body is always a wrapper over a
    /// score keeper, minted at bind time.
    pub fn register_output_hook_id(&self, id: FunctionId) {
        let mut ids = self.output_hook_ids.write();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    pub fn activation(&self, id: &FunctionId) -> Option<ActivationFn> {
        self.activations.read().get(id).cloned()
    }

    pub fn sync_source(&self, id: &FunctionId) -> Option<SyncFunctionSource> {
        self.sync_sources.read().get(id).cloned()
    }

    /// Registered activation ids, sorted. The mutation engine draws new
    /// activation assignments from this set.
    pub fn activation_ids(&self) -> Vec<FunctionId> {
        let mut ids: Vec<FunctionId> = self.activations.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Registered sync source ids, sorted. Bounds how many sensors a
    /// network can grow.
    pub fn sync_ids(&self) -> Vec<FunctionId> {
        let mut ids: Vec<FunctionId> = self.sync_sources.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Registered output hook ids, sorted. Bounds how many actuators a
    /// network can grow.
    pub fn output_hook_ids(&self) -> Vec<FunctionId> {
        let mut ids = self.output_hook_ids.read().clone();
        ids.sort();
        ids
    }

    /// Resolve the tables for one network: activations are shared, sync
    /// functions are bound to the network id, and every output hook id
    /// becomes a closure gathering into the network's score keeper.
    pub fn bind(&self, network_id: NetworkId, keeper: &ScoreKeeperHandle) -> NetworkBindings {
        let mut bindings = NetworkBindings::new();

        for (id, f) in self.activations.read().iter() {
            bindings.activations.insert(id.clone(), f.clone());
        }
        for (id, source) in self.sync_sources.read().iter() {
            bindings.sync_functions.insert(id.clone(), source(network_id));
        }
        for id in self.output_hook_ids.read().iter() {
            let hook_id = id.clone();
            let keeper = keeper.clone();
            bindings.output_hooks.insert(
                id.clone(),
                Arc::new(move |value| keeper.gather(hook_id.clone(), value)),
            );
        }

        bindings
    }
}

/// Function tables resolved for one live network, consumed by the cortex
/// constructor.
#[derive(Default, Clone)]
pub struct NetworkBindings {
    pub activations: AHashMap<FunctionId, ActivationFn>,
    pub sync_functions: AHashMap<FunctionId, SyncFn>,
    pub output_hooks: AHashMap<FunctionId, OutputHookFn>,
}

impl NetworkBindings {
    pub fn new() -> Self {
        Self::default()
    }
}
