// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Shared identifier types for NEVA.

Every other crate in the workspace speaks in terms of these ids: nodes in a
network, networks in a generation, caller-registered functions, and the
opaque keys of inbound connections. Keeping them here avoids circular
dependencies between the genome (genotype) and substrate (phenotype) crates.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

pub mod id_allocator;
pub mod ids;

pub use id_allocator::IdAllocator;
pub use ids::{ConnectionId, FunctionId, NetworkId, NodeId};
