// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types and error handling for the NEVA substrate.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use neva_types::{FunctionId, NetworkId, NodeId};
use thiserror::Error;

/// Result type for substrate operations
pub type SubstrateResult<T> = Result<T, SubstrateError>;

/// Error types for substrate operations
#[derive(Error, Debug)]
pub enum SubstrateError {
    #[error("Invalid records: {0}")]
    InvalidRecords(String),

    #[error("Missing {kind} function '{id}' in network bindings")]
    MissingFunction { kind: &'static str, id: FunctionId },

    #[error("Mailbox of node {0} is closed")]
    MailboxClosed(NodeId),

    #[error("Score keeper for network {0} is gone")]
    ScoreKeeperGone(NetworkId),

    #[error("Reply channel dropped while waiting on node {0}")]
    ReplyDropped(NodeId),
}
