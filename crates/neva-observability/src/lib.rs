// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization for NEVA
//!
//! Provides console logging with env-filter control and optional per-run
//! file logging.

pub mod init;

pub use init::{init_logging, LoggingGuard};
