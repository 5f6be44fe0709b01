// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types and error handling for NEVA genome operations.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use thiserror::Error;

/// Result type for genome operations
pub type GenomeResult<T> = Result<T, GenomeError>;

/// Error types for genome operations
#[derive(Error, Debug)]
pub enum GenomeError {
    #[error("Invalid records: {0}")]
    InvalidRecords(String),

    #[error("Record validation failed: {0}")]
    ValidationFailed(String),

    #[error("Unsupported record format version: {0}")]
    UnsupportedVersion(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

// Convert from serde_json::Error
impl From<serde_json::Error> for GenomeError {
    fn from(err: serde_json::Error) -> Self {
        GenomeError::JsonError(err.to_string())
    }
}

// Convert from std::io::Error
impl From<std::io::Error> for GenomeError {
    fn from(err: std::io::Error) -> Self {
        GenomeError::IoError(err.to_string())
    }
}
