// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Record JSON I/O.

The record form is the serialisation-ready shape of a network; this module
wraps it in a small versioned envelope and moves it between JSON strings and
files. Serialising and deserialising a record set is a no-op on its content.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::records::NodeRecords;
use crate::types::{GenomeError, GenomeResult};
use crate::validator::validate_records;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Version tag written into every persisted record file.
pub const RECORD_FORMAT_VERSION: &str = "1.0";

/// On-disk envelope around a record set.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordFile {
    version: String,
    records: NodeRecords,
}

/// Serialise a record set to a pretty-printed JSON string.
pub fn save_records_to_json(records: &NodeRecords) -> GenomeResult<String> {
    let file = RecordFile {
        version: RECORD_FORMAT_VERSION.to_string(),
        records: records.clone(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Parse a record set from a JSON string produced by
/// [`save_records_to_json`].
pub fn load_records_from_json(json: &str) -> GenomeResult<NodeRecords> {
    let file: RecordFile = serde_json::from_str(json)?;

    if file.version != RECORD_FORMAT_VERSION {
        return Err(GenomeError::UnsupportedVersion(file.version));
    }

    let validation = validate_records(&file.records);
    if !validation.valid {
        return Err(GenomeError::ValidationFailed(validation.errors.join("; ")));
    }
    for warning in &validation.warnings {
        warn!("[RECORD-IO] {}", warning);
    }

    Ok(file.records)
}

/// Write a record set to a JSON file.
pub fn save_records_to_file(records: &NodeRecords, path: impl AsRef<Path>) -> GenomeResult<()> {
    let json = save_records_to_json(records)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a record set from a JSON file.
pub fn load_records_from_file(path: impl AsRef<Path>) -> GenomeResult<NodeRecords> {
    let json = std::fs::read_to_string(path)?;
    load_records_from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{InactiveConnection, NodeRecord};
    use neva_types::NodeId;

    fn sample_records() -> NodeRecords {
        let mut records = NodeRecords::new();
        let mut sensor = NodeRecord::sensor(NodeId(0), "feed".into(), Some(1));
        sensor.set_outbound_count(1);
        let mut neuron = NodeRecord::neuron(NodeId(1), 1, "tanh".into());
        neuron.bias = Some(0.25);
        neuron.add_inbound(InactiveConnection {
            connection_order: Some(0),
            from_node: NodeId(0),
            weight: 1.5,
        });
        let mut actuator = NodeRecord::actuator(NodeId(2), 2, "emit".into());
        actuator.add_inbound(InactiveConnection {
            connection_order: None,
            from_node: NodeId(1),
            weight: 1.0,
        });
        records.insert(NodeId(0), sensor);
        records.insert(NodeId(1), neuron);
        records.insert(NodeId(2), actuator);
        records
    }

    #[test]
    fn test_json_roundtrip_is_identity() {
        let records = sample_records();
        let json = save_records_to_json(&records).unwrap();
        let loaded = load_records_from_json(&json).unwrap();
        assert_eq!(records, loaded);
    }

    #[test]
    fn test_file_roundtrip_is_identity() {
        let records = sample_records();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        save_records_to_file(&records, &path).unwrap();
        let loaded = load_records_from_file(&path).unwrap();
        assert_eq!(records, loaded);
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let records = sample_records();
        let json = save_records_to_json(&records)
            .unwrap()
            .replace("\"1.0\"", "\"9.9\"");
        let err = load_records_from_json(&json).unwrap_err();
        assert!(matches!(err, GenomeError::UnsupportedVersion(_)));
    }

    #[test]
    fn test_invalid_records_are_rejected_on_load() {
        let mut records = sample_records();
        records.get_mut(&NodeId(0)).unwrap().set_outbound_count(7);
        let json = save_records_to_json(&records).unwrap();
        let err = load_records_from_json(&json).unwrap_err();
        assert!(matches!(err, GenomeError::ValidationFailed(_)));
    }

    #[test]
    fn test_garbage_json_is_a_json_error() {
        let err = load_records_from_json("{not json").unwrap_err();
        assert!(matches!(err, GenomeError::JsonError(_)));
    }
}
