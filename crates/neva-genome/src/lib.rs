// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# NEVA Genome

The **record form** of a network: the serialisable, static description that
the mutation engine edits and the substrate materialises into live actors.

Handles all genotype concerns:

- Record data model (`NodeRecord`, `InactiveConnection`, `NodeRecords`)
- Record validation (structural invariants, with clear error messages)
- Record I/O (JSON file and string round trips)
- Seed templates (minimal starter networks)

The live embodiment of these records lives in `neva-substrate`; evolution
operators that edit them live in `neva-evolution`. Records are never mutated
while a live network built from them exists.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

pub mod io;
pub mod records;
pub mod templates;
pub mod types;
pub mod validator;

pub use io::{
    load_records_from_file, load_records_from_json, save_records_to_file, save_records_to_json,
    RECORD_FORMAT_VERSION,
};
pub use records::{
    actuator_ids, max_node_id, neuron_ids, sensor_ids, sensor_outbound_connections,
    InactiveConnection, LearningAlgorithm, NodeRecord, NodeRecordType, NodeRecords,
};
pub use templates::create_seed_records;
pub use types::{GenomeError, GenomeResult};
pub use validator::{validate_records, ValidationResult};
