// dwh-core/src/lib.rs

#![allow(missing_docs)]
// 1. Memory safety
#![deny(unsafe_code)]
// 2. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 3. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (async seams: database connector, cloud control planes, clock)
pub mod ports;

// 2. Domain (configuration model, provisioning state machine, warehouse schema)
// Depends on nothing but itself.
pub mod domain;

// 3. Infrastructure (AWS SDK adapters, sqlx/DuckDB connectors, YAML config, Jinja)
pub mod infrastructure;

// 4. Application (use cases: provisioning, ELT, inspection)
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::DwhError;
