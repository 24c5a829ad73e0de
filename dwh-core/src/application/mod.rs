// dwh-core/src/application/mod.rs

pub mod engine;
pub mod etl;
pub mod inspect;
pub mod ports;
pub mod provisioning;
pub mod role;
pub mod statements;
pub mod wait;

#[cfg(test)]
pub(crate) mod fakes;

// --- RE-EXPORTS (FACADE) ---
// The CLI only needs `use dwh_core::application::{run_provisioning, run_etl, ...}`.

pub use engine::execute_query;
pub use etl::{EltPhase, EtlReport, run_etl};
pub use inspect::{InspectionReport, inspect_warehouse};
pub use provisioning::{ProvisionReport, ProvisioningServices, run_provisioning};
pub use role::resolve_role;
pub use statements::StatementPlan;
pub use wait::{WaitPolicy, wait_until_available};
