// dwh-core/src/ports/mod.rs

pub mod clock;
pub mod cloud;
pub mod connector;

pub use clock::Clock;
pub use cloud::{ClusterControlPlane, NetworkControlPlane, RoleStore};
pub use connector::{ConnectionFactory, Connector};
