// dwh-core/src/application/provisioning.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::application::role::resolve_role;
use crate::application::wait::{WaitPolicy, wait_until_available};
use crate::domain::cluster::{ClusterDescriptor, ClusterOutputs, ClusterRequest, IngressRule};
use crate::domain::config::{ClusterConfig, DWH_SECTION, ENDPOINT_OPTION, ROLE_ARN_OPTION};
use crate::domain::error::DomainError;
use crate::domain::ports::{ConfigStore, PersistOutcome};
use crate::domain::provisioning::{ProvisioningPhase, ProvisioningState};
use crate::error::DwhError;
use crate::ports::clock::Clock;
use crate::ports::cloud::{ClusterControlPlane, NetworkControlPlane, RoleStore};

/// The outside world of one provisioning run.
pub struct ProvisioningServices<'a> {
    pub roles: &'a dyn RoleStore,
    pub clusters: &'a dyn ClusterControlPlane,
    pub network: &'a dyn NetworkControlPlane,
    pub store: &'a dyn ConfigStore,
    pub clock: &'a dyn Clock,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    pub success: bool,
    pub phase: ProvisioningPhase,
    /// Phase the run was in when it aborted.
    pub stopped_in: Option<ProvisioningPhase>,
    pub outputs: Option<ClusterOutputs>,
    pub warnings: Vec<String>,
    pub manual_actions: Vec<String>,
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

struct Provisioner<'a> {
    config: &'a ClusterConfig,
    services: ProvisioningServices<'a>,
    policy: WaitPolicy,
    state: ProvisioningState,
    warnings: Vec<String>,
    manual_actions: Vec<String>,
}

/// Drives `Unrequested -> ... -> Persisted`; any fatal error ends in `Aborted`.
///
/// Errors never escape: they are logged and carried in the report.
#[instrument(skip_all, fields(cluster = %config.shape.identifier))]
pub async fn run_provisioning(
    config: &ClusterConfig,
    services: ProvisioningServices<'_>,
    policy: WaitPolicy,
) -> ProvisionReport {
    let mut provisioner = Provisioner {
        config,
        services,
        policy,
        state: ProvisioningState::new(),
        warnings: Vec::new(),
        manual_actions: Vec::new(),
    };

    let outcome = provisioner.drive().await;
    provisioner.into_report(outcome)
}

impl<'a> Provisioner<'a> {
    async fn drive(&mut self) -> Result<(), DwhError> {
        let role_arn = resolve_role(
            self.services.roles,
            &self.config.role_name,
            self.config.reuse.existing_role,
        )
        .await?;
        self.state.role_arn = Some(role_arn.clone());

        self.request_cluster(&role_arn).await?;
        self.await_availability().await?;

        let descriptor = self.describe().await?;
        self.configure_network(&descriptor).await?;

        let outputs = ClusterOutputs::from_descriptor(&descriptor)?;
        self.state.cluster = Some(descriptor);
        self.persist_outputs(&outputs)?;
        self.state.outputs = Some(outputs);
        Ok(())
    }

    // --- Unrequested -> Requested ---

    async fn request_cluster(&mut self, role_arn: &str) -> Result<(), DwhError> {
        let shape = &self.config.shape;
        let db = &self.config.database;
        let request = ClusterRequest {
            identifier: shape.identifier.clone(),
            cluster_type: shape.cluster_type,
            node_type: shape.node_type.clone(),
            num_nodes: shape.num_nodes,
            db_name: db.name.clone(),
            master_username: db.user.clone(),
            master_password: db.password.clone(),
            port: db.port,
            iam_role_arn: role_arn.to_string(),
        };

        println!(
            "🚀 Requesting {} cluster '{}' ({} x {})...",
            shape.cluster_type.as_str(),
            shape.identifier,
            shape.num_nodes,
            shape.node_type
        );
        self.services.clusters.create_cluster(&request).await?;
        self.state.advance(ProvisioningPhase::Requested)?;
        Ok(())
    }

    // --- Requested -> Available ---

    async fn await_availability(&mut self) -> Result<(), DwhError> {
        println!("⏳ Waiting for the cluster to become available...");
        let descriptor = wait_until_available(
            self.services.clusters,
            self.services.clock,
            &self.config.shape.identifier,
            &self.policy,
        )
        .await?;
        self.state.cluster = Some(descriptor);
        self.state.advance(ProvisioningPhase::Available)?;
        println!("✅ Cluster ready");
        Ok(())
    }

    async fn describe(&mut self) -> Result<ClusterDescriptor, DwhError> {
        let identifier = &self.config.shape.identifier;
        match self.services.clusters.describe_cluster(identifier).await {
            Ok(Some(descriptor)) => Ok(descriptor),
            Ok(None) => Err(DomainError::ClusterMissing(identifier.clone()).into()),
            Err(e) if e.is_not_found() => {
                Err(DomainError::ClusterMissing(identifier.clone()).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    // --- Available -> NetworkConfigured ---

    async fn configure_network(&mut self, descriptor: &ClusterDescriptor) -> Result<(), DwhError> {
        println!("🌐 Setting up network access to the cluster...");
        let rule = IngressRule::tcp(&self.config.caller_cidr, self.config.database.port);

        match self.authorize(descriptor, &rule).await {
            Ok(()) => println!("✅ Network settings complete"),
            Err(DwhError::Provider(e)) if e.is_duplicate_permission() => {
                if !self.config.reuse.existing_network_rule {
                    return Err(DomainError::NetworkRuleConflict {
                        cidr: rule.cidr,
                        port: rule.port,
                    }
                    .into());
                }
                println!("♻️  Ingress rule for {} already exists, reusing it.", rule.cidr);
            }
            Err(e) => {
                warn!("Network access was not configured: {}", e);
                self.warnings.push(format!("network access not configured: {}", e));
            }
        }

        self.state.advance(ProvisioningPhase::NetworkConfigured)?;
        Ok(())
    }

    async fn authorize(
        &self,
        descriptor: &ClusterDescriptor,
        rule: &IngressRule,
    ) -> Result<(), DwhError> {
        let vpc_id = descriptor
            .vpc_id
            .as_deref()
            .ok_or_else(|| DwhError::InternalError("cluster reports no VPC id".into()))?;

        let groups = self.services.network.security_groups(vpc_id).await?;
        let group = groups.first().ok_or_else(|| {
            DwhError::InternalError(format!("no security group found in {}", vpc_id))
        })?;

        info!(group = %group.id, cidr = %rule.cidr, port = rule.port, "Authorizing ingress");
        self.services.network.authorize_ingress(group, rule).await?;
        Ok(())
    }

    // --- NetworkConfigured -> Persisted ---

    fn persist_outputs(&mut self, outputs: &ClusterOutputs) -> Result<(), DwhError> {
        for (option, value) in [
            (ENDPOINT_OPTION, outputs.endpoint.as_str()),
            (ROLE_ARN_OPTION, outputs.role_arn.as_str()),
        ] {
            match self.services.store.persist_option(DWH_SECTION, option, value)? {
                PersistOutcome::Written => info!(option, "Saved to the configuration file"),
                PersistOutcome::AlreadyPresent { existing } => {
                    println!("⚠️  An option with the same name already exists ('{}').", existing);
                    println!("   Please enter this value into your config file manually:");
                    println!("   Section: {}", DWH_SECTION);
                    println!("   Option: {}, Value: {}", option, value);
                    self.manual_actions.push(format!(
                        "set {}.{} to '{}' (currently '{}')",
                        DWH_SECTION, option, value, existing
                    ));
                }
            }
        }
        self.state.advance(ProvisioningPhase::Persisted)?;
        Ok(())
    }

    fn into_report(mut self, outcome: Result<(), DwhError>) -> ProvisionReport {
        let (stopped_in, error) = match outcome {
            Ok(()) => (None, None),
            Err(e) => {
                error!("Provisioning aborted: {}", e);
                eprintln!("❌ {}", e);
                (Some(self.state.abort()), Some(e.to_string()))
            }
        };

        ProvisionReport {
            success: error.is_none(),
            phase: self.state.phase(),
            stopped_in,
            outputs: self.state.outputs.take(),
            warnings: self.warnings,
            manual_actions: self.manual_actions,
            error,
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::fakes::{
        CLUSTER_ROLE_ARN, ENDPOINT, FakeClock, FakeClusterPlane, FakeConfigStore,
        FakeNetworkPlane, FakeRoleStore,
    };
    use crate::domain::cluster::SecurityGroup;
    use crate::domain::config::tests::sample;
    use crate::domain::config::{ClusterType, ReuseFlags};
    use crate::domain::error::ProviderError;
    use anyhow::Result;

    fn config(reuse: ReuseFlags) -> ClusterConfig {
        ClusterConfig::from_document(&sample(), reuse).unwrap()
    }

    struct World {
        roles: FakeRoleStore,
        clusters: FakeClusterPlane,
        network: FakeNetworkPlane,
        store: FakeConfigStore,
        clock: FakeClock,
    }

    impl World {
        fn new() -> Self {
            Self {
                roles: FakeRoleStore::empty(),
                clusters: FakeClusterPlane::comes_up(),
                network: FakeNetworkPlane::with_default_group(),
                store: FakeConfigStore::default(),
                clock: FakeClock::new(),
            }
        }

        async fn run(&self, reuse: ReuseFlags) -> ProvisionReport {
            let services = ProvisioningServices {
                roles: &self.roles,
                clusters: &self.clusters,
                network: &self.network,
                store: &self.store,
                clock: &self.clock,
            };
            run_provisioning(&config(reuse), services, WaitPolicy::default()).await
        }
    }

    #[tokio::test]
    async fn test_happy_path_persists_descriptor_fields() -> Result<()> {
        let world = World::new();
        let report = world.run(ReuseFlags::default()).await;

        assert!(report.success, "{:?}", report.error);
        assert_eq!(report.phase, ProvisioningPhase::Persisted);
        assert_eq!(world.store.get("DWH", "dwh_endpoint").as_deref(), Some(ENDPOINT));
        assert_eq!(
            world.store.get("DWH", "dwh_s3_iam_arn").as_deref(),
            Some(CLUSTER_ROLE_ARN)
        );

        let requests = world.clusters.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].cluster_type, ClusterType::MultiNode);
        assert_eq!(requests[0].num_nodes, 4);
        assert_eq!(requests[0].iam_role_arn, "arn:aws:iam::123456789012:role/dwhRole");

        let authorized = world.network.authorized();
        assert_eq!(authorized.len(), 1);
        assert_eq!(authorized[0].0, "sg-0123");
        assert_eq!(authorized[0].1, IngressRule::tcp("203.0.113.7/32", 5439));
        Ok(())
    }

    #[tokio::test]
    async fn test_role_conflict_aborts_before_cluster_request() {
        let mut world = World::new();
        world.roles = FakeRoleStore::existing("arn:aws:iam::123456789012:role/legacy");

        let report = world.run(ReuseFlags::default()).await;

        assert!(!report.success);
        assert_eq!(report.phase, ProvisioningPhase::Aborted);
        assert_eq!(report.stopped_in, Some(ProvisioningPhase::Unrequested));
        assert!(world.clusters.requests().is_empty());
        assert_eq!(world.store.len(), 0);
    }

    #[tokio::test]
    async fn test_create_rejection_aborts() {
        let mut world = World::new();
        world.clusters.create_failure =
            Some(ProviderError::rejected("CreateCluster", "ClusterAlreadyExists"));

        let report = world.run(ReuseFlags::default()).await;

        assert!(!report.success);
        assert!(report.error.unwrap().contains("ClusterAlreadyExists"));
        assert_eq!(world.clusters.describe_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_rule_with_reuse_reaches_persistence() {
        let mut world = World::new();
        world.network = FakeNetworkPlane::duplicate_rule();

        let report = world
            .run(ReuseFlags {
                existing_network_rule: true,
                ..ReuseFlags::default()
            })
            .await;

        assert!(report.success, "{:?}", report.error);
        assert_eq!(world.store.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_rule_without_reuse_is_fatal() {
        let mut world = World::new();
        world.network = FakeNetworkPlane::duplicate_rule();

        let report = world.run(ReuseFlags::default()).await;

        assert!(!report.success);
        assert_eq!(report.stopped_in, Some(ProvisioningPhase::Available));
        assert_eq!(world.store.len(), 0);
    }

    #[tokio::test]
    async fn test_other_network_errors_are_warnings() {
        let mut world = World::new();
        world.network.groups = Ok(Vec::<SecurityGroup>::new());

        let report = world.run(ReuseFlags::default()).await;

        assert!(report.success, "{:?}", report.error);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("no security group"));
        assert_eq!(world.store.len(), 2);
    }

    #[tokio::test]
    async fn test_existing_outputs_are_never_overwritten() {
        let mut world = World::new();
        world.store = FakeConfigStore::with("DWH", "dwh_endpoint", "old.example.com");

        let report = world.run(ReuseFlags::default()).await;

        assert!(report.success);
        assert_eq!(
            world.store.get("DWH", "dwh_endpoint").as_deref(),
            Some("old.example.com")
        );
        assert_eq!(report.manual_actions.len(), 1);
        assert!(report.manual_actions[0].contains(ENDPOINT));
    }

    #[tokio::test]
    async fn test_cluster_gone_after_wait_persists_nothing() {
        let mut world = World::new();
        world.clusters = FakeClusterPlane::scripted(vec![Ok(Some(
            crate::application::fakes::descriptor(crate::domain::cluster::ClusterStatus::Available),
        ))]);

        let report = world.run(ReuseFlags::default()).await;

        assert!(!report.success);
        assert_eq!(report.stopped_in, Some(ProvisioningPhase::Available));
        assert!(world.network.authorized().is_empty());
        assert_eq!(world.store.len(), 0);
    }
}
