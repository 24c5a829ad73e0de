// dwh/src/commands/provision.rs
//
// USE CASE: Create the IAM role, the cluster and the ingress rule, then hand
// the endpoint and role ARN over to `dwh etl` through the configuration file.

use std::path::PathBuf;

use dwh_core::application::{ProvisioningServices, WaitPolicy, run_provisioning};
use dwh_core::domain::config::{ClusterConfig, ReuseFlags};
use dwh_core::infrastructure::adapters::aws::AwsClients;
use dwh_core::infrastructure::adapters::ec2::Ec2NetworkControlPlane;
use dwh_core::infrastructure::adapters::iam::IamRoleStore;
use dwh_core::infrastructure::adapters::redshift::RedshiftControlPlane;
use dwh_core::infrastructure::clock::SystemClock;
use dwh_core::infrastructure::config::YamlConfigStore;

pub async fn execute(
    config_path: PathBuf,
    reuse: ReuseFlags,
    policy: WaitPolicy,
) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Config (fails before any AWS client exists)
    let document = super::load(&config_path)?;
    let config = ClusterConfig::from_document(&document, reuse).map_err(super::diagnose)?;

    // B. Adapters
    let clients = AwsClients::from_credentials(&config.credentials).await;
    let roles = IamRoleStore::new(clients.iam);
    let clusters = RedshiftControlPlane::new(clients.redshift);
    let network = Ec2NetworkControlPlane::new(clients.ec2);
    let store = YamlConfigStore::new(&config_path);
    let clock = SystemClock;

    // C. Workflow
    let services = ProvisioningServices {
        roles: &roles,
        clusters: &clusters,
        network: &network,
        store: &store,
        clock: &clock,
    };
    let report = run_provisioning(&config, services, policy).await;

    for warning in &report.warnings {
        eprintln!("⚠️  {}", warning);
    }

    if !report.success {
        eprintln!(
            "\n❌ FAILURE. Provisioning stopped in phase {:?}: {}",
            report.stopped_in.unwrap_or(report.phase),
            report.error.as_deref().unwrap_or("unknown error")
        );
        std::process::exit(1);
    }

    if let Some(outputs) = &report.outputs {
        println!("   Endpoint: {}", outputs.endpoint);
        println!("   Role ARN: {}", outputs.role_arn);
    }
    if !report.manual_actions.is_empty() {
        println!("\n📝 {} value(s) to copy by hand:", report.manual_actions.len());
        for action in &report.manual_actions {
            println!("   ➜ {}", action);
        }
    }
    println!(
        "\n✨ SUCCESS! Cluster provisioned in {:.2?}",
        start.elapsed()
    );
    Ok(())
}
