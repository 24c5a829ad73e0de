// dwh-core/src/application/role.rs

use tracing::{info, instrument};

use crate::domain::cluster::{RoleSpec, STORAGE_READ_ONLY_POLICY_ARN};
use crate::domain::error::DomainError;
use crate::error::DwhError;
use crate::ports::cloud::RoleStore;

/// Returns the ARN of the role the cluster assumes to read object storage.
///
/// A fresh role gets the read-only storage policy attached. An existing role is
/// only accepted with `reuse_existing`; anything other than "already exists" is
/// fatal and not retried.
#[instrument(skip(roles))]
pub async fn resolve_role(
    roles: &dyn RoleStore,
    role_name: &str,
    reuse_existing: bool,
) -> Result<String, DwhError> {
    let spec = RoleSpec::warehouse_storage_reader(role_name);
    println!("🔑 Creating IAM role '{}'...", role_name);

    match roles.create_role(&spec).await {
        Ok(arn) => {
            roles
                .attach_policy(role_name, STORAGE_READ_ONLY_POLICY_ARN)
                .await?;
            info!(policy = STORAGE_READ_ONLY_POLICY_ARN, "Policy attached");
            Ok(arn)
        }
        Err(e) if e.is_already_exists() && reuse_existing => {
            println!("♻️  Role '{}' already exists, reusing it.", role_name);
            Ok(roles.get_role_arn(role_name).await?)
        }
        Err(e) if e.is_already_exists() => Err(DomainError::RoleConflict {
            role_name: role_name.to_string(),
        }
        .into()),
        Err(e) => Err(e.into()),
    }
}
