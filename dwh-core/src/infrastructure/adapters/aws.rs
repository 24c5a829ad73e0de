// dwh-core/src/infrastructure/adapters/aws.rs

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use tracing::info;

use crate::domain::config::AwsCredentials;
use crate::domain::error::ProviderError;

/// Shared SDK configuration built from the static keys in the configuration file.
pub async fn sdk_config(credentials: &AwsCredentials) -> SdkConfig {
    info!(
        region = %credentials.region,
        "Creating AWS clients with the credentials from the configuration file"
    );

    let provider = Credentials::new(
        credentials.key.clone(),
        credentials.secret.clone(),
        None,
        None,
        "dwh-config",
    );

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(credentials.region.clone()))
        .credentials_provider(provider)
        .load()
        .await
}

/// One client per control plane, all sharing the same SDK configuration.
pub struct AwsClients {
    pub iam: aws_sdk_iam::Client,
    pub redshift: aws_sdk_redshift::Client,
    pub ec2: aws_sdk_ec2::Client,
}

impl AwsClients {
    pub async fn from_credentials(credentials: &AwsCredentials) -> Self {
        let config = sdk_config(credentials).await;
        Self {
            iam: aws_sdk_iam::Client::new(&config),
            redshift: aws_sdk_redshift::Client::new(&config),
            ec2: aws_sdk_ec2::Client::new(&config),
        }
    }
}

// --- ERROR CLASSIFICATION ---

/// Maps an SDK failure onto the classes the provisioning workflow branches on.
pub(crate) fn classify<E, R>(operation: &str, err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let code = err.code().map(str::to_string);
    let message = DisplayErrorContext(&err).to_string();
    provider_error(operation, code.as_deref(), message)
}

fn provider_error(operation: &str, code: Option<&str>, message: String) -> ProviderError {
    let operation = operation.to_string();
    match code {
        Some("EntityAlreadyExists") => ProviderError::AlreadyExists { operation, message },
        Some("InvalidPermission.Duplicate") => {
            ProviderError::DuplicatePermission { operation, message }
        }
        Some("NoSuchEntity") | Some("ClusterNotFound") => {
            ProviderError::NotFound { operation, message }
        }
        _ => ProviderError::Rejected { operation, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_codes() {
        let exists = provider_error("CreateRole", Some("EntityAlreadyExists"), "x".into());
        assert!(exists.is_already_exists());

        let duplicate = provider_error(
            "AuthorizeSecurityGroupIngress",
            Some("InvalidPermission.Duplicate"),
            "x".into(),
        );
        assert!(duplicate.is_duplicate_permission());

        let missing = provider_error("DescribeClusters", Some("ClusterNotFound"), "x".into());
        assert!(missing.is_not_found());
        assert_eq!(
            provider_error("CreateCluster", Some("ClusterQuotaExceeded"), "quota".into()),
            ProviderError::rejected("CreateCluster", "quota")
        );
        assert_eq!(
            provider_error("CreateCluster", None, "dispatch failure".into()),
            ProviderError::rejected("CreateCluster", "dispatch failure")
        );
    }
}
