// dwh-core/src/application/fakes.rs
//
// Hand-written port doubles recording every call, shared by the use-case tests.

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::domain::cluster::{
    ClusterDescriptor, ClusterRequest, ClusterStatus, IngressRule, RoleSpec, SecurityGroup,
};
use crate::domain::error::ProviderError;
use crate::domain::ports::{ConfigStore, PersistOutcome};
use crate::error::DwhError;
use crate::ports::clock::Clock;
use crate::ports::cloud::{ClusterControlPlane, NetworkControlPlane, RoleStore};
use crate::ports::connector::{ConnectionFactory, Connector};

pub(crate) const ENDPOINT: &str = "dwhcluster.abc123.us-west-2.redshift.amazonaws.com";
pub(crate) const CLUSTER_ROLE_ARN: &str = "arn:aws:iam::123456789012:role/dwhRole";

pub(crate) fn descriptor(status: ClusterStatus) -> ClusterDescriptor {
    let available = status == ClusterStatus::Available;
    ClusterDescriptor {
        identifier: "dwhcluster".into(),
        status,
        endpoint_address: available.then(|| ENDPOINT.to_string()),
        endpoint_port: available.then_some(5439),
        vpc_id: Some("vpc-0abc".into()),
        iam_role_arns: vec![CLUSTER_ROLE_ARN.to_string()],
    }
}

// --- IAM ---

pub(crate) struct FakeRoleStore {
    pub existing_arn: Option<String>,
    pub create_failure: Option<ProviderError>,
    calls: Mutex<Vec<String>>,
}

impl FakeRoleStore {
    pub fn empty() -> Self {
        Self {
            existing_arn: None,
            create_failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn existing(arn: &str) -> Self {
        Self {
            existing_arn: Some(arn.to_string()),
            ..Self::empty()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoleStore for FakeRoleStore {
    async fn create_role(&self, spec: &RoleSpec) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("create_role:{}", spec.name));
        if let Some(failure) = &self.create_failure {
            return Err(failure.clone());
        }
        if self.existing_arn.is_some() {
            return Err(ProviderError::AlreadyExists {
                operation: "CreateRole".into(),
                message: format!("Role with name {} already exists.", spec.name),
            });
        }
        Ok(format!("arn:aws:iam::123456789012:role/{}", spec.name))
    }

    async fn attach_policy(&self, role_name: &str, policy_arn: &str) -> Result<(), ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("attach_policy:{}:{}", role_name, policy_arn));
        Ok(())
    }

    async fn get_role_arn(&self, role_name: &str) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("get_role:{}", role_name));
        self.existing_arn.clone().ok_or_else(|| ProviderError::NotFound {
            operation: "GetRole".into(),
            message: role_name.to_string(),
        })
    }
}

// --- REDSHIFT ---

type DescribeAnswer = Result<Option<ClusterDescriptor>, ProviderError>;

pub(crate) struct FakeClusterPlane {
    pub create_failure: Option<ProviderError>,
    script: Mutex<VecDeque<DescribeAnswer>>,
    fallback: Mutex<Option<ClusterDescriptor>>,
    requests: Mutex<Vec<ClusterRequest>>,
    describes: Mutex<usize>,
}

impl FakeClusterPlane {
    /// Answers describe calls from `script`, then from the fallback.
    pub fn scripted(script: Vec<DescribeAnswer>) -> Self {
        Self {
            create_failure: None,
            script: Mutex::new(script.into()),
            fallback: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            describes: Mutex::new(0),
        }
    }

    /// Creating once, then available forever.
    pub fn comes_up() -> Self {
        let plane = Self::scripted(vec![Ok(Some(descriptor(ClusterStatus::Creating)))]);
        plane.set_fallback(Some(descriptor(ClusterStatus::Available)));
        plane
    }

    pub fn set_fallback(&self, d: Option<ClusterDescriptor>) {
        *self.fallback.lock().unwrap() = d;
    }

    pub fn requests(&self) -> Vec<ClusterRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn describe_count(&self) -> usize {
        *self.describes.lock().unwrap()
    }
}

#[async_trait]
impl ClusterControlPlane for FakeClusterPlane {
    async fn create_cluster(&self, request: &ClusterRequest) -> Result<(), ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.create_failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    async fn describe_cluster(
        &self,
        _identifier: &str,
    ) -> Result<Option<ClusterDescriptor>, ProviderError> {
        *self.describes.lock().unwrap() += 1;
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(answer) => answer,
            None => Ok(self.fallback.lock().unwrap().clone()),
        }
    }
}

// --- EC2 ---

pub(crate) struct FakeNetworkPlane {
    pub groups: Result<Vec<SecurityGroup>, ProviderError>,
    pub ingress_failure: Option<ProviderError>,
    authorized: Mutex<Vec<(String, IngressRule)>>,
}

impl FakeNetworkPlane {
    pub fn with_default_group() -> Self {
        Self {
            groups: Ok(vec![SecurityGroup {
                id: "sg-0123".into(),
                name: Some("default".into()),
            }]),
            ingress_failure: None,
            authorized: Mutex::new(Vec::new()),
        }
    }

    pub fn duplicate_rule() -> Self {
        Self {
            ingress_failure: Some(ProviderError::DuplicatePermission {
                operation: "AuthorizeSecurityGroupIngress".into(),
                message: "the specified rule already exists".into(),
            }),
            ..Self::with_default_group()
        }
    }

    pub fn authorized(&self) -> Vec<(String, IngressRule)> {
        self.authorized.lock().unwrap().clone()
    }
}

#[async_trait]
impl NetworkControlPlane for FakeNetworkPlane {
    async fn security_groups(&self, _vpc_id: &str) -> Result<Vec<SecurityGroup>, ProviderError> {
        self.groups.clone()
    }

    async fn authorize_ingress(
        &self,
        group: &SecurityGroup,
        rule: &IngressRule,
    ) -> Result<(), ProviderError> {
        self.authorized
            .lock()
            .unwrap()
            .push((group.id.clone(), rule.clone()));
        match &self.ingress_failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

// --- CONFIG FILE ---

#[derive(Default)]
pub(crate) struct FakeConfigStore {
    values: Mutex<HashMap<(String, String), String>>,
}

impl FakeConfigStore {
    pub fn with(section: &str, option: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .values
            .lock()
            .unwrap()
            .insert((section.into(), option.into()), value.into());
        store
    }

    pub fn get(&self, section: &str, option: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap()
            .get(&(section.to_string(), option.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }
}

impl ConfigStore for FakeConfigStore {
    fn persist_option(
        &self,
        section: &str,
        option: &str,
        value: &str,
    ) -> Result<PersistOutcome, DwhError> {
        let mut values = self.values.lock().unwrap();
        let key = (section.to_string(), option.to_string());
        if let Some(existing) = values.get(&key) {
            return Ok(PersistOutcome::AlreadyPresent {
                existing: existing.clone(),
            });
        }
        values.insert(key, value.to_string());
        Ok(PersistOutcome::Written)
    }
}

// --- CLOCK ---

/// Sleeping advances the clock instantly.
pub(crate) struct FakeClock {
    start: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
        self.sleeps.lock().unwrap().push(duration);
    }
}

// --- DATABASE ---

/// Records every statement; fails the first one containing `fail_on`.
pub(crate) struct RecordingConnector {
    queries: Arc<Mutex<Vec<String>>>,
    fail_on: Option<String>,
    scalar: u64,
}

#[async_trait]
impl Connector for RecordingConnector {
    async fn execute(&self, query: &str) -> Result<(), DwhError> {
        self.queries.lock().unwrap().push(query.to_string());
        match &self.fail_on {
            Some(needle) if query.contains(needle.as_str()) => Err(DwhError::InternalError(
                format!("relation referenced by '{}' does not exist", needle),
            )),
            _ => Ok(()),
        }
    }

    async fn query_scalar(&self, query: &str) -> Result<u64, DwhError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.scalar)
    }

    fn engine_name(&self) -> &str {
        "recording"
    }
}

#[derive(Default)]
pub(crate) struct RecordingFactory {
    pub queries: Arc<Mutex<Vec<String>>>,
    pub connects: Arc<Mutex<Vec<Option<String>>>>,
    pub fail_on: Option<String>,
    pub scalar: u64,
}

impl RecordingFactory {
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            ..Self::default()
        }
    }

    pub fn connector(&self) -> RecordingConnector {
        RecordingConnector {
            queries: Arc::clone(&self.queries),
            fail_on: self.fail_on.clone(),
            scalar: self.scalar,
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn connects(&self) -> Vec<Option<String>> {
        self.connects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConnectionFactory for RecordingFactory {
    async fn connect(&self, schema: Option<&str>) -> Result<Box<dyn Connector>, DwhError> {
        self.connects
            .lock()
            .unwrap()
            .push(schema.map(str::to_string));
        Ok(Box::new(self.connector()))
    }
}
