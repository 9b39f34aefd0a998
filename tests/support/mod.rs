// ABOUTME: Shared mock collaborators for integration tests.
// ABOUTME: Records every call so ordering properties can be asserted.

#![allow(dead_code)]

use anevazo::api::{
    ApiError, AppConfiguration, BuildOps, ClusterOps, DeployRequest, DeployResponse, DnsOps,
    EnvOps, EnvRecord, LogLine, LogStream, SourceOps, StageRequest, StageResponse, StagingStatus,
    UnitManifest, WorkloadOps,
};
use anevazo::types::{AppRef, BlobId, Route, StageId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

fn remote(operation: &'static str, status: u16, message: &str) -> ApiError {
    ApiError::Status {
        operation,
        status,
        message: message.to_string(),
    }
}

/// How the mock serves a staging log stream.
pub enum LogBehavior {
    /// Yield these lines, then end the stream.
    Lines(Vec<&'static str>),
    /// Never yield and never end; only a stop signal gets rid of the tail.
    Endless,
    /// End immediately, as if the remote closed the stream.
    ClosedImmediately,
}

/// Mock of the platform API surface the push pipeline and env commands use.
pub struct MockPlatform {
    pub calls: Mutex<Vec<String>>,
    pub conflict_on_create: bool,
    /// Nth staging_status call that first reports success.
    pub staging_polls_until_success: u32,
    pub staging_failure: Option<String>,
    /// Nth app_running call that first reports ready.
    pub ready_polls_until_success: u32,
    pub route: String,
    pub log_behavior: LogBehavior,
    pub env: Mutex<EnvRecord>,
    pub env_conflicts_remaining: AtomicU32,
    staging_polls: AtomicU32,
    ready_polls: AtomicU32,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            conflict_on_create: false,
            staging_polls_until_success: 1,
            staging_failure: None,
            ready_polls_until_success: 1,
            route: "demo.example.com".to_string(),
            log_behavior: LogBehavior::Lines(vec!["fetching", "building"]),
            env: Mutex::new(EnvRecord::default()),
            env_conflicts_remaining: AtomicU32::new(0),
            staging_polls: AtomicU32::new(0),
            ready_polls: AtomicU32::new(0),
        }
    }

    pub fn recorded(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn staging_poll_count(&self) -> u32 {
        self.staging_polls.load(Ordering::SeqCst)
    }

    pub fn ready_poll_count(&self) -> u32 {
        self.ready_polls.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl WorkloadOps for MockPlatform {
    async fn app_create(&self, app: &AppRef, _config: &AppConfiguration) -> Result<(), ApiError> {
        self.record(format!("create:{}", app.name));
        if self.conflict_on_create {
            return Err(remote("application create", 409, "name already exists"));
        }
        Ok(())
    }

    async fn app_update(&self, app: &AppRef, _config: &AppConfiguration) -> Result<(), ApiError> {
        self.record(format!("update:{}", app.name));
        Ok(())
    }

    async fn app_deploy(&self, request: &DeployRequest) -> Result<DeployResponse, ApiError> {
        let stage = request
            .stage
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        self.record(format!("deploy:{}:{}", request.image, stage));
        Ok(DeployResponse {
            route: Route::new(self.route.clone()),
        })
    }

    async fn app_running(&self, _app: &AppRef) -> Result<bool, ApiError> {
        let n = self.ready_polls.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(format!("running:{n}"));
        Ok(n >= self.ready_polls_until_success)
    }

    async fn app_delete(&self, app: &AppRef) -> Result<(), ApiError> {
        self.record(format!("delete:{}", app.name));
        Ok(())
    }
}

#[async_trait]
impl SourceOps for MockPlatform {
    async fn upload(&self, _app: &AppRef, _archive: &Path) -> Result<BlobId, ApiError> {
        self.record("upload".to_string());
        Ok(BlobId::new("b1"))
    }

    async fn import_git(
        &self,
        _app: &AppRef,
        url: &str,
        revision: &str,
    ) -> Result<BlobId, ApiError> {
        self.record(format!("import:{url}@{revision}"));
        Ok(BlobId::new("b-git"))
    }
}

#[async_trait]
impl BuildOps for MockPlatform {
    async fn app_stage(&self, request: &StageRequest) -> Result<StageResponse, ApiError> {
        self.record(format!("stage:{}", request.blob));
        Ok(StageResponse {
            stage: StageId::new("s1"),
            image: anevazo::types::ImageRef::parse("registry.local/demo:s1").unwrap(),
        })
    }

    async fn staging_status(
        &self,
        _app: &AppRef,
        _id: &StageId,
    ) -> Result<StagingStatus, ApiError> {
        let n = self.staging_polls.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(format!("staging_status:{n}"));
        if let Some(reason) = &self.staging_failure {
            return Ok(StagingStatus::Failed(reason.clone()));
        }
        if n >= self.staging_polls_until_success {
            Ok(StagingStatus::Succeeded)
        } else {
            Ok(StagingStatus::Running)
        }
    }

    async fn staging_logs(&self, _app: &AppRef, _id: &StageId) -> Result<LogStream, ApiError> {
        self.record("staging_logs".to_string());
        let stream: LogStream = match &self.log_behavior {
            LogBehavior::Lines(lines) => {
                let items: Vec<Result<LogLine, ApiError>> = lines
                    .iter()
                    .map(|text| {
                        Ok(LogLine {
                            source: "build".to_string(),
                            text: (*text).to_string(),
                        })
                    })
                    .collect();
                Box::pin(futures::stream::iter(items))
            }
            LogBehavior::Endless => Box::pin(futures::stream::pending()),
            LogBehavior::ClosedImmediately => Box::pin(futures::stream::empty()),
        };
        Ok(stream)
    }
}

#[async_trait]
impl EnvOps for MockPlatform {
    async fn env_load(&self, _app: &AppRef) -> Result<EnvRecord, ApiError> {
        self.record("env_load".to_string());
        Ok(self.env.lock().unwrap().clone())
    }

    async fn env_store(&self, _app: &AppRef, record: &EnvRecord) -> Result<(), ApiError> {
        self.record("env_store".to_string());
        if self.env_conflicts_remaining.load(Ordering::SeqCst) > 0 {
            self.env_conflicts_remaining.fetch_sub(1, Ordering::SeqCst);
            // Simulate another client sneaking a write in.
            self.env.lock().unwrap().revision += 1;
            return Err(remote("environment store", 409, "revision is stale"));
        }
        let mut env = self.env.lock().unwrap();
        *env = record.clone();
        env.revision += 1;
        Ok(())
    }
}

/// Mock cluster for orchestrator tests.
pub struct MockCluster {
    pub calls: Mutex<Vec<String>>,
    /// Component whose manifest apply fails.
    pub fail_install_of: Option<&'static str>,
    /// Load-balancer address the ingress service eventually reports.
    pub lb_address: Option<String>,
    pub existing_namespaces: HashSet<String>,
    /// Namespaces returned for the workspace label selector.
    pub workspaces: Vec<String>,
}

impl MockCluster {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_install_of: None,
            lb_address: Some("10.0.0.1".to_string()),
            existing_namespaces: HashSet::new(),
            workspaces: Vec::new(),
        }
    }

    pub fn recorded(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ClusterOps for MockCluster {
    async fn apply_manifest(&self, manifest: &UnitManifest) -> Result<(), ApiError> {
        self.record(format!("apply:{}", manifest.component));
        if self.fail_install_of == Some(manifest.component) {
            return Err(remote("apply manifest", 500, "admission webhook rejected"));
        }
        Ok(())
    }

    async fn delete_manifest(&self, manifest: &UnitManifest) -> Result<(), ApiError> {
        self.record(format!("delete:{}", manifest.component));
        if self.fail_install_of == Some(manifest.component) {
            return Err(remote("delete manifest", 500, "admission webhook rejected"));
        }
        Ok(())
    }

    async fn namespace_exists(&self, name: &str) -> Result<bool, ApiError> {
        self.record(format!("exists:{name}"));
        Ok(self.existing_namespaces.contains(name))
    }

    async fn list_namespaces(&self, _label_selector: &str) -> Result<Vec<String>, ApiError> {
        self.record("list_namespaces".to_string());
        Ok(self.workspaces.clone())
    }

    async fn delete_namespace(&self, name: &str) -> Result<(), ApiError> {
        self.record(format!("delete_namespace:{name}"));
        Ok(())
    }

    async fn workload_ready(&self, namespace: &str, _selector: &str) -> Result<bool, ApiError> {
        self.record(format!("ready:{namespace}"));
        Ok(true)
    }

    async fn load_balancer_address(
        &self,
        _namespace: &str,
        _service: &str,
    ) -> Result<Option<String>, ApiError> {
        self.record("lb".to_string());
        Ok(self.lb_address.clone())
    }
}

/// Mock resolver with a fixed record set.
pub struct MockDns {
    pub records: HashMap<String, Vec<Ipv4Addr>>,
}

impl MockDns {
    pub fn with_record(host: &str, addresses: &[&str]) -> Self {
        let mut records = HashMap::new();
        records.insert(
            host.to_string(),
            addresses.iter().map(|a| a.parse().unwrap()).collect(),
        );
        Self { records }
    }

    pub fn empty() -> Self {
        Self {
            records: HashMap::new(),
        }
    }
}

#[async_trait]
impl DnsOps for MockDns {
    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, ApiError> {
        Ok(self.records.get(host).cloned().unwrap_or_default())
    }
}
