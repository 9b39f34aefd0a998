// ABOUTME: Cluster resource operations trait.
// ABOUTME: Namespaces, unit manifests, readiness and load-balancer polling.

use crate::api::error::ApiError;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Install input for one platform unit: which component manifest to apply
/// and the resolved values substituted into it. The manifest content itself
/// lives server-side; the client only names it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitManifest {
    pub component: &'static str,
    pub namespace: &'static str,
    pub values: BTreeMap<String, String>,
}

impl UnitManifest {
    pub fn new(component: &'static str, namespace: &'static str) -> Self {
        Self {
            component,
            namespace,
            values: BTreeMap::new(),
        }
    }

    pub fn value(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }
}

/// Cluster resource operations. Poll-only: there is no watch dependency,
/// every wait is a bounded re-read.
#[async_trait]
pub trait ClusterOps: Send + Sync {
    /// Apply a unit's manifest to the cluster.
    async fn apply_manifest(&self, manifest: &UnitManifest) -> Result<(), ApiError>;

    /// Delete the resources a unit's manifest created.
    async fn delete_manifest(&self, manifest: &UnitManifest) -> Result<(), ApiError>;

    /// Whether a namespace exists.
    async fn namespace_exists(&self, name: &str) -> Result<bool, ApiError>;

    /// List namespaces matching a label selector.
    async fn list_namespaces(&self, label_selector: &str) -> Result<Vec<String>, ApiError>;

    /// Delete a namespace and everything in it.
    async fn delete_namespace(&self, name: &str) -> Result<(), ApiError>;

    /// Whether all workloads matching the selector report ready.
    async fn workload_ready(&self, namespace: &str, selector: &str) -> Result<bool, ApiError>;

    /// External address assigned to a unit's load-balancer service, if the
    /// cluster has assigned one yet. Assignment is asynchronous with no push
    /// notification, so callers poll.
    async fn load_balancer_address(
        &self,
        namespace: &str,
        service: &str,
    ) -> Result<Option<String>, ApiError>;
}
