// ABOUTME: Application workload operations trait.
// ABOUTME: Create/update app resources, deploy images, poll readiness.

use crate::api::error::ApiError;
use crate::types::{AppRef, ImageRef, Route, StageId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Desired application configuration, applied on create and update alike.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instances: Option<u32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// Deploy request: the image to run, either built by a stage or provided by
/// the caller.
#[derive(Debug, Clone, Serialize)]
pub struct DeployRequest {
    pub app: AppRef,
    pub image: ImageRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeployResponse {
    pub route: Route,
}

/// Application lifecycle operations against the deploy API.
#[async_trait]
pub trait WorkloadOps: Send + Sync {
    /// Create the application resource. Conflict means it already exists.
    async fn app_create(&self, app: &AppRef, config: &AppConfiguration) -> Result<(), ApiError>;

    /// Update an existing application resource with the same configuration
    /// shape used for create.
    async fn app_update(&self, app: &AppRef, config: &AppConfiguration) -> Result<(), ApiError>;

    /// Submit a deployment; returns the route assigned to the workload.
    async fn app_deploy(&self, request: &DeployRequest) -> Result<DeployResponse, ApiError>;

    /// Whether the deployed workload reports ready. Poll-only.
    async fn app_running(&self, app: &AppRef) -> Result<bool, ApiError>;

    /// Delete the application resource and its workload.
    async fn app_delete(&self, app: &AppRef) -> Result<(), ApiError>;
}
