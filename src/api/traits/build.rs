// ABOUTME: Remote build/staging operations trait.
// ABOUTME: Submit a stage, poll it by id, stream its log lines.

use crate::api::error::ApiError;
use crate::types::{AppRef, BlobId, ImageRef, StageId};
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Build request: stored source blob plus the builder image to run it
/// through.
#[derive(Debug, Clone, Serialize)]
pub struct StageRequest {
    pub app: AppRef,
    pub blob: BlobId,
    pub builder_image: ImageRef,
}

/// Build submission response: the stage to poll and the image the build
/// will push on success.
#[derive(Debug, Clone, Deserialize)]
pub struct StageResponse {
    pub stage: StageId,
    pub image: ImageRef,
}

/// Observed state of a remote stage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "reason")]
pub enum StagingStatus {
    Running,
    Succeeded,
    Failed(String),
}

/// A single log line from the staging run.
#[derive(Debug, Clone, Deserialize)]
pub struct LogLine {
    /// Which build step emitted the line.
    pub source: String,
    pub text: String,
}

pub type LogStream = Pin<Box<dyn Stream<Item = Result<LogLine, ApiError>> + Send>>;

/// Remote build/staging operations: submit, poll-by-id, tail logs.
#[async_trait]
pub trait BuildOps: Send + Sync {
    /// Submit a build for stored source; returns the stage to poll.
    async fn app_stage(&self, request: &StageRequest) -> Result<StageResponse, ApiError>;

    /// Current state of a stage. Poll-only.
    async fn staging_status(&self, app: &AppRef, id: &StageId)
    -> Result<StagingStatus, ApiError>;

    /// Open a log stream for a stage. The stream ends when the remote run
    /// finishes or the connection drops.
    async fn staging_logs(&self, app: &AppRef, id: &StageId) -> Result<LogStream, ApiError>;
}
