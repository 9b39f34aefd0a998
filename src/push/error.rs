// ABOUTME: Error types for the push workflow.
// ABOUTME: Every stage failure carries the stage name; timeouts stay distinct.

use crate::api::ApiError;
use crate::types::AppNameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("invalid application name {name:?}: {source}")]
    InvalidName { name: String, source: AppNameError },

    #[error("creating the application resource failed: {source}")]
    Create { source: ApiError },

    #[error("updating the existing application failed: {source}")]
    Update { source: ApiError },

    #[error("collecting the application sources failed: {source}")]
    Package { source: std::io::Error },

    #[error("uploading the application sources failed: {source}")]
    Upload { source: ApiError },

    #[error("importing the git sources failed: {source}")]
    Import { source: ApiError },

    #[error("submitting the build failed: {source}")]
    Stage { source: ApiError },

    #[error("staging failed: {reason}")]
    StagingFailed { reason: String },

    #[error("polling the stage failed: {source}")]
    StagingPoll { source: ApiError },

    /// The staging poll budget ran out without a definitive answer. Not a
    /// build failure: the build may still be running remotely.
    #[error("staging did not complete within {attempts} polls: {last}")]
    StagingTimeout { attempts: u32, last: String },

    #[error("deploying the application failed: {source}")]
    Deploy { source: ApiError },

    #[error("polling workload readiness failed: {source}")]
    ReadyPoll { source: ApiError },

    #[error("workload not ready within {attempts} polls: {last}")]
    ReadyTimeout { attempts: u32, last: String },
}
