// ABOUTME: Error types for platform install and uninstall.
// ABOUTME: Distinguishes configuration, single-step, and partial failures.

use super::graph::GraphError;
use super::step::Step;
use super::unit::{UnitError, UnitId};
use crate::api::ApiError;
use thiserror::Error;

/// A failed step collected from one install worker.
#[derive(Debug)]
pub struct StepFailure {
    pub unit: UnitId,
    pub step: Step,
    pub error: UnitError,
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("configuration error: {option}: {reason}")]
    Configuration {
        option: &'static str,
        reason: String,
    },

    #[error("{unit} failed its {step}: {source}")]
    Step {
        unit: UnitId,
        step: Step,
        source: UnitError,
    },

    /// One or more concurrent workers failed. The whole install is aborted;
    /// already-installed units are left in place.
    #[error("installing units failed: {}", summarize(.failures))]
    UnitsFailed { failures: Vec<StepFailure> },

    #[error("system domain {domain} does not resolve to load-balancer address {address}")]
    DomainMismatch { domain: String, address: String },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

fn summarize(failures: &[StepFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({}: {})", f.unit, f.step, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}
