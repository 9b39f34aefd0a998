// ABOUTME: Step executor running one named operation against one unit.
// ABOUTME: Workers hand outcomes back for a centralized abort decision.

use super::unit::{DeployableUnit, UnitError, UnitId};
use crate::api::ClusterOps;
use crate::output::Output;
use std::fmt;
use std::sync::Arc;

/// The named operations a unit goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    PreInstallCheck,
    Install,
    Uninstall,
    PostDeleteCheck,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::PreInstallCheck => "pre-install check",
            Step::Install => "install",
            Step::Uninstall => "uninstall",
            Step::PostDeleteCheck => "post-delete check",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one step against one unit. Workers never abort the run
/// themselves; they report and let the orchestrator decide.
#[derive(Debug)]
pub struct StepOutcome {
    pub unit: UnitId,
    pub step: Step,
    pub result: Result<(), UnitError>,
}

/// Runs one step against one unit, with uniform logging and progress
/// reporting.
#[derive(Clone)]
pub struct StepExecutor {
    cluster: Arc<dyn ClusterOps>,
    output: Output,
}

impl StepExecutor {
    pub fn new(cluster: Arc<dyn ClusterOps>, output: Output) -> Self {
        Self { cluster, output }
    }

    pub async fn execute(&self, step: Step, unit: &dyn DeployableUnit) -> StepOutcome {
        let id = unit.id();
        tracing::info!(unit = %id, step = %step, "step start");
        self.output.progress(&format!("  → {step}: {id}"));

        let result = match step {
            Step::PreInstallCheck => unit.pre_install_check(self.cluster.as_ref()).await,
            Step::Install => unit.install(self.cluster.as_ref()).await,
            Step::Uninstall => unit.uninstall(self.cluster.as_ref()).await,
            Step::PostDeleteCheck => unit.post_delete_check(self.cluster.as_ref()).await,
        };

        match &result {
            Ok(()) => tracing::info!(unit = %id, step = %step, "step done"),
            Err(e) => tracing::error!(unit = %id, step = %step, error = %e, "step failed"),
        }

        StepOutcome {
            unit: id,
            step,
            result,
        }
    }
}
