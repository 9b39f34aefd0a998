// ABOUTME: Deployment orchestrator for the platform unit catalog.
// ABOUTME: Sequential pre-checks, ordered then fanned-out installs, teardown.

use super::domain;
use super::error::{InstallError, StepFailure};
use super::graph;
use super::step::{Step, StepExecutor, StepOutcome};
use super::unit::DeployableUnit;
use crate::api::{ClusterOps, DnsOps};
use crate::config::{Budgets, InstallationOptions};
use crate::output::Output;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Label selector marking namespaces that hold user workloads, as opposed
/// to the platform's own unit namespaces.
const WORKSPACE_SELECTOR: &str = "anevazo.io/workspace=true";

/// What a successful install leaves behind for the caller to print.
#[derive(Debug)]
pub struct InstallReport {
    pub system_domain: String,
}

/// Owns the fixed, partially-ordered unit catalog for one invocation.
///
/// Pre-checks run sequentially for every unit before anything installs.
/// Units constrained by a dependency edge install sequentially in
/// topological order; the rest fan out one worker per unit. Any install
/// failure aborts the whole run — a half-installed platform is unsafe — but
/// workers already in flight are left to finish so the cluster is never
/// abandoned mid-operation.
pub struct DeploymentOrchestrator {
    cluster: Arc<dyn ClusterOps>,
    dns: Arc<dyn DnsOps>,
    options: InstallationOptions,
    budgets: Budgets,
    output: Output,
}

impl DeploymentOrchestrator {
    pub fn new(
        cluster: Arc<dyn ClusterOps>,
        dns: Arc<dyn DnsOps>,
        options: InstallationOptions,
        budgets: Budgets,
        output: Output,
    ) -> Self {
        Self {
            cluster,
            dns,
            options,
            budgets,
            output,
        }
    }

    pub async fn install(
        &self,
        units: &[Arc<dyn DeployableUnit>],
    ) -> Result<InstallReport, InstallError> {
        self.ensure_required_options(units)?;

        let executor = StepExecutor::new(self.cluster.clone(), self.output.clone());

        // All pre-checks complete before any install starts.
        for unit in units {
            let outcome = executor.execute(Step::PreInstallCheck, unit.as_ref()).await;
            if let Err(source) = outcome.result {
                return Err(InstallError::Step {
                    unit: outcome.unit,
                    step: outcome.step,
                    source,
                });
            }
        }

        let (sequential, concurrent) = graph::partition(units)?;

        for unit in &sequential {
            let outcome = executor.execute(Step::Install, unit.as_ref()).await;
            if let Err(source) = outcome.result {
                return Err(InstallError::Step {
                    unit: outcome.unit,
                    step: outcome.step,
                    source,
                });
            }
        }

        // The ingress controller is up; post-configuration values can now be
        // discovered. A failure here stops the run before the fan-out.
        let system_domain = domain::ensure_system_domain(
            self.cluster.as_ref(),
            self.dns.as_ref(),
            &self.options,
            &self.budgets,
            &self.output,
        )
        .await?;

        let failures = self
            .fan_out(&executor, Step::Install, &concurrent)
            .await
            .into_iter()
            .filter_map(|outcome| match outcome.result {
                Ok(()) => None,
                Err(error) => Some(StepFailure {
                    unit: outcome.unit,
                    step: outcome.step,
                    error,
                }),
            })
            .collect::<Vec<_>>();

        if !failures.is_empty() {
            return Err(InstallError::UnitsFailed { failures });
        }

        Ok(InstallReport { system_domain })
    }

    /// Symmetric teardown. Workload namespaces go first, then every unit is
    /// removed concurrently and checked. Teardown is best-effort: failures
    /// are logged, never fatal.
    pub async fn uninstall(&self, units: &[Arc<dyn DeployableUnit>]) -> Result<(), InstallError> {
        self.delete_workspaces().await;

        let executor = StepExecutor::new(self.cluster.clone(), self.output.clone());
        let mut set: JoinSet<(StepOutcome, Option<StepOutcome>)> = JoinSet::new();

        for unit in units {
            let executor = executor.clone();
            let unit = unit.clone();
            set.spawn(async move {
                let removal = executor.execute(Step::Uninstall, unit.as_ref()).await;
                if removal.result.is_err() {
                    return (removal, None);
                }
                let check = executor.execute(Step::PostDeleteCheck, unit.as_ref()).await;
                (removal, Some(check))
            });
        }

        while let Some(joined) = set.join_next().await {
            let Ok((removal, check)) = joined else {
                self.output.warning("an uninstall worker aborted unexpectedly");
                continue;
            };
            if let Err(e) = removal.result {
                self.output
                    .warning(&format!("removing {} failed: {e}", removal.unit));
            }
            if let Some(check) = check {
                if let Err(e) = check.result {
                    self.output
                        .warning(&format!("{} left residue behind: {e}", check.unit));
                }
            }
        }

        Ok(())
    }

    async fn fan_out(
        &self,
        executor: &StepExecutor,
        step: Step,
        units: &[Arc<dyn DeployableUnit>],
    ) -> Vec<StepOutcome> {
        let mut set: JoinSet<StepOutcome> = JoinSet::new();
        for unit in units {
            let executor = executor.clone();
            let unit = unit.clone();
            set.spawn(async move { executor.execute(step, unit.as_ref()).await });
        }

        let mut outcomes = Vec::with_capacity(units.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    // A panicked worker counts as a failed unit, but we can
                    // no longer tell which one it was.
                    tracing::error!(error = %e, "install worker aborted");
                    self.output.warning(&format!("install worker aborted: {e}"));
                }
            }
        }
        outcomes
    }

    /// Every option some unit requires must be non-empty after resolution.
    fn ensure_required_options(
        &self,
        units: &[Arc<dyn DeployableUnit>],
    ) -> Result<(), InstallError> {
        for unit in units {
            for option in unit.required_options() {
                if !self.options.is_set(option) {
                    return Err(InstallError::Configuration {
                        option,
                        reason: format!("required by {}", unit.id()),
                    });
                }
            }
        }
        Ok(())
    }

    async fn delete_workspaces(&self) {
        let namespaces = match self.cluster.list_namespaces(WORKSPACE_SELECTOR).await {
            Ok(namespaces) => namespaces,
            Err(e) => {
                self.output
                    .warning(&format!("could not list workspace namespaces: {e}"));
                return;
            }
        };

        for namespace in namespaces {
            self.output
                .progress(&format!("  → Removing namespace {namespace}"));
            if let Err(e) = self.cluster.delete_namespace(&namespace).await {
                self.output
                    .warning(&format!("removing namespace {namespace} failed: {e}"));
            }
        }
    }
}
