// ABOUTME: Deployable unit trait and identity for platform components.
// ABOUTME: Default install/uninstall behavior shared by the fixed catalog.

use crate::api::{ApiError, ClusterOps, UnitManifest};
use crate::retry::{RetryError, RetryPolicy};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Identity of one platform component, installed and removed as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitId {
    Mesh,
    IngressController,
    CertManager,
    BuildEngine,
    ObjectStorage,
    ContainerRegistry,
}

impl UnitId {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitId::Mesh => "service-mesh",
            UnitId::IngressController => "ingress-controller",
            UnitId::CertManager => "cert-manager",
            UnitId::BuildEngine => "build-engine",
            UnitId::ObjectStorage => "object-storage",
            UnitId::ContainerRegistry => "container-registry",
        }
    }

    /// Namespace the unit's workloads live in.
    pub fn namespace(&self) -> &'static str {
        match self {
            UnitId::Mesh => "anevazo-mesh",
            UnitId::IngressController => "anevazo-ingress",
            UnitId::CertManager => "anevazo-cert-manager",
            UnitId::BuildEngine => "anevazo-build",
            UnitId::ObjectStorage => "anevazo-object-storage",
            UnitId::ContainerRegistry => "anevazo-registry",
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors from a single unit's lifecycle steps.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error("{0} is already present on the cluster")]
    AlreadyInstalled(UnitId),

    #[error("required option {0} is missing or empty")]
    MissingOption(&'static str),

    #[error("workloads not ready after {attempts} attempts: {last}")]
    NotReady { attempts: u32, last: String },

    #[error("namespace {0} still present after removal")]
    StillPresent(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One platform component as the orchestrator sees it.
///
/// The default method bodies cover the whole fixed catalog: apply the unit's
/// manifest, wait for its workloads, and tear down symmetrically. Units only
/// override what genuinely differs.
#[async_trait]
pub trait DeployableUnit: Send + Sync {
    fn id(&self) -> UnitId;

    /// Units that must be installed before this one.
    fn depends_on(&self) -> &'static [UnitId] {
        &[]
    }

    /// Installation options this unit cannot install without.
    fn required_options(&self) -> &'static [&'static str] {
        &[]
    }

    fn timeout(&self) -> Duration;

    /// Manifest reference plus the resolved values substituted into it.
    fn manifest(&self) -> UnitManifest;

    /// Pre-condition check, run for every unit before anything installs.
    async fn pre_install_check(&self, cluster: &dyn ClusterOps) -> Result<(), UnitError> {
        if cluster.namespace_exists(self.id().namespace()).await? {
            return Err(UnitError::AlreadyInstalled(self.id()));
        }
        Ok(())
    }

    async fn install(&self, cluster: &dyn ClusterOps) -> Result<(), UnitError> {
        cluster.apply_manifest(&self.manifest()).await?;
        wait_workloads_ready(cluster, self.id(), self.timeout()).await
    }

    async fn uninstall(&self, cluster: &dyn ClusterOps) -> Result<(), UnitError> {
        cluster.delete_manifest(&self.manifest()).await?;
        Ok(())
    }

    /// Post-removal check: wait for the unit's namespace to disappear.
    async fn post_delete_check(&self, cluster: &dyn ClusterOps) -> Result<(), UnitError> {
        let namespace = self.id().namespace();
        let policy = poll_policy(self.timeout());
        let result = policy
            .run(
                "namespace removal",
                || async {
                    match cluster.namespace_exists(namespace).await {
                        Ok(false) => Ok(()),
                        Ok(true) => Err(WaitPoll::NotYet),
                        Err(e) => Err(WaitPoll::Api(e)),
                    }
                },
                WaitPoll::is_retryable,
            )
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(RetryError::Exhausted { .. }) => {
                Err(UnitError::StillPresent(namespace.to_string()))
            }
            Err(RetryError::Rejected(WaitPoll::Api(e))) => Err(UnitError::Api(e)),
            Err(RetryError::Rejected(WaitPoll::NotYet)) => unreachable!("NotYet is retryable"),
        }
    }
}

/// Poll until every workload labeled as part of the unit reports ready.
pub(crate) async fn wait_workloads_ready(
    cluster: &dyn ClusterOps,
    unit: UnitId,
    timeout: Duration,
) -> Result<(), UnitError> {
    let selector = format!("app.kubernetes.io/part-of={unit}");
    let policy = poll_policy(timeout);

    let result = policy
        .run(
            "unit readiness",
            || async {
                match cluster.workload_ready(unit.namespace(), &selector).await {
                    Ok(true) => Ok(()),
                    Ok(false) => Err(WaitPoll::NotYet),
                    Err(e) => Err(WaitPoll::Api(e)),
                }
            },
            WaitPoll::is_retryable,
        )
        .await;

    match result {
        Ok(()) => Ok(()),
        Err(RetryError::Exhausted { attempts, last }) => Err(UnitError::NotReady {
            attempts,
            last: last.to_string(),
        }),
        Err(RetryError::Rejected(WaitPoll::Api(e))) => Err(UnitError::Api(e)),
        Err(RetryError::Rejected(WaitPoll::NotYet)) => unreachable!("NotYet is retryable"),
    }
}

const UNIT_POLL_DELAY: Duration = Duration::from_secs(2);

/// A unit timeout expressed as an attempt budget over the fixed poll delay.
fn poll_policy(timeout: Duration) -> RetryPolicy {
    let attempts = (timeout.as_secs() / UNIT_POLL_DELAY.as_secs()).max(1) as u32;
    RetryPolicy::new(attempts, UNIT_POLL_DELAY)
}

#[derive(Debug, thiserror::Error)]
enum WaitPoll {
    #[error("not ready yet")]
    NotYet,

    #[error(transparent)]
    Api(ApiError),
}

impl WaitPoll {
    fn is_retryable(&self) -> bool {
        match self {
            WaitPoll::NotYet => true,
            WaitPoll::Api(e) => e.is_retryable(),
        }
    }
}
