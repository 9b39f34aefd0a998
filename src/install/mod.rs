// ABOUTME: Platform installation: unit catalog, ordering, orchestration.
// ABOUTME: Exports the orchestrator, unit trait, and step machinery.

mod domain;
mod error;
mod graph;
mod orchestrator;
mod step;
mod unit;
mod units;

pub use error::{InstallError, StepFailure};
pub use graph::{GraphError, partition, topological_order};
pub use orchestrator::{DeploymentOrchestrator, InstallReport};
pub use step::{Step, StepExecutor, StepOutcome};
pub use unit::{DeployableUnit, UnitError, UnitId};
pub use units::{
    BuildEngine, CertManager, ContainerRegistry, IngressController, Mesh, ObjectStorage, catalog,
};
