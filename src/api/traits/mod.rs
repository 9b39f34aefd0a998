// ABOUTME: Composable capability traits for the platform's remote APIs.
// ABOUTME: Defines ClusterOps, WorkloadOps, BuildOps, SourceOps, EnvOps, DnsOps.

mod build;
mod cluster;
mod dns;
mod env;
mod source;
mod workload;

pub use build::{BuildOps, LogLine, LogStream, StageRequest, StageResponse, StagingStatus};
pub use cluster::{ClusterOps, UnitManifest};
pub use dns::{DnsOps, SystemDns};
pub use env::{EnvOps, EnvRecord};
pub use source::SourceOps;
pub use workload::{AppConfiguration, DeployRequest, DeployResponse, WorkloadOps};
