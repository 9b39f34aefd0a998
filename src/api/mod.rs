// ABOUTME: Remote collaborator seams for the platform control plane.
// ABOUTME: Capability traits plus the concrete HTTP client implementation.

mod error;
mod http;
pub mod traits;

pub use error::{ApiError, ApiErrorKind};
pub use http::HttpPlatformClient;
pub use traits::{
    AppConfiguration, BuildOps, ClusterOps, DeployRequest, DeployResponse, DnsOps, EnvOps,
    EnvRecord, LogLine, LogStream, SourceOps, StageRequest, StageResponse, StagingStatus,
    SystemDns, UnitManifest, WorkloadOps,
};
