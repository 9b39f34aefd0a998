// ABOUTME: Per-application environment key-value store trait.
// ABOUTME: Revision-checked writes surface cross-client conflicts.

use crate::api::error::ApiError;
use crate::types::AppRef;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One application's environment assignments plus the revision the read
/// observed. A store with a stale revision is rejected with a conflict,
/// which callers resolve by re-reading and re-applying their mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvRecord {
    pub revision: u64,
    pub vars: BTreeMap<String, String>,
}

/// Environment store keyed by application identity.
#[async_trait]
pub trait EnvOps: Send + Sync {
    async fn env_load(&self, app: &AppRef) -> Result<EnvRecord, ApiError>;

    /// Write back a record read via [`env_load`](EnvOps::env_load). Fails
    /// with a conflict if another client wrote in between.
    async fn env_store(&self, app: &AppRef, record: &EnvRecord) -> Result<(), ApiError>;
}
