// ABOUTME: Source acquisition operations trait.
// ABOUTME: Upload an archive or import a git revision; both yield a blob id.

use crate::api::error::ApiError;
use crate::types::{AppRef, BlobId};
use async_trait::async_trait;
use std::path::Path;

/// Source-upload API: archive in, opaque blob identity out.
#[async_trait]
pub trait SourceOps: Send + Sync {
    /// Upload a packaged source archive.
    async fn upload(&self, app: &AppRef, archive: &Path) -> Result<BlobId, ApiError>;

    /// Ask the platform to fetch source from a git URL at a revision.
    async fn import_git(&self, app: &AppRef, url: &str, revision: &str)
    -> Result<BlobId, ApiError>;
}
