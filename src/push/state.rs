// ABOUTME: Push workflow state types for the type state pattern.
// ABOUTME: Each state carries exactly the data its stage produced.

use crate::types::{BlobId, ImageRef, Route, StageId};

/// Name validated; no remote call made yet.
/// Available actions: `create_or_update()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Validated;

/// Application resource exists (created fresh or updated on conflict).
/// Available actions: `upload()`, `import_git()`, `with_image()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Created;

/// Source stored remotely; the blob identity references it.
/// Available actions: `stage()`
#[derive(Debug, Clone)]
pub struct SourceAcquired {
    pub(crate) blob: BlobId,
}

/// An image exists to deploy: built by the recorded stage, or provided by
/// the caller (no stage).
/// Available actions: `deploy()`
#[derive(Debug, Clone)]
pub struct Staged {
    pub(crate) image: ImageRef,
    pub(crate) stage: Option<StageId>,
}

/// Workload submitted; the platform assigned a route.
/// Available actions: `route()`, `finish()`
#[derive(Debug, Clone)]
pub struct Deployed {
    pub(crate) route: Route,
}
