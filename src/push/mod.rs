// ABOUTME: Push workflow using the type state pattern.
// ABOUTME: Exports the pipeline, states, source spec, and tail coordinator.

mod error;
mod pipeline;
mod source;
mod state;
mod tail;

pub use error::PushError;
pub use pipeline::{Push, PushParams, PushPipeline};
pub use source::{PackagedSource, SourceSpec, package_source};
pub use state::{Created, Deployed, SourceAcquired, Staged, Validated};
pub use tail::{LogTailCoordinator, TailHandle};
