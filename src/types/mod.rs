// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod app_name;
mod app_ref;
mod id;
mod image_ref;
mod route;

pub use app_name::{AppName, AppNameError};
pub use app_ref::AppRef;
pub use id::{BlobId, Id, StageId};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use route::Route;
