// ABOUTME: Application reference combining name and namespace.
// ABOUTME: Unique within a namespace; carried through the whole push workflow.

use super::AppName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to an application resource on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppRef {
    pub name: AppName,
    pub namespace: String,
}

impl AppRef {
    pub fn new(name: AppName, namespace: impl Into<String>) -> Self {
        Self {
            name,
            namespace: namespace.into(),
        }
    }

    /// Name of the key-value object holding this application's environment.
    pub fn env_object_name(&self) -> String {
        format!("{}-env", self.name)
    }
}

impl fmt::Display for AppRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
