// ABOUTME: Route newtype for the externally reachable address of an app.
// ABOUTME: Assigned by the deploy API; opaque to the client.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Externally reachable address assigned to a deployed application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route(String);

impl Route {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full URL for user-facing output.
    pub fn url(&self) -> String {
        format!("https://{}", self.0)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
