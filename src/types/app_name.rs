// ABOUTME: Validated application name newtype.
// ABOUTME: Ensures names follow DNS-1123 subdomain-label requirements.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppNameError {
    #[error("application name cannot be empty")]
    Empty,

    #[error("application name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("application name cannot start with '{0}'")]
    InvalidStart(char),

    #[error("application name cannot end with '{0}'")]
    InvalidEnd(char),

    #[error("invalid character in application name: '{0}'")]
    InvalidChar(char),
}

/// Application name, validated against the subdomain-label syntax the
/// platform uses for routes and workload names. Validation happens before
/// any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppName(String);

impl AppName {
    pub fn new(value: &str) -> Result<Self, AppNameError> {
        if value.is_empty() {
            return Err(AppNameError::Empty);
        }

        if value.len() > 63 {
            return Err(AppNameError::TooLong);
        }

        if let Some(first) = value.chars().next()
            && !first.is_ascii_lowercase()
            && !first.is_ascii_digit()
        {
            return Err(AppNameError::InvalidStart(first));
        }

        if let Some(last) = value.chars().last()
            && !last.is_ascii_lowercase()
            && !last.is_ascii_digit()
        {
            return Err(AppNameError::InvalidEnd(last));
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(AppNameError::InvalidChar(c));
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
                return Err(AppNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Names participate in request bodies as bare strings; deserialization
// re-validates.
impl Serialize for AppName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AppName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        AppName::new(&value).map_err(serde::de::Error::custom)
    }
}
