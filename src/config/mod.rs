// ABOUTME: Client settings and installation options.
// ABOUTME: YAML settings file discovery plus the option resolver types.

pub mod options;
mod storage;

pub use options::{
    DefaultsReader, FlagsReader, InstallationOption, InstallationOptions, InteractiveReader,
    OptionSource, OptionValue, OptionsError, OptionsReader,
};
pub use storage::ObjectStorageConfig;

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "anevazo.yml";
pub const CONFIG_FILENAME_ALT: &str = "anevazo.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".anevazo/config.yml";

/// Client settings: where the control plane lives, which namespace pushes
/// target, and the poll budgets for the slow remote operations.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub budgets: Budgets,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Attempt-count × delay budgets. Deliberately not wall clocks: every remote
/// wait in the client is a bounded number of polls.
#[derive(Debug, Clone, Deserialize)]
pub struct Budgets {
    #[serde(default = "default_poll_attempts")]
    pub staging_attempts: u32,

    #[serde(default = "default_poll_attempts")]
    pub ready_attempts: u32,

    #[serde(default = "default_poll_delay", with = "humantime_serde")]
    pub poll_delay: Duration,

    #[serde(default = "default_domain_attempts")]
    pub domain_attempts: u32,

    #[serde(default = "default_domain_delay", with = "humantime_serde")]
    pub domain_delay: Duration,

    #[serde(default = "default_unit_timeout", with = "humantime_serde")]
    pub unit_timeout: Duration,

    #[serde(default = "default_env_attempts")]
    pub env_conflict_attempts: u32,
}

fn default_namespace() -> String {
    "workspace".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8030
}

fn default_poll_attempts() -> u32 {
    180
}

fn default_poll_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_domain_attempts() -> u32 {
    60
}

fn default_domain_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_unit_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_env_attempts() -> u32 {
    5
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            staging_attempts: default_poll_attempts(),
            ready_attempts: default_poll_attempts(),
            poll_delay: default_poll_delay(),
            domain_attempts: default_domain_attempts(),
            domain_delay: default_domain_delay(),
            unit_timeout: default_unit_timeout(),
            env_conflict_attempts: default_env_attempts(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            namespace: default_namespace(),
            budgets: Budgets::default(),
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Find a settings file in `dir`, falling back to defaults when none of
    /// the candidate locations exist.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_fills_defaults() {
        let settings = Settings::from_yaml("api:\n  host: api.example.com\n").unwrap();
        assert_eq!(settings.api.host, "api.example.com");
        assert_eq!(settings.api.port, 8030);
        assert_eq!(settings.namespace, "workspace");
        assert_eq!(settings.budgets.poll_delay, Duration::from_secs(1));
    }

    #[test]
    fn budgets_parse_humantime_durations() {
        let yaml = "budgets:\n  poll_delay: 250ms\n  unit_timeout: 10m\n";
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.budgets.poll_delay, Duration::from_millis(250));
        assert_eq!(settings.budgets.unit_timeout, Duration::from_secs(600));
    }
}
