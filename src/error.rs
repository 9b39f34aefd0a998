// ABOUTME: Application-wide error types for anevazo.
// ABOUTME: Uses thiserror for ergonomic error handling.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("exactly one of --path, --git, or --image must be given")]
    AmbiguousSource,

    #[error(transparent)]
    Options(#[from] crate::config::OptionsError),

    #[error(transparent)]
    Install(#[from] crate::install::InstallError),

    #[error(transparent)]
    Push(#[from] crate::push::PushError),

    #[error(transparent)]
    Env(#[from] crate::application::EnvError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
