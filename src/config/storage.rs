// ABOUTME: Object storage connection settings for build artifacts.
// ABOUTME: Either fully caller-provided or the internal in-cluster store.

use super::options::{InstallationOptions, OptionsError};
use crate::error::{Error, Result};

/// Connection settings for the store holding uploaded application sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStorageConfig {
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub location: String,
    pub use_ssl: bool,
}

impl ObjectStorageConfig {
    /// Settings for the object storage unit the install itself brings up.
    pub fn internal() -> Self {
        Self {
            endpoint: "object-storage.anevazo.svc.cluster.local:9000".to_string(),
            access_key_id: "anevazo".to_string(),
            secret_access_key: "changeme-internal-store".to_string(),
            bucket: "anevazo-sources".to_string(),
            location: "".to_string(),
            use_ssl: false,
        }
    }

    /// Build from resolved installation options. An empty endpoint selects
    /// the internal store; a non-empty one must come with credentials and a
    /// bucket.
    pub fn from_options(options: &InstallationOptions) -> Result<Self> {
        let config = Self {
            endpoint: options.get_str("s3_endpoint").map_err(flatten)?.to_string(),
            access_key_id: options
                .get_str("s3_access_key_id")
                .map_err(flatten)?
                .to_string(),
            secret_access_key: options
                .get_str("s3_secret_access_key")
                .map_err(flatten)?
                .to_string(),
            bucket: options.get_str("s3_bucket").map_err(flatten)?.to_string(),
            location: options.get_str("s3_location").map_err(flatten)?.to_string(),
            use_ssl: options.get_bool("s3_use_ssl").map_err(flatten)?,
        };
        config.validate()?;
        if config.endpoint.is_empty() {
            return Ok(Self::internal());
        }
        Ok(config)
    }

    /// All-or-nothing: either every field is empty (internal store) or
    /// endpoint, both keys, and bucket are all present.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            &self.endpoint,
            &self.access_key_id,
            &self.secret_access_key,
            &self.bucket,
        ];
        let set = fields.iter().filter(|f| !f.is_empty()).count();

        if set == 0 || set == fields.len() {
            return Ok(());
        }
        Err(Error::InvalidConfig(
            "object storage settings are incomplete: endpoint, access key id, \
             secret access key, and bucket must all be set together"
                .to_string(),
        ))
    }
}

fn flatten(err: OptionsError) -> Error {
    Error::Options(err)
}
