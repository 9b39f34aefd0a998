// ABOUTME: The fixed catalog of platform units.
// ABOUTME: Each unit carries its timeout and whatever settings its manifest needs.

use super::unit::{DeployableUnit, UnitId};
use crate::api::UnitManifest;
use crate::config::{InstallationOptions, ObjectStorageConfig};
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// Service mesh. Installed before the ingress controller, which needs mesh
/// sidecar injection to be active when its pods start.
pub struct Mesh {
    pub timeout: Duration,
}

impl DeployableUnit for Mesh {
    fn id(&self) -> UnitId {
        UnitId::Mesh
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn manifest(&self) -> UnitManifest {
        UnitManifest::new(self.id().as_str(), self.id().namespace())
    }
}

pub struct IngressController {
    pub timeout: Duration,
}

impl DeployableUnit for IngressController {
    fn id(&self) -> UnitId {
        UnitId::IngressController
    }

    fn depends_on(&self) -> &'static [UnitId] {
        &[UnitId::Mesh]
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn manifest(&self) -> UnitManifest {
        UnitManifest::new(self.id().as_str(), self.id().namespace())
    }
}

pub struct CertManager {
    pub timeout: Duration,
    pub tls_issuer: String,
}

impl DeployableUnit for CertManager {
    fn id(&self) -> UnitId {
        UnitId::CertManager
    }

    fn required_options(&self) -> &'static [&'static str] {
        &["tls_issuer"]
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn manifest(&self) -> UnitManifest {
        UnitManifest::new(self.id().as_str(), self.id().namespace())
            .value("issuer", &self.tls_issuer)
    }
}

/// Build-pipeline engine. Needs to know where staged sources live.
pub struct BuildEngine {
    pub timeout: Duration,
    pub storage: ObjectStorageConfig,
}

impl DeployableUnit for BuildEngine {
    fn id(&self) -> UnitId {
        UnitId::BuildEngine
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn manifest(&self) -> UnitManifest {
        UnitManifest::new(self.id().as_str(), self.id().namespace())
            .value("storage_endpoint", &self.storage.endpoint)
            .value("storage_bucket", &self.storage.bucket)
            .value("storage_use_ssl", self.storage.use_ssl.to_string())
    }
}

/// In-cluster object storage for build artifacts. Only part of the catalog
/// when no external store is configured.
pub struct ObjectStorage {
    pub timeout: Duration,
    pub storage: ObjectStorageConfig,
}

impl DeployableUnit for ObjectStorage {
    fn id(&self) -> UnitId {
        UnitId::ObjectStorage
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn manifest(&self) -> UnitManifest {
        UnitManifest::new(self.id().as_str(), self.id().namespace())
            .value("bucket", &self.storage.bucket)
            .value("location", &self.storage.location)
    }
}

pub struct ContainerRegistry {
    pub timeout: Duration,
    pub node_port: bool,
}

impl DeployableUnit for ContainerRegistry {
    fn id(&self) -> UnitId {
        UnitId::ContainerRegistry
    }

    fn required_options(&self) -> &'static [&'static str] {
        &["use_internal_registry_node_port"]
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn manifest(&self) -> UnitManifest {
        UnitManifest::new(self.id().as_str(), self.id().namespace())
            .value("node_port", self.node_port.to_string())
    }
}

/// Build the full unit catalog from resolved options.
///
/// The external object store, when configured, replaces the in-cluster
/// storage unit entirely.
pub fn catalog(
    options: &InstallationOptions,
    unit_timeout: Duration,
) -> Result<Vec<Arc<dyn DeployableUnit>>> {
    let storage = ObjectStorageConfig::from_options(options)?;
    let internal_storage = storage == ObjectStorageConfig::internal();

    let mut units: Vec<Arc<dyn DeployableUnit>> = vec![
        Arc::new(Mesh {
            timeout: unit_timeout,
        }),
        Arc::new(IngressController {
            timeout: unit_timeout,
        }),
        Arc::new(CertManager {
            timeout: unit_timeout,
            tls_issuer: options.get_str("tls_issuer")?.to_string(),
        }),
    ];

    if internal_storage {
        units.push(Arc::new(ObjectStorage {
            timeout: unit_timeout,
            storage: storage.clone(),
        }));
    }

    units.push(Arc::new(ContainerRegistry {
        timeout: unit_timeout,
        node_port: options.get_bool("use_internal_registry_node_port")?,
    }));
    units.push(Arc::new(BuildEngine {
        timeout: unit_timeout,
        storage,
    }));

    Ok(units)
}
