// ABOUTME: Explicit dependency graph over deployable units.
// ABOUTME: Computes topological order and the sequential/concurrent split.

use super::unit::{DeployableUnit, UnitId};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("dependency cycle among units: {0}")]
    Cycle(String),
}

/// Topological order over the given units, stable with respect to catalog
/// order. Dependencies on units absent from the list are assumed satisfied.
pub fn topological_order(
    units: &[Arc<dyn DeployableUnit>],
) -> Result<Vec<Arc<dyn DeployableUnit>>, GraphError> {
    let present: HashSet<UnitId> = units.iter().map(|u| u.id()).collect();
    let mut emitted: HashSet<UnitId> = HashSet::new();
    let mut ordered = Vec::with_capacity(units.len());

    while ordered.len() < units.len() {
        let mut progressed = false;
        for unit in units {
            if emitted.contains(&unit.id()) {
                continue;
            }
            let ready = unit
                .depends_on()
                .iter()
                .all(|dep| !present.contains(dep) || emitted.contains(dep));
            if ready {
                emitted.insert(unit.id());
                ordered.push(unit.clone());
                progressed = true;
            }
        }
        if !progressed {
            let stuck: Vec<&str> = units
                .iter()
                .filter(|u| !emitted.contains(&u.id()))
                .map(|u| u.id().as_str())
                .collect();
            return Err(GraphError::Cycle(stuck.join(", ")));
        }
    }

    Ok(ordered)
}

/// Split units into the sequential prefix and the concurrent remainder.
///
/// Any unit that participates in a dependency edge within the list installs
/// sequentially in topological order; everything else fans out to workers.
pub fn partition(
    units: &[Arc<dyn DeployableUnit>],
) -> Result<(Vec<Arc<dyn DeployableUnit>>, Vec<Arc<dyn DeployableUnit>>), GraphError> {
    let present: HashSet<UnitId> = units.iter().map(|u| u.id()).collect();

    let mut constrained: HashSet<UnitId> = HashSet::new();
    for unit in units {
        for dep in unit.depends_on() {
            if present.contains(dep) {
                constrained.insert(unit.id());
                constrained.insert(*dep);
            }
        }
    }

    let ordered = topological_order(units)?;
    let sequential = ordered
        .iter()
        .filter(|u| constrained.contains(&u.id()))
        .cloned()
        .collect();
    let concurrent = ordered
        .iter()
        .filter(|u| !constrained.contains(&u.id()))
        .cloned()
        .collect();

    Ok((sequential, concurrent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UnitManifest;
    use std::time::Duration;

    struct FakeUnit {
        id: UnitId,
        deps: &'static [UnitId],
    }

    impl DeployableUnit for FakeUnit {
        fn id(&self) -> UnitId {
            self.id
        }

        fn depends_on(&self) -> &'static [UnitId] {
            self.deps
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        fn manifest(&self) -> UnitManifest {
            UnitManifest::new(self.id.as_str(), self.id.namespace())
        }
    }

    fn unit(id: UnitId, deps: &'static [UnitId]) -> Arc<dyn DeployableUnit> {
        Arc::new(FakeUnit { id, deps })
    }

    #[test]
    fn dependency_precedes_dependent() {
        // Listed dependent-first on purpose.
        let units = vec![
            unit(UnitId::IngressController, &[UnitId::Mesh]),
            unit(UnitId::CertManager, &[]),
            unit(UnitId::Mesh, &[]),
        ];

        let ordered = topological_order(&units).unwrap();
        let ids: Vec<UnitId> = ordered.iter().map(|u| u.id()).collect();
        let mesh = ids.iter().position(|id| *id == UnitId::Mesh).unwrap();
        let ingress = ids
            .iter()
            .position(|id| *id == UnitId::IngressController)
            .unwrap();
        assert!(mesh < ingress);
    }

    #[test]
    fn partition_separates_constrained_units() {
        let units = vec![
            unit(UnitId::Mesh, &[]),
            unit(UnitId::IngressController, &[UnitId::Mesh]),
            unit(UnitId::CertManager, &[]),
            unit(UnitId::BuildEngine, &[]),
        ];

        let (sequential, concurrent) = partition(&units).unwrap();
        let seq: Vec<UnitId> = sequential.iter().map(|u| u.id()).collect();
        let conc: Vec<UnitId> = concurrent.iter().map(|u| u.id()).collect();

        assert_eq!(seq, vec![UnitId::Mesh, UnitId::IngressController]);
        assert_eq!(conc, vec![UnitId::CertManager, UnitId::BuildEngine]);
    }

    #[test]
    fn dependency_on_absent_unit_is_ignored() {
        let units = vec![unit(UnitId::IngressController, &[UnitId::Mesh])];
        let (sequential, concurrent) = partition(&units).unwrap();
        assert!(sequential.is_empty());
        assert_eq!(concurrent.len(), 1);
    }

    #[test]
    fn cycle_is_reported() {
        let units = vec![
            unit(UnitId::Mesh, &[UnitId::IngressController]),
            unit(UnitId::IngressController, &[UnitId::Mesh]),
        ];
        let err = topological_order(&units).err().unwrap();
        assert!(err.to_string().contains("cycle"));
    }
}
