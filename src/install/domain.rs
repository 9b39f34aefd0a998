// ABOUTME: System domain discovery and load-balancer binding validation.
// ABOUTME: Bounded polling of the ingress address; wildcard domain derivation.

use super::error::InstallError;
use super::unit::UnitId;
use crate::api::{ApiError, ClusterOps, DnsOps};
use crate::config::{Budgets, InstallationOptions};
use crate::output::Output;
use crate::retry::{RetryError, RetryPolicy};
use std::net::Ipv4Addr;

/// Service name under which the ingress controller exposes its
/// load-balancer.
const INGRESS_SERVICE: &str = "ingress-controller";

/// Resolve the system domain the platform will hand out routes under.
///
/// An explicitly configured domain wins. Otherwise the ingress controller's
/// load-balancer address is polled with a bounded budget and a wildcard DNS
/// domain is derived from it; assignment is asynchronous on most clusters,
/// so the address may take a while to appear. A configured
/// `loadbalancer_ip` must additionally appear among the domain's A records.
pub async fn ensure_system_domain(
    cluster: &dyn ClusterOps,
    dns: &dyn DnsOps,
    options: &InstallationOptions,
    budgets: &Budgets,
    output: &Output,
) -> Result<String, InstallError> {
    let domain = if options.is_set("system_domain") {
        options
            .get_str("system_domain")
            .map_err(|e| InstallError::Configuration {
                option: "system_domain",
                reason: e.to_string(),
            })?
            .to_string()
    } else {
        output.progress("  → Waiting for the ingress load-balancer address...");
        let address = discover_ingress_address(cluster, budgets).await?;
        format!("{address}.nip.io")
    };

    if options.is_set("loadbalancer_ip") {
        let address = options
            .get_str("loadbalancer_ip")
            .map_err(|e| InstallError::Configuration {
                option: "loadbalancer_ip",
                reason: e.to_string(),
            })?;
        validate_binding(dns, &domain, address).await?;
    }

    output.progress(&format!("  → Using system domain: {domain}"));
    Ok(domain)
}

async fn discover_ingress_address(
    cluster: &dyn ClusterOps,
    budgets: &Budgets,
) -> Result<String, InstallError> {
    let policy = RetryPolicy::new(budgets.domain_attempts, budgets.domain_delay);
    let namespace = UnitId::IngressController.namespace();

    let result = policy
        .run(
            "loadbalancer address",
            || async {
                match cluster
                    .load_balancer_address(namespace, INGRESS_SERVICE)
                    .await
                {
                    Ok(Some(address)) if !address.is_empty() => Ok(address),
                    Ok(_) => Err(AddressPoll::NotAssigned),
                    Err(e) => Err(AddressPoll::Api(e)),
                }
            },
            |e| match e {
                AddressPoll::NotAssigned => true,
                AddressPoll::Api(e) => e.is_retryable(),
            },
        )
        .await;

    match result {
        Ok(address) => Ok(address),
        Err(RetryError::Exhausted { attempts, last }) => Err(InstallError::Configuration {
            option: "system_domain",
            reason: format!(
                "no value given and no load-balancer address appeared after \
                 {attempts} attempts ({last}); pass system_domain explicitly"
            ),
        }),
        Err(RetryError::Rejected(AddressPoll::Api(e))) => Err(InstallError::Api(e)),
        Err(RetryError::Rejected(AddressPoll::NotAssigned)) => {
            unreachable!("NotAssigned is retryable")
        }
    }
}

/// Check that the chosen domain resolves to the load-balancer address the
/// caller claims to own. A mismatch would hand every application route to
/// someone else's ingress.
async fn validate_binding(
    dns: &dyn DnsOps,
    domain: &str,
    address: &str,
) -> Result<(), InstallError> {
    let expected: Ipv4Addr = address.parse().map_err(|_| InstallError::Configuration {
        option: "loadbalancer_ip",
        reason: format!("{address} is not a valid IPv4 address"),
    })?;

    let resolved = dns.lookup_ipv4(domain).await?;
    if resolved.contains(&expected) {
        return Ok(());
    }

    Err(InstallError::DomainMismatch {
        domain: domain.to_string(),
        address: address.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
enum AddressPoll {
    #[error("load-balancer address not assigned yet")]
    NotAssigned,

    #[error(transparent)]
    Api(ApiError),
}
