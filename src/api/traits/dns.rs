// ABOUTME: DNS lookup facility trait.
// ABOUTME: Used to validate domain-to-loadbalancer bindings before install.

use crate::api::error::ApiError;
use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Name resolution, abstracted so install checks can run against a fake
/// resolver in tests.
#[async_trait]
pub trait DnsOps: Send + Sync {
    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, ApiError>;
}

/// Resolver backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDns;

#[async_trait]
impl DnsOps for SystemDns {
    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, ApiError> {
        let addrs = tokio::net::lookup_host((host, 0)).await.map_err(|e| {
            ApiError::Transport {
                operation: "dns lookup",
                message: e.to_string(),
            }
        })?;

        Ok(addrs
            .filter_map(|addr| match addr.ip() {
                std::net::IpAddr::V4(ip) => Some(ip),
                std::net::IpAddr::V6(_) => None,
            })
            .collect())
    }
}
