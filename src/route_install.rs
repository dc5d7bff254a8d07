// Installateur de routes abstrait derrière un trait étroit, afin que les
// tests puissent substituer une implémentation en mémoire (spec.md §9,
// Design Note "From blocking shell-outs to an abstracted route installer").
// async-trait est emprunté à holo-routing-holo, qui s'en sert pour les mêmes
// frontières de plan de contrôle asynchrone.

use std::net::{IpAddr, Ipv4Addr};

use async_trait::async_trait;
use log::debug;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};

#[async_trait]
pub trait RouteInstaller: Send + Sync {
    /// Installs (replaces) a route to `destination` (a host address or a
    /// `network/prefix` string) via `via`. Must be idempotent.
    async fn install(&self, destination: &str, via: Ipv4Addr) -> Result<()>;
}

/// Installs routes into the real kernel routing table via `net-route`.
pub struct NetRouteInstaller;

#[async_trait]
impl RouteInstaller for NetRouteInstaller {
    async fn install(&self, destination: &str, via: Ipv4Addr) -> Result<()> {
        let (network, prefix) = parse_destination(destination)?;
        let handle = net_route::Handle::new()
            .map_err(|e| AppError::RouteError(format!("cannot open routing handle (permissions?): {e}")))?;
        let route = net_route::Route::new(network, prefix).with_gateway(IpAddr::V4(via));

        match handle.add(&route).await {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!("route add for {destination} failed ({e}), replacing");
                let _ = handle.delete(&route).await;
                handle
                    .add(&route)
                    .await
                    .map_err(|e2| AppError::RouteError(format!("route replace failed for {destination}: {e2}")))
            }
        }
    }
}

fn parse_destination(destination: &str) -> Result<(IpAddr, u8)> {
    if let Some((addr, prefix)) = destination.split_once('/') {
        let ip: Ipv4Addr = addr
            .parse()
            .map_err(|e| AppError::RouteError(format!("invalid network {destination}: {e}")))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|e| AppError::RouteError(format!("invalid prefix {destination}: {e}")))?;
        Ok((IpAddr::V4(ip), prefix))
    } else {
        let ip: Ipv4Addr = destination
            .parse()
            .map_err(|e| AppError::RouteError(format!("invalid address {destination}: {e}")))?;
        Ok((IpAddr::V4(ip), 32))
    }
}

/// Records installs in memory instead of touching the kernel; used by tests
/// and by the `lsrctl` CLI's dry-run mode.
#[derive(Default)]
pub struct FakeRouteInstaller {
    pub installed: Mutex<Vec<(String, Ipv4Addr)>>,
}

#[async_trait]
impl RouteInstaller for FakeRouteInstaller {
    async fn install(&self, destination: &str, via: Ipv4Addr) -> Result<()> {
        self.installed.lock().await.push((destination.to_string(), via));
        Ok(())
    }
}
