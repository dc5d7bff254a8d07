// Configuration par variables d'environnement, à la manière du lecteur de
// configuration du professeur (read_config.rs) mais sans fichier TOML: le
// coeur du protocole ne connaît que l'environnement du conteneur.

use std::collections::HashMap;
use std::env;

use crate::error::{AppError, Result};
use crate::ids::RouterId;

pub const UDP_PORT: u16 = 5000;
pub const BUFFER_SIZE: usize = 4096;
pub const H_INTERVAL_SECS: u64 = 5;
pub const L_INTERVAL_SECS: u64 = 10;
pub const FAILURE_TOLERANCE: u32 = 3;
pub const FAILURE_SCAN_INTERVAL_SECS: u64 = 1;

const NEIGHBOR_COST_PREFIX: &str = "CONNECTED_TO_ROUTER_";

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub router_id: RouterId,
    pub neighbor_costs: HashMap<RouterId, u32>,
    /// Diagnostic only (spec.md §6.2); never used to derive identity.
    pub subnet_hint: Option<String>,
}

/// Reads `CONTAINER_NAME` and any `CONNECTED_TO_ROUTER_<RID>` variables.
/// Missing `CONTAINER_NAME` is a fatal configuration error (spec.md §7).
pub fn load() -> Result<RouterConfig> {
    let router_id = env::var("CONTAINER_NAME")
        .map(RouterId::from)
        .map_err(|_| AppError::ConfigError("CONTAINER_NAME not set in environment".to_string()))?;

    let mut neighbor_costs = HashMap::new();
    for (key, value) in env::vars() {
        let Some(neighbor) = key.strip_prefix(NEIGHBOR_COST_PREFIX) else {
            continue;
        };
        if neighbor.is_empty() {
            continue;
        }
        let cost: u32 = value
            .trim()
            .parse()
            .map_err(|_| AppError::ConfigError(format!("invalid cost for {key}: {value:?}")))?;
        if cost == 0 {
            return Err(AppError::ConfigError(format!(
                "{key} must be a positive integer, got 0"
            )));
        }
        neighbor_costs.insert(RouterId::from(neighbor), cost);
    }

    let subnet_hint = env::var("CONNECTED_TO_SUBNET").ok();

    Ok(RouterConfig {
        router_id,
        neighbor_costs,
        subnet_hint,
    })
}

/// Cost lookup with the default-to-1 fallback from spec.md §3/§4.2.
pub fn lookup_cost(config: &RouterConfig, neighbor: &RouterId) -> u32 {
    config.neighbor_costs.get(neighbor).copied().unwrap_or(1)
}
