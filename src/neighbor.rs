// Neighbor Manager: détection de panne et point d'entrée unique pour
// recalculer SPF + installer les routes en une seule section critique
// (spec.md §4.5, §5).

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::io::AsyncWriteExt;

use crate::config::{FAILURE_TOLERANCE, H_INTERVAL_SECS};
use crate::dijkstra;
use crate::state::{AppState, Shared};
use crate::wire;

/// Scans `LastHello` and declares any neighbor silent longer than
/// `H_INTERVAL * TOLERANCE` failed, purging it from every shared map, from
/// the LSDB, and from the local self-entry's `links`, then recomputing
/// routes (spec.md §4.5).
pub async fn check_failures(state: &Arc<AppState>) {
    let tolerance = Duration::from_secs(H_INTERVAL_SECS * FAILURE_TOLERANCE as u64).as_secs_f64();
    let now = wire::now_secs();

    let mut shared = state.shared().await;
    let dead: Vec<_> = shared
        .last_hello
        .iter()
        .filter(|(_, &last)| now - last > tolerance)
        .map(|(id, _)| id.clone())
        .collect();

    if dead.is_empty() {
        return;
    }

    for neighbor in &dead {
        shared.neighbor_cost.remove(neighbor);
        shared.neighbor_ip.remove(neighbor);
        shared.last_hello.remove(neighbor);
        shared.lsdb.remove_router(neighbor);
        // Also scrub the local router's own self-entry links, so the stale
        // link doesn't linger until the next LSA origination (spec.md §4.5
        // step 2).
        shared.lsdb.remove_link(&state.router_id, neighbor);
        warn!("[{}] neighbor {} declared failed (no HELLO within tolerance)", state.router_id, neighbor);
    }

    recompute_routes_locked(state, &mut shared).await;
}

/// Locks the composite shared state and recomputes SPF / installs routes.
pub async fn recompute_routes(state: &Arc<AppState>) {
    let mut shared = state.shared().await;
    recompute_routes_locked(state, &mut shared).await;
}

/// Runs with `shared` already locked so that whatever mutation the caller
/// just made, SPF, and route install all happen as one critical section
/// (spec.md §5's `update -> SPF -> install` ordering guarantee).
pub(crate) async fn recompute_routes_locked(state: &Arc<AppState>, shared: &mut Shared) {
    let neighbor_ip = shared.neighbor_ip.clone();
    dijkstra::recompute_and_install(
        &mut shared.lsdb,
        &state.router_id,
        &neighbor_ip,
        state.route_installer.as_ref(),
    )
    .await;

    if !shared.convergence_logged && shared.lsdb.has_converged(&state.router_id) {
        shared.convergence_logged = true;
        let router_count = shared.lsdb.non_placeholder_count();
        log_convergence(state, router_count).await;
    }
}

/// Appends one line to `convergence.txt` the first time every known
/// router is routable from here (spec.md §6.4). Best-effort: write
/// failures are logged, never fatal.
async fn log_convergence(state: &Arc<AppState>, router_count: usize) {
    let elapsed = state.started_at.elapsed().as_secs_f64();
    let line = format!(
        "[{}] {}: {:.3} seconds [{} routers]\n",
        wire::now_secs() as i64,
        state.router_id,
        elapsed,
        router_count
    );

    match tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("convergence.txt")
        .await
    {
        Ok(mut file) => {
            if let Err(e) = file.write_all(line.as_bytes()).await {
                warn!("[{}] failed to write convergence.txt: {}", state.router_id, e);
            } else {
                info!("[{}] converged: {}", state.router_id, line.trim());
            }
        }
        Err(e) => warn!("[{}] failed to open convergence.txt: {}", state.router_id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::iface::Interface;
    use crate::ids::RouterId;
    use crate::route_install::FakeRouteInstaller;
    use crate::wire::Lsa;
    use std::collections::HashMap;
    use std::sync::Arc as StdArc;

    fn state_for(router_id: &str) -> Arc<AppState> {
        let config = RouterConfig {
            router_id: RouterId::from(router_id),
            neighbor_costs: HashMap::new(),
            subnet_hint: None,
        };
        AppState::new(
            RouterId::from(router_id),
            vec![Interface::Link {
                address: "10.0.0.1".parse().unwrap(),
                broadcast: "10.0.0.3".parse().unwrap(),
            }],
            config,
            StdArc::new(FakeRouteInstaller::default()),
        )
    }

    fn lsa(router_id: &str, seq: i64, links: &[(&str, u32)]) -> Lsa {
        Lsa {
            router_id: RouterId::from(router_id),
            sequence_number: seq,
            timestamp: 0.0,
            addresses: vec![format!("10.0.0.{}", seq)],
            links: links.iter().map(|(id, cost)| (RouterId::from(*id), *cost)).collect(),
        }
    }

    #[tokio::test]
    async fn silent_neighbor_is_purged_from_every_map_and_the_lsdb() {
        let state = state_for("R1");
        {
            let mut shared = state.shared().await;
            shared.neighbor_cost.insert(RouterId::from("R2"), 1);
            shared.neighbor_ip.insert(RouterId::from("R2"), "10.0.0.2".parse().unwrap());
            shared.last_hello.insert(RouterId::from("R2"), 0.0);
            shared.lsdb.update(&lsa("R2", 1, &[]));
            // Own self-entry, as if R1 had already originated an LSA
            // advertising R2 as a link (spec.md §4.5 step 2).
            shared.lsdb.update(&lsa("R1", 1, &[("R2", 1), ("R3", 5)]));
        }

        check_failures(&state).await;

        let shared = state.shared().await;
        assert!(!shared.neighbor_cost.contains_key(&RouterId::from("R2")));
        assert!(!shared.neighbor_ip.contains_key(&RouterId::from("R2")));
        assert!(!shared.last_hello.contains_key(&RouterId::from("R2")));
        assert!(shared.lsdb.entry(&RouterId::from("R2")).is_none());

        let self_entry = shared.lsdb.entry(&RouterId::from("R1")).unwrap();
        assert!(!self_entry.links.contains_key(&RouterId::from("R2")));
        assert!(self_entry.links.contains_key(&RouterId::from("R3")));
    }

    #[tokio::test]
    async fn recent_hello_keeps_neighbor_alive() {
        let state = state_for("R1");
        {
            let mut shared = state.shared().await;
            shared.neighbor_cost.insert(RouterId::from("R2"), 1);
            shared.last_hello.insert(RouterId::from("R2"), wire::now_secs());
        }
        check_failures(&state).await;
        let shared = state.shared().await;
        assert!(shared.neighbor_cost.contains_key(&RouterId::from("R2")));
    }

    #[tokio::test]
    async fn convergence_is_logged_at_most_once() {
        let state = state_for("R1");
        {
            let mut shared = state.shared().await;
            shared.neighbor_ip.insert(RouterId::from("R2"), "10.0.0.2".parse().unwrap());
            shared.lsdb.update(&lsa("R1", 1, &[("R2", 1)]));
            shared.lsdb.update(&lsa("R2", 1, &[("R1", 1)]));
        }
        recompute_routes(&state).await;
        assert!(state.shared().await.convergence_logged);
        recompute_routes(&state).await;
        assert!(state.shared().await.convergence_logged);
    }
}
