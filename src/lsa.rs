// LSA Engine: origination et inondation avec suppression de doublons par
// numéro de séquence (spec.md §4.3).

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use log::info;

use crate::config::UDP_PORT;
use crate::ids::RouterId;
use crate::net_utils;
use crate::neighbor::recompute_routes_locked;
use crate::state::AppState;
use crate::wire::{self, Lsa, Packet};

/// Builds this router's own LSA, installs it into the local LSDB (so the
/// self entry is always fresh before anyone else asks), recomputes SPF,
/// then unicasts it to every recognized neighbor (spec.md §4.3).
pub async fn originate(state: &Arc<AppState>, socket: &tokio::net::UdpSocket) {
    let (lsa, targets) = {
        let mut shared = state.shared().await;
        shared.sequence_number += 1;

        let lsa = Lsa {
            router_id: state.router_id.clone(),
            sequence_number: shared.sequence_number,
            timestamp: wire::now_secs(),
            addresses: state.interfaces.iter().map(|i| i.advertised_address()).collect(),
            links: shared.neighbor_cost.clone(),
        };
        shared.lsdb.update(&lsa);
        recompute_routes_locked(state, &mut shared).await;

        let targets: Vec<(RouterId, Ipv4Addr)> =
            shared.neighbor_ip.iter().map(|(id, ip)| (id.clone(), *ip)).collect();
        (lsa, targets)
    };

    send_to_neighbors(state, socket, &lsa, &targets, "originated").await;
}

/// Applies an incoming LSA to the LSDB and, if it was newer than what we
/// already had, floods the byte-identical packet to every recognized
/// neighbor except the one it arrived from (spec.md §4.3 flooding path).
/// The dispatcher is responsible for discarding self-originated packets.
pub async fn handle_lsa(state: &Arc<AppState>, socket: &tokio::net::UdpSocket, lsa: &Lsa, src_ip: Ipv4Addr) {
    let targets = {
        let mut shared = state.shared().await;
        if !shared.lsdb.update(lsa) {
            return;
        }
        recompute_routes_locked(state, &mut shared).await;

        flood_targets(&shared.neighbor_ip, src_ip)
    };

    send_to_neighbors(state, socket, lsa, &targets, "forwarded").await;
}

/// Every recognized neighbor except the one the LSA arrived from
/// (split-horizon on the incoming link, spec.md §4.3/§8 invariant 2).
fn flood_targets(neighbor_ip: &HashMap<RouterId, Ipv4Addr>, src_ip: Ipv4Addr) -> Vec<(RouterId, Ipv4Addr)> {
    neighbor_ip
        .iter()
        .filter(|(_, ip)| **ip != src_ip)
        .map(|(id, ip)| (id.clone(), *ip))
        .collect()
}

async fn send_to_neighbors(
    state: &Arc<AppState>,
    socket: &tokio::net::UdpSocket,
    lsa: &Lsa,
    targets: &[(RouterId, Ipv4Addr)],
    verb: &str,
) {
    for (neighbor, ip) in targets {
        let addr = SocketAddr::from((*ip, UDP_PORT));
        match net_utils::send_message(socket, addr, &Packet::Lsa(lsa.clone())).await {
            Ok(()) => info!(
                "[{}] {} LSA {}/{} to {}",
                state.router_id, verb, lsa.router_id, lsa.sequence_number, neighbor
            ),
            Err(e) => log::warn!("[{}] failed to send LSA to {}: {}", state.router_id, neighbor, e),
        }
    }
}
