// Hello Engine: diffusion périodique de HELLO et traitement du chemin de
// réception (spec.md §4.2).

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use log::{info, warn};

use crate::config::{self, UDP_PORT};
use crate::net_utils;
use crate::state::AppState;
use crate::wire::{self, Hello, Packet};

/// Broadcasts one HELLO per interface that has a broadcast address
/// (access subnets are skipped — they never carry HELLO traffic).
pub async fn send_hello_round(state: &Arc<AppState>, socket: &tokio::net::UdpSocket) {
    let known_neighbors = {
        let shared = state.shared().await;
        let mut ids: Vec<_> = shared.neighbor_cost.keys().cloned().collect();
        ids.sort();
        ids
    };

    for iface in &state.interfaces {
        let Some((address, broadcast)) = iface.broadcast_target() else {
            continue;
        };
        let hello = Hello {
            router_id: state.router_id.clone(),
            timestamp: wire::now_secs(),
            ip_address: address.to_string(),
            known_neighbors: known_neighbors.clone(),
        };
        let addr = SocketAddr::from((broadcast, UDP_PORT));
        match net_utils::send_message(socket, addr, &Packet::Hello(hello)).await {
            Ok(()) => info!("[{}] sent HELLO on {} to {}", state.router_id, address, addr),
            Err(e) => warn!("[{}] failed to send HELLO to {}: {}", state.router_id, addr, e),
        }
    }
}

/// Applies a received HELLO. Returns `true` if this HELLO newly promoted
/// the sender from detected to recognized (spec.md §4.2 receive path).
/// The caller (the packet dispatcher) is responsible for discarding
/// self-originated packets before this is reached.
pub async fn handle_hello(state: &Arc<AppState>, hello: &Hello, sender_ip: Ipv4Addr) -> bool {
    let mut newly_recognized = false;
    {
        let mut shared = state.shared().await;
        let cost = config::lookup_cost(&state.config, &hello.router_id);
        shared.neighbor_cost.insert(hello.router_id.clone(), cost);
        shared.last_hello.insert(hello.router_id.clone(), hello.timestamp);

        if hello.known_neighbors.contains(&state.router_id)
            && !shared.neighbor_ip.contains_key(&hello.router_id)
        {
            shared.neighbor_ip.insert(hello.router_id.clone(), sender_ip);
            newly_recognized = true;
        }
    }

    if newly_recognized {
        info!("[{}] neighbor {} recognized (bidirectional)", state.router_id, hello.router_id);
        state.trigger_lsa_start();
    }
    newly_recognized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::iface::Interface;
    use crate::ids::RouterId;
    use crate::route_install::FakeRouteInstaller;
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

    #[tokio::test]
    async fn one_way_hello_is_detected_but_not_recognized() {
        let state = state_for("R1");
        let hello = Hello {
            router_id: RouterId::from("R2"),
            timestamp: 1.0,
            ip_address: "10.0.0.2".to_string(),
            known_neighbors: vec![],
        };
        let promoted = handle_hello(&state, &hello, "10.0.0.2".parse().unwrap()).await;
        assert!(!promoted);
        let shared = state.shared().await;
        assert!(shared.neighbor_cost.contains_key(&RouterId::from("R2")));
        assert!(!shared.neighbor_ip.contains_key(&RouterId::from("R2")));
        assert!(!state.lsa_is_started());
    }

    #[tokio::test]
    async fn hello_listing_self_promotes_to_recognized_and_starts_lsa_engine() {
        let state = state_for("R1");
        let hello = Hello {
            router_id: RouterId::from("R2"),
            timestamp: 1.0,
            ip_address: "10.0.0.2".to_string(),
            known_neighbors: vec![RouterId::from("R1")],
        };
        let promoted = handle_hello(&state, &hello, "10.0.0.2".parse().unwrap()).await;
        assert!(promoted);
        let shared = state.shared().await;
        assert_eq!(shared.neighbor_ip.get(&RouterId::from("R2")), Some(&"10.0.0.2".parse().unwrap()));
        drop(shared);
        assert!(state.lsa_is_started());
    }

    #[tokio::test]
    async fn already_recognized_neighbor_is_not_promoted_twice() {
        let state = state_for("R1");
        let hello = Hello {
            router_id: RouterId::from("R2"),
            timestamp: 1.0,
            ip_address: "10.0.0.2".to_string(),
            known_neighbors: vec![RouterId::from("R1")],
        };
        assert!(handle_hello(&state, &hello, "10.0.0.2".parse().unwrap()).await);
        assert!(!handle_hello(&state, &hello, "10.0.0.2".parse().unwrap()).await);
    }
}
