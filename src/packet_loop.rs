// Packet Receiver / Dispatcher: un seul socket UDP, décodage JSON typé,
// dispatch vers le Hello Engine, le LSA Engine, ou la démonstration DATA
// (spec.md §4.6).

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use log::{debug, warn};

use crate::config::{BUFFER_SIZE, UDP_PORT};
use crate::control::{self, ControlRequest};
use crate::net_utils;
use crate::state::AppState;
use crate::wire::{Data, Packet};
use crate::{hello, lsa};

/// Runs forever, reading datagrams off the shared listening socket and
/// dispatching them by wire type. Never returns except on a fatal socket
/// error, which it logs before exiting the task.
pub async fn run(state: Arc<AppState>, socket: Arc<tokio::net::UdpSocket>) {
    let mut buf = vec![0u8; BUFFER_SIZE];
    loop {
        let (len, src_addr) = match socket.recv_from(&mut buf).await {
            Ok(v) => v,
            Err(e) => {
                warn!("[{}] UDP receive error: {}", state.router_id, e);
                continue;
            }
        };

        let IpAddr::V4(src_ip) = src_addr.ip() else {
            debug!("[{}] dropped non-IPv4 datagram from {}", state.router_id, src_addr);
            continue;
        };

        let packet: Packet = match serde_json::from_slice(&buf[..len]) {
            Ok(p) => p,
            Err(_) => {
                if let Ok(request) = serde_json::from_slice::<ControlRequest>(&buf[..len]) {
                    let response = control::handle(&state, &request.command).await;
                    if let Err(e) = net_utils::send_text(&socket, src_addr, &response).await {
                        warn!("[{}] failed to send control response to {}: {}", state.router_id, src_addr, e);
                    }
                } else {
                    debug!("[{}] dropped unrecognized datagram from {}", state.router_id, src_addr);
                }
                continue;
            }
        };

        let origin = match &packet {
            Packet::Hello(p) => &p.router_id,
            Packet::Lsa(p) => &p.router_id,
            Packet::Data(p) => &p.router_id,
        };
        if *origin == state.router_id {
            continue;
        }

        match packet {
            Packet::Hello(msg) => {
                hello::handle_hello(&state, &msg, src_ip).await;
            }
            Packet::Lsa(msg) => {
                lsa::handle_lsa(&state, &socket, &msg, src_ip).await;
            }
            Packet::Data(msg) => {
                handle_data(&state, &socket, msg).await;
            }
        }
    }
}

/// Minimal data-plane demonstrator (spec.md §4.6, §1 "not the hard part"):
/// deliver if we're the destination, else forward along the current
/// routing table, else drop silently.
async fn handle_data(state: &Arc<AppState>, socket: &tokio::net::UdpSocket, data: Data) {
    if data.destination == state.router_id {
        log::info!("[{}] DATA delivered from {}: {}", state.router_id, data.router_id, data.message);
        return;
    }

    let (next_hop, gateway) = {
        let shared = state.shared().await;
        let Some(next_hop) = shared.lsdb.routing_table().get(&data.destination).cloned() else {
            debug!("[{}] DATA to {} dropped: no route", state.router_id, data.destination);
            return;
        };
        let gateway = shared.neighbor_ip.get(&next_hop).copied();
        (next_hop, gateway)
    };

    let Some(gateway) = gateway else {
        debug!(
            "[{}] DATA to {} dropped: next hop {} not yet resolvable",
            state.router_id, data.destination, next_hop
        );
        return;
    };

    let addr = SocketAddr::from((gateway, UDP_PORT));
    let destination = data.destination.clone();
    if let Err(e) = net_utils::send_message(socket, addr, &Packet::Data(data)).await {
        warn!("[{}] failed to forward DATA to {} via {}: {}", state.router_id, destination, next_hop, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::iface::Interface;
    use crate::ids::RouterId;
    use crate::route_install::FakeRouteInstaller;
    use crate::wire::now_secs;
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
    async fn data_addressed_to_self_is_delivered_not_forwarded() {
        let state = state_for("R1");
        let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let data = Data {
            router_id: RouterId::from("R2"),
            destination: RouterId::from("R1"),
            message: "hi".to_string(),
            timestamp: now_secs(),
        };
        handle_data(&state, &socket, data).await;
    }

    #[tokio::test]
    async fn data_with_no_route_is_dropped_silently() {
        let state = state_for("R1");
        let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let data = Data {
            router_id: RouterId::from("R2"),
            destination: RouterId::from("R9"),
            message: "hi".to_string(),
            timestamp: now_secs(),
        };
        handle_data(&state, &socket, data).await;
    }
}
