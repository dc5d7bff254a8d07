// Démarrage des boucles de fond: Hello sender, LSA sender (démarrage
// paresseux), détecteur de panne, récepteur de paquets (spec.md §5).

use std::sync::Arc;
use std::time::Duration;

use log::error;

use crate::config::{FAILURE_SCAN_INTERVAL_SECS, H_INTERVAL_SECS, L_INTERVAL_SECS};
use crate::state::AppState;
use crate::{hello, lsa, net_utils, neighbor, packet_loop};

pub fn spawn_hello_task(state: Arc<AppState>) {
    tokio::spawn(async move {
        let socket = match net_utils::bind_sender().await {
            Ok(s) => s,
            Err(e) => {
                error!("[{}] hello sender socket bind failed: {}", state.router_id, e);
                return;
            }
        };
        let mut interval = tokio::time::interval(Duration::from_secs(H_INTERVAL_SECS));
        loop {
            interval.tick().await;
            hello::send_hello_round(&state, &socket).await;
        }
    });
}

/// Dormant until the Neighbor Manager signals the first recognition event
/// (spec.md §4.3, §9 "explicit lifecycle").
pub fn spawn_lsa_task(state: Arc<AppState>) {
    tokio::spawn(async move {
        state.wait_for_lsa_start().await;

        let socket = match net_utils::bind_sender().await {
            Ok(s) => s,
            Err(e) => {
                error!("[{}] LSA sender socket bind failed: {}", state.router_id, e);
                return;
            }
        };
        let mut interval = tokio::time::interval(Duration::from_secs(L_INTERVAL_SECS));
        loop {
            interval.tick().await;
            lsa::originate(&state, &socket).await;
        }
    });
}

pub fn spawn_failure_detector_task(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(FAILURE_SCAN_INTERVAL_SECS));
        loop {
            interval.tick().await;
            neighbor::check_failures(&state).await;
        }
    });
}

pub fn spawn_packet_receiver_task(state: Arc<AppState>, socket: Arc<tokio::net::UdpSocket>) {
    tokio::spawn(async move {
        packet_loop::run(state, socket).await;
    });
}
