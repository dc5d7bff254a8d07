// Point d'entrée: journalisation, configuration, découverte des
// interfaces, démarrage des tâches de fond, puis la boucle du récepteur
// de paquets comme tâche principale (spec.md §5, §6.5).

use std::sync::Arc;

use log::info;

use lsrouted::route_install::NetRouteInstaller;
use lsrouted::state::AppState;
use lsrouted::{config, iface, init, tasks};

#[tokio::main]
async fn main() {
    init::init_logging();

    let router_config = match config::load() {
        Ok(c) => c,
        Err(e) => {
            log::error!("fatal configuration error: {e}");
            std::process::exit(1);
        }
    };

    if let Some(subnet) = &router_config.subnet_hint {
        info!("[{}] attached access subnet (diagnostic only): {subnet}", router_config.router_id);
    }

    let interfaces = iface::discover_interfaces();
    info!("[{}] discovered {} interface(s)", router_config.router_id, interfaces.len());

    let router_id = router_config.router_id.clone();
    let state = AppState::new(router_id, interfaces, router_config, Arc::new(NetRouteInstaller));

    let listener = match init::init_listener().await {
        Ok(s) => s,
        Err(e) => {
            log::error!("[{}] fatal: could not bind UDP listener: {e}", state.router_id);
            std::process::exit(1);
        }
    };

    tasks::spawn_hello_task(Arc::clone(&state));
    tasks::spawn_lsa_task(Arc::clone(&state));
    tasks::spawn_failure_detector_task(Arc::clone(&state));

    info!("[{}] routing daemon started", state.router_id);
    lsrouted::packet_loop::run(state, listener).await;
}
