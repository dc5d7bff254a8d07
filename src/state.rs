// Etat partagé du démon. Un seul mutex grossier protège l'état composite
// (NeighborCost, NeighborIP, LastHello, LSDB, sequence_number) afin que
// update -> SPF -> install s'exécute comme une seule section critique
// (spec.md §5). La contention est négligeable: les événements arrivent à
// l'échelle de la seconde, pas de la microseconde.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, MutexGuard, Notify};

use crate::config::RouterConfig;
use crate::iface::Interface;
use crate::ids::RouterId;
use crate::lsdb::Lsdb;
use crate::route_install::RouteInstaller;

pub struct Shared {
    pub neighbor_cost: HashMap<RouterId, u32>,
    pub neighbor_ip: HashMap<RouterId, Ipv4Addr>,
    pub last_hello: HashMap<RouterId, f64>,
    pub lsdb: Lsdb,
    pub sequence_number: i64,
    pub convergence_logged: bool,
}

impl Shared {
    fn new() -> Self {
        Shared {
            neighbor_cost: HashMap::new(),
            neighbor_ip: HashMap::new(),
            last_hello: HashMap::new(),
            lsdb: Lsdb::new(),
            sequence_number: 0,
            convergence_logged: false,
        }
    }
}

pub struct AppState {
    pub router_id: RouterId,
    pub interfaces: Vec<Interface>,
    pub config: RouterConfig,
    pub started_at: Instant,
    pub route_installer: Arc<dyn RouteInstaller>,
    lsa_started: AtomicBool,
    lsa_start_notify: Notify,
    shared: Mutex<Shared>,
}

impl AppState {
    pub fn new(
        router_id: RouterId,
        interfaces: Vec<Interface>,
        config: RouterConfig,
        route_installer: Arc<dyn RouteInstaller>,
    ) -> Arc<Self> {
        Arc::new(AppState {
            router_id,
            interfaces,
            config,
            started_at: Instant::now(),
            route_installer,
            lsa_started: AtomicBool::new(false),
            lsa_start_notify: Notify::new(),
            shared: Mutex::new(Shared::new()),
        })
    }

    pub async fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().await
    }

    /// Idempotently signals the LSA Engine to begin originating. Safe to
    /// call from every recognition event; only the first call matters
    /// (spec.md §4.2/§4.5, Design Note "explicit lifecycle").
    pub fn trigger_lsa_start(&self) {
        if !self.lsa_started.swap(true, Ordering::SeqCst) {
            self.lsa_start_notify.notify_one();
        }
    }

    pub fn lsa_is_started(&self) -> bool {
        self.lsa_started.load(Ordering::SeqCst)
    }

    /// Resolves once `trigger_lsa_start` has fired, whether that happens
    /// before or after this call (tokio::sync::Notify stores one permit).
    pub async fn wait_for_lsa_start(&self) {
        if self.lsa_is_started() {
            return;
        }
        self.lsa_start_notify.notified().await;
    }
}
