// Algorithme de Dijkstra sur la LSDB et dérivation du prochain saut, plus
// l'installation des routes (spec.md §4.4).

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::net::Ipv4Addr;

use log::{debug, info, warn};

use crate::ids::RouterId;
use crate::lsdb::Lsdb;
use crate::route_install::RouteInstaller;

#[derive(Debug, Clone, Eq, PartialEq)]
struct HeapEntry {
    cost: u32,
    router: RouterId,
}

// Reverse ordering: BinaryHeap is a max-heap, we want the smallest cost out.
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.cmp(&self.cost).then_with(|| other.router.cmp(&self.router))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns a predecessor map: for each reachable non-source node, the
/// previous node on its shortest path from `self_id`. Placeholder entries
/// are terminal sinks — they relax nothing outward (spec.md §4.4).
pub fn shortest_paths(lsdb: &Lsdb, self_id: &RouterId) -> HashMap<RouterId, RouterId> {
    let mut dist: HashMap<RouterId, u32> = HashMap::new();
    let mut prev: HashMap<RouterId, RouterId> = HashMap::new();
    let mut visited: HashSet<RouterId> = HashSet::new();
    let mut heap = BinaryHeap::new();

    dist.insert(self_id.clone(), 0);
    heap.push(HeapEntry {
        cost: 0,
        router: self_id.clone(),
    });

    while let Some(HeapEntry { cost, router }) = heap.pop() {
        if !visited.insert(router.clone()) {
            continue;
        }
        let Some(entry) = lsdb.entry(&router) else {
            continue;
        };
        for (neighbor, link_cost) in &entry.links {
            if visited.contains(neighbor) {
                continue;
            }
            let candidate = cost.saturating_add(*link_cost);
            let improves = dist.get(neighbor).map_or(true, |&best| candidate < best);
            if improves {
                dist.insert(neighbor.clone(), candidate);
                prev.insert(neighbor.clone(), router.clone());
                heap.push(HeapEntry {
                    cost: candidate,
                    router: neighbor.clone(),
                });
            }
        }
    }

    prev
}

/// Walks predecessors back from `destination` until the predecessor is
/// `self_id`; that node is the next hop. `None` means unreachable.
pub fn next_hop(
    prev: &HashMap<RouterId, RouterId>,
    self_id: &RouterId,
    destination: &RouterId,
) -> Option<RouterId> {
    if destination == self_id {
        return None;
    }
    let mut hop = destination.clone();
    loop {
        let predecessor = prev.get(&hop)?;
        if predecessor == self_id {
            return Some(hop);
        }
        hop = predecessor.clone();
    }
}

pub fn compute_routing_table(lsdb: &Lsdb, self_id: &RouterId) -> HashMap<RouterId, RouterId> {
    let prev = shortest_paths(lsdb, self_id);
    lsdb.table()
        .keys()
        .filter(|destination| *destination != self_id)
        .filter_map(|destination| next_hop(&prev, self_id, destination).map(|hop| (destination.clone(), hop)))
        .collect()
}

/// Recomputes SPF and installs kernel routes. Must be called with the
/// composite shared state locked for the whole sequence (spec.md §5).
pub async fn recompute_and_install(
    lsdb: &mut Lsdb,
    self_id: &RouterId,
    neighbor_ip: &HashMap<RouterId, Ipv4Addr>,
    installer: &dyn RouteInstaller,
) {
    let routes = compute_routing_table(lsdb, self_id);
    lsdb.set_routing_table(routes.clone());

    for (destination, hop) in &routes {
        let Some(gateway) = neighbor_ip.get(hop) else {
            debug!("[{self_id}] route to {destination} via {hop} skipped: gateway not yet recognized");
            continue;
        };
        let Some(entry) = lsdb.entry(destination) else {
            continue;
        };
        for addr in &entry.addresses {
            match installer.install(addr, *gateway).await {
                Ok(()) => info!("[{self_id}] route installed: {addr} via {gateway} [{hop}]"),
                Err(e) => warn!("[{self_id}] failed to install route {addr} via {gateway}: {e}"),
            }
        }
    }
}
