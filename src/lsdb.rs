// LSDB: base de données d'état de liens répliquée (spec.md §4.4).

use std::collections::HashMap;

use log::debug;

use crate::ids::RouterId;
use crate::wire::Lsa;

#[derive(Debug, Clone)]
pub struct LsdbEntry {
    pub sequence_number: i64,
    pub timestamp: f64,
    pub addresses: Vec<String>,
    pub links: HashMap<RouterId, u32>,
}

impl LsdbEntry {
    /// Stub inserted when a link mentions a router not yet heard from
    /// directly. Exists only to keep the graph closed during SPF.
    pub fn placeholder() -> Self {
        LsdbEntry {
            sequence_number: -1,
            timestamp: 0.0,
            addresses: Vec::new(),
            links: HashMap::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.sequence_number == -1
    }
}

#[derive(Debug, Default)]
pub struct Lsdb {
    table: HashMap<RouterId, LsdbEntry>,
    routing_table: HashMap<RouterId, RouterId>,
}

impl Lsdb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an incoming (or locally-originated) LSA. Returns `true` if the
    /// LSDB actually changed (strictly newer sequence number), `false` for a
    /// stale or duplicate LSA, which the caller must silently drop without
    /// flooding it further (spec.md §4.3/§4.4).
    pub fn update(&mut self, lsa: &Lsa) -> bool {
        if let Some(existing) = self.table.get(&lsa.router_id) {
            if lsa.sequence_number <= existing.sequence_number {
                return false;
            }
        }

        self.table.insert(
            lsa.router_id.clone(),
            LsdbEntry {
                sequence_number: lsa.sequence_number,
                timestamp: lsa.timestamp,
                addresses: lsa.addresses.clone(),
                links: lsa.links.clone(),
            },
        );

        for neighbor in lsa.links.keys() {
            if !self.table.contains_key(neighbor) {
                debug!("LSDB: discovered router {neighbor} via {}'s links", lsa.router_id);
                self.table.insert(neighbor.clone(), LsdbEntry::placeholder());
            }
        }

        true
    }

    /// Removes a router entirely, used by the failure detector (spec.md §4.5).
    pub fn remove_router(&mut self, router_id: &RouterId) {
        self.table.remove(router_id);
        self.routing_table.remove(router_id);
    }

    /// Removes `neighbor` from `router_id`'s own cached `links` map, used by
    /// the failure detector to scrub a dead neighbor out of the local
    /// self-entry (spec.md §4.5 step 2: "every link referring to it in the
    /// local self-entry"), not just its own LSDB entry. No-op if either side
    /// is absent.
    pub fn remove_link(&mut self, router_id: &RouterId, neighbor: &RouterId) {
        if let Some(entry) = self.table.get_mut(router_id) {
            entry.links.remove(neighbor);
        }
    }

    pub fn entry(&self, router_id: &RouterId) -> Option<&LsdbEntry> {
        self.table.get(router_id)
    }

    pub fn table(&self) -> &HashMap<RouterId, LsdbEntry> {
        &self.table
    }

    pub fn routing_table(&self) -> &HashMap<RouterId, RouterId> {
        &self.routing_table
    }

    pub fn set_routing_table(&mut self, routing_table: HashMap<RouterId, RouterId>) {
        self.routing_table = routing_table;
    }

    /// True once every non-placeholder entry other than `self_id` has a route.
    pub fn has_converged(&self, self_id: &RouterId) -> bool {
        let mut saw_any = false;
        for (router_id, entry) in &self.table {
            if entry.is_placeholder() || router_id == self_id {
                continue;
            }
            saw_any = true;
            if !self.routing_table.contains_key(router_id) {
                return false;
            }
        }
        saw_any
    }

    pub fn non_placeholder_count(&self) -> usize {
        self.table.values().filter(|e| !e.is_placeholder()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lsa(router_id: &str, seq: i64, links: &[(&str, u32)]) -> Lsa {
        Lsa {
            router_id: RouterId::from(router_id),
            sequence_number: seq,
            timestamp: 0.0,
            addresses: vec![format!("10.0.0.{}", seq)],
            links: links
                .iter()
                .map(|(id, cost)| (RouterId::from(*id), *cost))
                .collect(),
        }
    }

    #[test]
    fn duplicate_or_stale_lsa_is_rejected() {
        let mut db = Lsdb::new();
        assert!(db.update(&lsa("R2", 1, &[])));
        assert!(!db.update(&lsa("R2", 1, &[])));
        assert!(!db.update(&lsa("R2", 0, &[])));
        assert!(db.update(&lsa("R2", 2, &[])));
    }

    #[test]
    fn unknown_link_target_becomes_placeholder() {
        let mut db = Lsdb::new();
        db.update(&lsa("R1", 1, &[("R2", 5)]));
        let entry = db.entry(&RouterId::from("R2")).unwrap();
        assert!(entry.is_placeholder());
    }

    #[test]
    fn placeholder_is_superseded_by_real_lsa() {
        let mut db = Lsdb::new();
        db.update(&lsa("R1", 1, &[("R2", 5)]));
        assert!(db.update(&lsa("R2", 1, &[("R1", 5)])));
        assert!(!db.entry(&RouterId::from("R2")).unwrap().is_placeholder());
    }

    #[test]
    fn remove_link_scrubs_the_local_self_entry_without_deleting_it() {
        let mut db = Lsdb::new();
        db.update(&lsa("R1", 1, &[("R2", 1), ("R3", 5)]));

        db.remove_link(&RouterId::from("R1"), &RouterId::from("R2"));

        let entry = db.entry(&RouterId::from("R1")).unwrap();
        assert!(!entry.links.contains_key(&RouterId::from("R2")));
        assert!(entry.links.contains_key(&RouterId::from("R3")));
    }

    #[test]
    fn remove_link_is_a_no_op_when_router_unknown() {
        let mut db = Lsdb::new();
        db.remove_link(&RouterId::from("R1"), &RouterId::from("R2"));
        assert!(db.entry(&RouterId::from("R1")).is_none());
    }

    #[test]
    fn convergence_requires_every_non_placeholder_entry_routed() {
        let mut db = Lsdb::new();
        let r1 = RouterId::from("R1");
        db.update(&lsa("R2", 1, &[]));
        assert!(!db.has_converged(&r1));
        db.set_routing_table(HashMap::from([(RouterId::from("R2"), RouterId::from("R2"))]));
        assert!(db.has_converged(&r1));
    }
}
