// Canal de contrôle opérationnel pour lsrctl. Ce n'est pas une variante de
// `Packet` (spec.md §6.1 reste inchangé): le dispatcher ne l'essaie que
// lorsqu'un datagramme ne correspond à aucune variante du protocole
// (spec.md §6.5, ambient tooling, grounded in the teacher's cli_control).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::wire;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlRequest {
    pub command: String,
}

pub async fn handle(state: &Arc<AppState>, command: &str) -> String {
    match command {
        "routing-table" => {
            let shared = state.shared().await;
            let table = shared.lsdb.routing_table();
            if table.is_empty() {
                "routing table empty".to_string()
            } else {
                table
                    .iter()
                    .map(|(dest, hop)| format!("{dest} -> {hop}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        "neighbors" => {
            let shared = state.shared().await;
            if shared.neighbor_cost.is_empty() {
                "no neighbors detected".to_string()
            } else {
                let now = wire::now_secs();
                shared
                    .neighbor_cost
                    .keys()
                    .map(|id| {
                        let recognized = shared.neighbor_ip.contains_key(id);
                        let age = shared.last_hello.get(id).map(|t| now - t).unwrap_or(f64::INFINITY);
                        format!(
                            "{id} ({}) last HELLO {:.1}s ago",
                            if recognized { "recognized" } else { "detected" },
                            age
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        other => format!("unknown command: {other}"),
    }
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
    async fn routing_table_reports_empty_before_any_convergence() {
        let state = state_for("R1");
        assert_eq!(handle(&state, "routing-table").await, "routing table empty");
    }

    #[tokio::test]
    async fn unknown_command_is_reported_as_such() {
        let state = state_for("R1");
        assert_eq!(handle(&state, "bogus").await, "unknown command: bogus");
    }
}
