// Formats de paquets du protocole: JSON UTF-8 étiqueté par le champ `type`,
// un datagramme UDP par paquet. Jamais d'objet JSON non typé au-delà du parseur.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::RouterId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Packet {
    #[serde(rename = "HELLO")]
    Hello(Hello),
    #[serde(rename = "LSA")]
    Lsa(Lsa),
    #[serde(rename = "DATA")]
    Data(Data),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hello {
    pub router_id: RouterId,
    pub timestamp: f64,
    pub ip_address: String,
    pub known_neighbors: Vec<RouterId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lsa {
    pub router_id: RouterId,
    pub sequence_number: i64,
    pub timestamp: f64,
    pub addresses: Vec<String>,
    pub links: HashMap<RouterId, u32>,
}

/// Optional data-plane demonstrator (spec.md §4.6/§6.1). Not the hard part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Data {
    pub router_id: RouterId,
    pub destination: RouterId,
    pub message: String,
    pub timestamp: f64,
}

pub fn now_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
