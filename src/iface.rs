// Interface Inspector: énumération des interfaces locales, une fois au
// démarrage. Pur, sans état partagé (spec.md §4.1).

use pnet::datalink;
use pnet::ipnetwork::IpNetwork;
use std::net::Ipv4Addr;

/// An access-subnet interface is advertised by its /24 network prefix
/// convention used throughout this topology (spec.md §9 resolves the
/// access-subnet ambiguity in favor of the prefix form).
const ACCESS_SUBNET_PREFIX_LEN: u8 = 24;

/// Access subnets and inter-router links are both laid out as /24s on this
/// topology (`examples/original_source/generate_docker_compose.py`'s
/// `10.10.{n}.0/24` link subnets vs. `192.168.{n}.0/24` host subnets), so
/// prefix length alone can't tell them apart. The address range is the only
/// signal that does, matching the original's own discriminator
/// (`examples/original_source/shared/router.py`'s `address.startswith("192")`).
const ACCESS_SUBNET_OCTET: &str = "192";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interface {
    /// An inter-router link: has a broadcast address, HELLO-eligible.
    Link { address: Ipv4Addr, broadcast: Ipv4Addr },
    /// An access subnet: advertised as the network prefix, never a host address.
    AccessSubnet { network: String },
}

impl Interface {
    /// What this interface contributes to an LSA's `addresses` list.
    pub fn advertised_address(&self) -> String {
        match self {
            Interface::Link { address, .. } => address.to_string(),
            Interface::AccessSubnet { network } => network.clone(),
        }
    }

    /// `(local address, broadcast address)` for interfaces the Hello Engine
    /// should broadcast on; `None` for access subnets.
    pub fn broadcast_target(&self) -> Option<(Ipv4Addr, Ipv4Addr)> {
        match self {
            Interface::Link { address, broadcast } => Some((*address, *broadcast)),
            Interface::AccessSubnet { .. } => None,
        }
    }
}

/// Enumerates local IPv4 interfaces on the container-networking `eth*`
/// family (spec.md §4.1). Loopback is skipped. `192.x.x.x` addresses are
/// access subnets, advertised by /24 network prefix only; everything else
/// is an inter-router link, keeping its host address and broadcast.
pub fn discover_interfaces() -> Vec<Interface> {
    datalink::interfaces()
        .into_iter()
        .filter(|iface| iface.name.starts_with("eth"))
        .flat_map(|iface| iface.ips.into_iter().filter_map(classify))
        .collect()
}

fn classify(ip_network: IpNetwork) -> Option<Interface> {
    let IpNetwork::V4(v4) = ip_network else {
        return None;
    };
    let address = v4.ip();
    if address.is_loopback() {
        return None;
    }
    if address.to_string().starts_with(ACCESS_SUBNET_OCTET) {
        let [a, b, c, _] = address.octets();
        Some(Interface::AccessSubnet {
            network: format!("{a}.{b}.{c}.0/{ACCESS_SUBNET_PREFIX_LEN}"),
        })
    } else {
        Some(Interface::Link {
            address,
            broadcast: v4.broadcast(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_advertises_host_address() {
        let iface = Interface::Link {
            address: "10.0.0.1".parse().unwrap(),
            broadcast: "10.0.0.3".parse().unwrap(),
        };
        assert_eq!(iface.advertised_address(), "10.0.0.1");
        assert!(iface.broadcast_target().is_some());
    }

    #[test]
    fn access_subnet_advertises_network_not_host() {
        let iface = Interface::AccessSubnet {
            network: "192.168.2.0/24".to_string(),
        };
        assert_eq!(iface.advertised_address(), "192.168.2.0/24");
        assert!(iface.broadcast_target().is_none());
    }

    #[test]
    fn classify_discriminates_by_address_range_not_prefix_length() {
        // Both an inter-router link and a host subnet are /24s on this
        // topology (10.10.{n}.0/24 vs 192.168.{n}.0/24); prefix length can't
        // tell them apart, so classify() must key off the 192.x.x.x range.
        let link: IpNetwork = "10.10.0.2/24".parse().unwrap();
        let subnet: IpNetwork = "192.168.0.2/24".parse().unwrap();

        assert!(matches!(classify(link), Some(Interface::Link { .. })));
        match classify(subnet) {
            Some(Interface::AccessSubnet { network }) => assert_eq!(network, "192.168.0.0/24"),
            other => panic!("expected AccessSubnet, got {other:?}"),
        }
    }
}
