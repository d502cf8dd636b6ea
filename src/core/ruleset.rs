//! Rulesets derived from each filtering posture.
//!
//! Rules are ordered; the last rule of every ruleset is `BlockAll`, so anything
//! not explicitly allowed above it is dropped.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

use super::policy::{FilteringSettings, PolicyState, RelayProtocol};

/// Networks reachable when LAN traffic is permitted.
pub const LAN_NETWORKS: &[&str] = &[
    "10.0.0.0/8",
    "172.16.0.0/12",
    "192.168.0.0/16",
    "169.254.0.0/16",
    "fe80::/10",
];

/// DHCPv4 client/server ports.
pub const DHCPV4_PORTS: (u16, u16) = (68, 67);

/// DHCPv6 client/server ports.
pub const DHCPV6_PORTS: (u16, u16) = (546, 547);

pub const DNS_PORT: u16 = 53;

/// A single filtering rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FilterRule {
    AllowLoopback,
    /// Outbound traffic to one endpoint over one protocol.
    AllowEndpoint {
        addr: SocketAddr,
        protocol: RelayProtocol,
    },
    /// UDP between a local and a remote port, any address.
    AllowUdpPorts { local: u16, remote: u16 },
    AllowNetwork { network: String },
    /// Everything through the named interface.
    AllowInterface { interface: String },
    /// DNS over TCP and UDP to one resolver.
    AllowDns { resolver: IpAddr },
    BlockAll,
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterRule::AllowLoopback => write!(f, "allow loopback"),
            FilterRule::AllowEndpoint { addr, protocol } => {
                write!(f, "allow {protocol} to {addr}")
            }
            FilterRule::AllowUdpPorts { local, remote } => {
                write!(f, "allow udp {local} -> {remote}")
            }
            FilterRule::AllowNetwork { network } => write!(f, "allow network {network}"),
            FilterRule::AllowInterface { interface } => {
                write!(f, "allow interface {interface}")
            }
            FilterRule::AllowDns { resolver } => {
                write!(f, "allow dns to {resolver}:{DNS_PORT}")
            }
            FilterRule::BlockAll => write!(f, "block all"),
        }
    }
}

/// An ordered rule list together with the posture it implements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    pub state: PolicyState,
    pub rules: Vec<FilterRule>,
}

impl Ruleset {
    /// Only the relay (plus DHCP/LAN if enabled) is reachable.
    pub fn connecting(
        settings: &FilteringSettings,
        relay: SocketAddr,
        protocol: RelayProtocol,
    ) -> Self {
        let mut rules = allowed_before_tunnel(settings, relay, protocol);
        rules.push(FilterRule::BlockAll);
        Self {
            state: PolicyState::Connecting,
            rules,
        }
    }

    /// The connecting rules plus the tunnel interface and its resolver.
    pub fn connected(
        settings: &FilteringSettings,
        relay: SocketAddr,
        protocol: RelayProtocol,
        tunnel: &str,
        dns: IpAddr,
    ) -> Self {
        let mut rules = allowed_before_tunnel(settings, relay, protocol);
        rules.push(FilterRule::AllowInterface {
            interface: tunnel.to_string(),
        });
        rules.push(FilterRule::AllowDns { resolver: dns });
        rules.push(FilterRule::BlockAll);
        Self {
            state: PolicyState::Connected,
            rules,
        }
    }

    /// Kill switch: nothing leaves the host.
    pub fn net_blocked() -> Self {
        Self {
            state: PolicyState::NetBlocked,
            rules: vec![FilterRule::AllowLoopback, FilterRule::BlockAll],
        }
    }
}

fn allowed_before_tunnel(
    settings: &FilteringSettings,
    relay: SocketAddr,
    protocol: RelayProtocol,
) -> Vec<FilterRule> {
    let mut rules = vec![
        FilterRule::AllowLoopback,
        FilterRule::AllowEndpoint {
            addr: relay,
            protocol,
        },
    ];

    if settings.permit_dhcp {
        for (local, remote) in [DHCPV4_PORTS, DHCPV6_PORTS] {
            rules.push(FilterRule::AllowUdpPorts { local, remote });
        }
    }

    if settings.permit_lan {
        rules.extend(LAN_NETWORKS.iter().map(|network| FilterRule::AllowNetwork {
            network: network.to_string(),
        }));
    }

    rules
}
