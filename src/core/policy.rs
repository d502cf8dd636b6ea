//! Typed policy parameters handed to the filtering engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// General filtering settings shared by the connecting and connected postures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteringSettings {
    pub permit_dhcp: bool,
    pub permit_lan: bool,
}

/// Transport protocol used to reach the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayProtocol {
    Tcp,
    Udp,
}

impl fmt::Display for RelayProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayProtocol::Tcp => f.write_str("tcp"),
            RelayProtocol::Udp => f.write_str("udp"),
        }
    }
}

/// The remote endpoint the VPN client negotiates the tunnel through.
///
/// `ip` is the literal as given on the command line. Syntactic validation is
/// left to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayEndpoint {
    pub ip: String,
    pub port: u16,
    pub protocol: RelayProtocol,
}

impl fmt::Display for RelayEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.ip, self.port, self.protocol)
    }
}

/// Filtering posture currently installed by an engine.
///
/// There is no `Reset` variant: a reset engine simply has no active posture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyState {
    Connecting,
    Connected,
    NetBlocked,
}

impl PolicyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyState::Connecting => "connecting",
            PolicyState::Connected => "connected",
            PolicyState::NetBlocked => "netblocked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "connecting" => Some(PolicyState::Connecting),
            "connected" => Some(PolicyState::Connected),
            "netblocked" => Some(PolicyState::NetBlocked),
            _ => None,
        }
    }
}

impl fmt::Display for PolicyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
