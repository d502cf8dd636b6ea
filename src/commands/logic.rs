//! Pure translation from textual argument values to typed policy parameters.
//!
//! Two failure policies live here and must not be merged: an absent required
//! argument is an error, while a present value that is not recognized falls
//! back to the non-permitting default.

use crate::config::{ARG_DHCP, ARG_LAN, ARG_PORT, ARG_PROTOCOL, ARG_RELAY};
use crate::core::{FilteringSettings, RelayEndpoint, RelayProtocol};
use crate::error::PolicyError;

use super::arguments::ArgumentTable;

/// `"yes"` (any case) is true; every other value is false.
pub fn translate_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("yes")
}

/// `"tcp"` (any case) is TCP; every other value is UDP.
pub fn translate_protocol(value: &str) -> RelayProtocol {
    if value.eq_ignore_ascii_case("tcp") {
        RelayProtocol::Tcp
    } else {
        RelayProtocol::Udp
    }
}

/// Parse a base-10 port number. Signs and whitespace are rejected.
pub fn translate_port(value: &str) -> Result<u16, PolicyError> {
    let parse_error = |reason: &str| PolicyError::Parse {
        key: ARG_PORT.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(parse_error("expected a decimal integer"));
    }

    value
        .parse::<u16>()
        .map_err(|_| parse_error("port must be between 0 and 65535"))
}

/// The IP literal is passed through untouched.
pub fn translate_ip(value: &str) -> String {
    value.to_string()
}

/// Build filtering settings from the `dhcp` and `lan` arguments.
pub fn build_settings(arguments: &ArgumentTable) -> Result<FilteringSettings, PolicyError> {
    Ok(FilteringSettings {
        permit_dhcp: translate_bool(arguments.get(ARG_DHCP)?),
        permit_lan: translate_bool(arguments.get(ARG_LAN)?),
    })
}

/// Build the relay endpoint from the `relay`, `port` and `protocol` arguments.
pub fn build_relay(arguments: &ArgumentTable) -> Result<RelayEndpoint, PolicyError> {
    let ip = translate_ip(arguments.get(ARG_RELAY)?);
    let port = translate_port(arguments.get(ARG_PORT)?)?;
    let protocol = translate_protocol(arguments.get(ARG_PROTOCOL)?);

    Ok(RelayEndpoint { ip, port, protocol })
}
