//! Engine that records the installed posture in the SQLite policy store.
//!
//! Each request is validated, turned into a [`Ruleset`] and written as the
//! single active policy. The command layer is stateless between invocations,
//! so this store is what carries the posture from one process to the next.
//!
//! The store is opened on first use. A store that cannot be opened makes every
//! operation answer `false`, which the caller reports like any other failure.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use crate::core::{FilteringSettings, PolicyState, RelayEndpoint, Ruleset};
use crate::db::{open_store, Database};

use super::FilteringEngine;

pub struct StoreEngine {
    path: Option<PathBuf>,
    db: OnceLock<Option<Arc<Database>>>,
}

impl StoreEngine {
    /// Engine over an already opened store.
    #[cfg(test)]
    fn new(db: Arc<Database>) -> Self {
        Self {
            path: None,
            db: OnceLock::from(Some(db)),
        }
    }

    /// Engine that opens the store at `path` when the first operation runs.
    pub fn open_lazily(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            db: OnceLock::new(),
        }
    }

    fn store(&self) -> Option<&Arc<Database>> {
        self.db
            .get_or_init(|| {
                let path = self.path.as_ref()?;
                match open_store(path) {
                    Ok(db) => Some(Arc::new(db)),
                    Err(e) => {
                        tracing::warn!("Policy store unavailable: {e:#}");
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Store the ruleset as the active policy. Any store error is a failure.
    fn install(&self, ruleset: Ruleset, detail: &str) -> bool {
        let state = ruleset.state;
        let Some(db) = self.store() else {
            tracing::warn!("Cannot record {state} policy without a policy store");
            return false;
        };

        match db.replace_active(&ruleset, detail) {
            Ok(()) => {
                tracing::info!(
                    "Installed {state} policy ({} rules): {detail}",
                    ruleset.rules.len()
                );
                true
            }
            Err(e) => {
                tracing::warn!("Failed to record {state} policy: {e:#}");
                false
            }
        }
    }

    /// Journal a refused request and report failure.
    fn refuse(&self, state: PolicyState, reason: &str) -> bool {
        tracing::warn!("Refusing {state} policy: {reason}");
        if let Some(db) = self.store() {
            if let Err(e) = db.record_failure(state.as_str(), reason) {
                tracing::warn!("Failed to journal refused {state} policy: {e:#}");
            }
        }
        false
    }
}

fn resolve_relay(relay: &RelayEndpoint) -> Result<SocketAddr, String> {
    relay
        .ip
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, relay.port))
        .map_err(|_| format!("invalid relay address '{}'", relay.ip))
}

fn resolve_dns(dns: &str) -> Result<IpAddr, String> {
    dns.parse::<IpAddr>()
        .map_err(|_| format!("invalid dns address '{dns}'"))
}

fn validate_tunnel(tunnel: &str) -> Result<(), String> {
    if tunnel.is_empty() || tunnel.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(format!("invalid tunnel interface name '{tunnel}'"));
    }
    Ok(())
}

impl FilteringEngine for StoreEngine {
    fn apply_connecting(&self, settings: &FilteringSettings, relay: &RelayEndpoint) -> bool {
        let addr = match resolve_relay(relay) {
            Ok(addr) => addr,
            Err(reason) => return self.refuse(PolicyState::Connecting, &reason),
        };

        let ruleset = Ruleset::connecting(settings, addr, relay.protocol);
        self.install(ruleset, &format!("relay {relay}"))
    }

    fn apply_connected(
        &self,
        settings: &FilteringSettings,
        relay: &RelayEndpoint,
        tunnel: &str,
        dns: &str,
    ) -> bool {
        let resolved = resolve_relay(relay).and_then(|addr| {
            validate_tunnel(tunnel)?;
            Ok((addr, resolve_dns(dns)?))
        });
        let (addr, resolver) = match resolved {
            Ok(v) => v,
            Err(reason) => return self.refuse(PolicyState::Connected, &reason),
        };

        let ruleset = Ruleset::connected(settings, addr, relay.protocol, tunnel, resolver);
        self.install(ruleset, &format!("relay {relay}, tunnel {tunnel}, dns {resolver}"))
    }

    fn apply_net_blocked(&self) -> bool {
        self.install(Ruleset::net_blocked(), "blocking all traffic")
    }

    fn reset(&self) -> bool {
        let Some(db) = self.store() else {
            tracing::warn!("Cannot reset policy without a policy store");
            return false;
        };

        match db.clear_active() {
            Ok(true) => {
                tracing::info!("Cleared active policy");
                true
            }
            Ok(false) => {
                tracing::debug!("Reset requested with no active policy");
                true
            }
            Err(e) => {
                tracing::warn!("Failed to clear active policy: {e:#}");
                false
            }
        }
    }
}
