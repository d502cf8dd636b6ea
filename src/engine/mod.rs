//! Filtering engine interface consumed by the policy commands.
//!
//! An engine installs one posture at a time. Every operation reports success
//! as a plain `bool`; there is no richer error channel. Engines are expected to
//! fall back to a safe posture themselves when an operation fails.

pub mod store;

use crate::core::{FilteringSettings, RelayEndpoint};

pub use store::StoreEngine;

/// The four lifecycle operations of a filtering engine.
///
/// Implementations must be idempotent: applying the same posture twice, or
/// resetting when nothing is active, succeeds.
pub trait FilteringEngine: Send + Sync {
    /// Permit only traffic to `relay`, plus DHCP/LAN when enabled.
    fn apply_connecting(&self, settings: &FilteringSettings, relay: &RelayEndpoint) -> bool;

    /// Additionally permit the tunnel interface and the tunnel resolver,
    /// atomically superseding any previous posture.
    fn apply_connected(
        &self,
        settings: &FilteringSettings,
        relay: &RelayEndpoint,
        tunnel: &str,
        dns: &str,
    ) -> bool;

    /// Kill switch: block everything.
    fn apply_net_blocked(&self) -> bool;

    /// Remove all filtering state.
    fn reset(&self) -> bool;
}
