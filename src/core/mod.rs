//! Domain types: policy parameters and the rulesets derived from them.
//!
//! - [`FilteringSettings`] / [`RelayEndpoint`] — typed command parameters
//! - [`PolicyState`] — posture an engine currently enforces
//! - [`Ruleset`] / [`FilterRule`] — ordered rules per posture

pub mod policy;
pub mod ruleset;

pub use policy::{FilteringSettings, PolicyState, RelayEndpoint, RelayProtocol};
pub use ruleset::{FilterRule, Ruleset};
