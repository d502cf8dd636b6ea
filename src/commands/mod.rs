//! Command handlers, organized by concern.
//!
//! - `arguments`: `name=value` argument table
//! - `logic`: value translators and parameter builders (pure, unit-testable)
//! - `dispatcher`: subcommand name → handler table
//! - `policy`: lifecycle subcommands driving the filtering engine
//! - `status`: active policy and journal reporting

pub mod arguments;
pub mod dispatcher;
pub mod logic;
pub mod policy;
pub mod status;

use std::sync::Arc;

pub use arguments::ArgumentTable;
pub use policy::Policy;

/// Receives the human-readable outcome of each command.
pub type MessageSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Whether the engine accepted the requested policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}
