//! Centralized runtime constants for guardctl.
//!
//! Command names, argument keys, report messages and store settings are
//! collected here so they can be found and adjusted in a single place.

use std::path::PathBuf;

/// Name of the top-level policy command.
pub const POLICY_COMMAND_NAME: &str = "policy";

/// One-line description of the policy command.
pub const POLICY_COMMAND_DESCRIPTION: &str = "Activate and reset policies.";

// ---- Subcommands ----

pub const SUBCOMMAND_CONNECTING: &str = "connecting";
pub const SUBCOMMAND_CONNECTED: &str = "connected";
pub const SUBCOMMAND_NET_BLOCKED: &str = "netblocked";
pub const SUBCOMMAND_RESET: &str = "reset";

// ---- Argument keys ----

pub const ARG_DHCP: &str = "dhcp";
pub const ARG_LAN: &str = "lan";
pub const ARG_RELAY: &str = "relay";
pub const ARG_PORT: &str = "port";
pub const ARG_PROTOCOL: &str = "protocol";
pub const ARG_TUNNEL: &str = "tunnel";
pub const ARG_DNS: &str = "dns";

// ---- Report messages ----

pub const MSG_APPLY_SUCCESS: &str = "Successfully applied policy.";
pub const MSG_APPLY_FAILURE: &str = "Failed to apply policy.";
pub const MSG_RESET_SUCCESS: &str = "Successfully reset policy.";
pub const MSG_RESET_FAILURE: &str = "Failed to reset policy.";
pub const MSG_NO_POLICY: &str = "No policy active.";
pub const MSG_NO_HISTORY: &str = "No policy history.";

// ---- Logging ----

/// Filter used when `RUST_LOG` is unset and no `-v` flag is given.
pub const DEFAULT_LOG_FILTER: &str = "guardctl_lib=warn";

// ---- Policy store ----

/// Environment variable overriding the policy store location.
pub const STATE_DB_ENV: &str = "GUARDCTL_STATE_DB";

/// File name of the policy store inside the default state directory.
pub const STATE_DB_FILE_NAME: &str = "guardctl.db";

/// Journal entries older than this are pruned when the store is opened (days).
pub const HISTORY_MAX_AGE_DAYS: u64 = 30;

/// Number of journal entries listed by `history` when `--limit` is not given.
pub const HISTORY_DEFAULT_LIMIT: usize = 20;

/// Resolve the policy store path: explicit flag, then `GUARDCTL_STATE_DB`,
/// then `<temp_dir>/guardctl/guardctl.db`.
pub fn resolve_state_db_path(flag: Option<PathBuf>) -> PathBuf {
    resolve_state_db_path_from(flag, std::env::var_os(STATE_DB_ENV).map(PathBuf::from))
}

fn resolve_state_db_path_from(flag: Option<PathBuf>, env: Option<PathBuf>) -> PathBuf {
    flag.or(env)
        .unwrap_or_else(|| std::env::temp_dir().join("guardctl").join(STATE_DB_FILE_NAME))
}
