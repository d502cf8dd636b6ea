//! Command-line surface.
//!
//! `policy` arguments are passed through untouched: subcommand lookup and
//! `name=value` parsing belong to the policy dispatcher, not to clap.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::config;

#[derive(Parser, Debug)]
#[command(name = "guardctl")]
#[command(version, about = "Connection-lifecycle firewall policy controller")]
pub struct Cli {
    /// Path to the policy store (defaults to $GUARDCTL_STATE_DB or a temp-dir file)
    #[arg(long, global = true, value_name = "PATH")]
    pub state_db: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Activate and reset policies: policy <connecting|connected|netblocked|reset> [key=value ...]
    Policy {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
        arguments: Vec<String>,
    },
    /// Show the active policy
    Status {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show recent policy transitions
    History {
        /// Number of entries to show
        #[arg(short, long, default_value_t = config::HISTORY_DEFAULT_LIMIT)]
        limit: usize,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Log filter implied by `-v` flags; `None` keeps the configured default.
    pub fn log_filter(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("guardctl_lib=info"),
            _ => Some("guardctl_lib=debug"),
        }
    }
}
