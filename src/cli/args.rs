//! CLI argument definitions using clap

use clap::{Parser, Subcommand};

/// Command-line client for feature flags: login, organization/project selection, flag CRUD
#[derive(Parser, Debug)]
#[command(name = "ph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Backend host (overrides PH_ENDPOINT and the config file)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in, then select organization and project
    Login {
        /// Paste a token instead of confirming in the browser
        #[arg(long)]
        paste: bool,
    },

    /// Remove the stored session for this endpoint
    Logout,

    /// Validate the token and complete missing selections
    Auth,

    /// Switch organization (a project is chosen afterwards)
    Organization,

    /// Switch project
    Project,

    /// Manage feature flags
    Flags {
        #[command(subcommand)]
        command: FlagsCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum FlagsCommands {
    /// Choose a flag interactively and show it
    List,

    /// Show a flag by id
    Show {
        /// Numeric flag id
        id: i64,
    },

    /// Create a flag
    Create {
        /// Unique flag key
        key: String,
        /// Description (stored as the flag name)
        #[arg(short, long)]
        description: String,
        /// Rollout percentage (0-100)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=100))]
        rollout: u32,
    },

    /// Change description and/or rollout
    Update {
        /// Flag key
        key: String,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New rollout percentage (0-100)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=100))]
        rollout: Option<u32>,
    },

    /// Delete a flag
    Delete {
        /// Flag key
        key: String,
    },

    /// Enable a flag
    Enable {
        /// Flag key
        key: String,
    },

    /// Disable a flag
    Disable {
        /// Flag key
        key: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,

    /// Show config and credential file paths
    Path,
}
