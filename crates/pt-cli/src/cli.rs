//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Playback analytics over per-device start/stop events.
///
/// Reads a snapshot of user actions, app catalogs and feature entitlements,
/// then reports who did what, how long each user watched, and which features
/// they may use.
#[derive(Debug, Parser)]
#[command(name = "pt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to a JSON snapshot; overrides `data_path` from the config.
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run every analysis with the sample arguments.
    Demo,

    /// List users who performed an action at an exact time.
    Users {
        /// The action to match ("start" or "stop").
        #[arg(long)]
        action: String,

        /// Time a `start` must have happened at.
        #[arg(long, allow_negative_numbers = true)]
        start: i64,

        /// Time a `stop` must have happened at.
        #[arg(long, allow_negative_numbers = true)]
        stop: i64,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show a user's total playback time across devices.
    Playback {
        /// The user to compute playback time for.
        #[arg(long)]
        user: i64,

        /// Also list the reconstructed sessions.
        #[arg(long)]
        sessions: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show playback time for every user in the snapshot.
    Report {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the features a user may use in each of their apps.
    Permissions {
        /// The user to look up.
        #[arg(long)]
        user: i64,
    },
}
