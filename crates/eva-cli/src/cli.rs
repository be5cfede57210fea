//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::track::TrackArgs;

/// EVAVEO telemetry client.
///
/// Reports sessions and custom events to the EVAVEO VR Manager collection API.
#[derive(Debug, Parser)]
#[command(name = "eva", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the effective tracking configuration.
    Status,

    /// Track a custom event within a fresh session.
    Track(TrackArgs),

    /// Report a session start followed by a session end.
    Session,
}
