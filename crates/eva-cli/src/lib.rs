//! EVAVEO telemetry CLI library.
//!
//! This crate provides the command-line host for the tracking client.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
