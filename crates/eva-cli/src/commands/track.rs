//! Track command for sending one custom event.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use eva_client::Transport;

use crate::Config;
use crate::commands::tracking::{TrackingRun, http_transport};

#[derive(Debug, Args)]
pub struct TrackArgs {
    /// Event name (e.g. "level_complete").
    pub name: String,

    /// Opaque event data forwarded as-is.
    #[arg(long, default_value = "")]
    pub data: String,
}

pub fn run<W: Write>(writer: &mut W, args: &TrackArgs, config: &Config) -> Result<()> {
    run_with(writer, args, config, http_transport()?)
}

/// Runs the command against the given transport.
pub fn run_with<W: Write>(
    writer: &mut W,
    args: &TrackArgs,
    config: &Config,
    transport: Arc<dyn Transport>,
) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let summary = runtime.block_on(async {
        let mut run = TrackingRun::start(config, transport)?;
        run.track(&args.name, &args.data);
        anyhow::Ok(run.finish().await)
    })?;

    writeln!(writer, "Event: {}", args.name)?;
    writeln!(writer, "{summary}")?;
    Ok(())
}
