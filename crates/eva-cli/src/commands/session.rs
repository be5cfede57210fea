//! Session command for reporting a session start and end.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use eva_client::Transport;

use crate::Config;
use crate::commands::tracking::{TrackingRun, http_transport};

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    run_with(writer, config, http_transport()?)
}

/// Runs the command against the given transport.
pub fn run_with<W: Write>(
    writer: &mut W,
    config: &Config,
    transport: Arc<dyn Transport>,
) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let (session_id, summary) = runtime.block_on(async {
        let run = TrackingRun::start(config, transport)?;
        let session_id = run.client().session_id().cloned();
        anyhow::Ok((session_id, run.finish().await))
    })?;

    match session_id {
        Some(id) => writeln!(writer, "Session: {id}")?,
        None => writeln!(writer, "Session: none (tracking disabled)")?,
    }
    writeln!(writer, "{summary}")?;
    Ok(())
}
