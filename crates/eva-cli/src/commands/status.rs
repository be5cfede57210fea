//! Status command for showing the effective tracking configuration.

use std::io::Write;

use anyhow::Result;
use eva_client::DEFAULT_API_URL;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let key_state = if config.api_key().is_some() {
        "configured"
    } else {
        "not configured"
    };
    let tracking = if config.enabled { "enabled" } else { "disabled" };

    writeln!(writer, "EVAVEO telemetry status")?;
    writeln!(writer, "Endpoint:    {DEFAULT_API_URL}")?;
    writeln!(writer, "API key:     {key_state}")?;
    writeln!(writer, "Tracking:    {tracking}")?;
    writeln!(
        writer,
        "User ID:     {}",
        config.user_id.as_deref().unwrap_or("(none)")
    )?;
    writeln!(writer, "App version: {}", config.app_version)?;
    Ok(())
}
