//! Shared tracking lifecycle for CLI commands.
//!
//! A command initializes the client, fires its requests, ends the session
//! and then waits for every in-flight delivery before the process exits.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use eva_client::{DeliveryHandle, Dispatch, HttpTransport, InitStatus, Transport, TrackingClient};
use eva_core::SystemHost;

use crate::Config;

/// Delivery counts for one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub dispatched: usize,
    pub delivered: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.dispatched == 1 {
            "request"
        } else {
            "requests"
        };
        write!(
            f,
            "Dispatched {} {noun}, {} delivered",
            self.dispatched, self.delivered
        )
    }
}

/// Builds the production HTTP transport.
pub fn http_transport() -> Result<Arc<dyn Transport>> {
    let transport = HttpTransport::new().context("failed to create HTTP transport")?;
    Ok(Arc::new(transport))
}

/// An initialized client plus the deliveries it has fired.
///
/// Must be created inside a tokio runtime.
pub struct TrackingRun {
    client: TrackingClient,
    pending: Vec<DeliveryHandle>,
}

impl TrackingRun {
    /// Initializes a client from configuration.
    pub fn start(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
        if config.api_key().is_none() {
            anyhow::bail!("missing API key (set EVA_API_KEY or config.toml)");
        }

        let host = Arc::new(SystemHost::new(config.app_version.clone()));
        let mut client = TrackingClient::new(transport, host);
        let session = match client.initialize_with(&config.client_settings()) {
            InitStatus::Initialized { session } => session,
            status => anyhow::bail!("tracking client did not initialize: {status:?}"),
        };

        let mut run = Self {
            client,
            pending: Vec::new(),
        };
        run.record(session);
        Ok(run)
    }

    pub const fn client(&self) -> &TrackingClient {
        &self.client
    }

    pub fn track(&mut self, event_name: &str, event_data: &str) {
        let dispatch = self.client.track_event(event_name, event_data);
        self.record(dispatch);
    }

    /// Ends the session and waits for every delivery.
    pub async fn finish(mut self) -> Summary {
        let dispatch = self.client.end_session();
        self.record(dispatch);

        let dispatched = self.pending.len();
        let mut delivered = 0;
        for handle in self.pending {
            if handle.wait().await {
                delivered += 1;
            }
        }
        Summary {
            dispatched,
            delivered,
        }
    }

    fn record(&mut self, dispatch: Dispatch) {
        match dispatch {
            Dispatch::Sent(handle) => self.pending.push(handle),
            Dispatch::Skipped(reason) => tracing::debug!(?reason, "request skipped"),
        }
    }
}
