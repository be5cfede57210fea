//! Session and event tracking client for the EVAVEO collection API.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use eva_client::{HttpTransport, TrackingClient};
//! use eva_core::SystemHost;
//!
//! # async fn run() -> Result<(), eva_client::TransportError> {
//! let transport = Arc::new(HttpTransport::new()?);
//! let mut client = TrackingClient::new(transport, Arc::new(SystemHost::new("1.0.0")));
//! client.initialize("my-api-key");
//! client.track_event("level_complete", "level_5");
//! client.end_session();
//! # Ok(())
//! # }
//! ```

pub mod crash;
pub mod delivery;
#[cfg(test)]
mod test_support;
mod tracker;
pub mod transport;

pub use crash::{ErrorKind, ErrorLayer, ErrorReport, ErrorReports, install_panic_hook};
pub use delivery::{Delivery, DeliveryHandle, DeliveryObserver, LogObserver};
pub use tracker::{
    ClientSettings, DEFAULT_API_URL, Dispatch, ERROR_EVENT, InitStatus, Skip, TrackingClient,
};
pub use transport::{HttpTransport, OutboundRequest, Transport, TransportError};
