//! Core domain types for the EVAVEO telemetry client.
//!
//! This crate contains:
//! - Identifiers: API keys, session IDs and user IDs
//! - Payloads: the JSON bodies posted to the collection API
//! - Host info: device, OS and application facts reported at session start

pub mod host;
pub mod payload;
pub mod types;

pub use host::{HostInfo, SystemHost};
pub use payload::{Endpoint, EventPayload, Payload, SessionEnd, SessionStart, format_timestamp};
pub use types::{ApiKey, SessionId, UserId, ValidationError};
