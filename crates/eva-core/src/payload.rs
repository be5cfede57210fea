//! Wire payloads sent to the collection API.
//!
//! Every payload is a flat JSON object with camelCase keys. Timestamps are
//! RFC 3339 UTC strings with millisecond precision and a `Z` suffix, e.g.
//! `2025-01-01T12:00:00.000Z`.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::types::{SessionId, UserId};

/// Collection API endpoints, relative to the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Session start.
    Launch,
    /// Session end.
    Close,
    /// Custom event.
    Event,
}

impl Endpoint {
    /// Path appended to the base URL.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Launch => "/app/launch",
            Self::Close => "/app/close",
            Self::Event => "/event",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A serializable body bound to the endpoint that accepts it.
pub trait Payload: Serialize {
    /// Where this payload is posted.
    const ENDPOINT: Endpoint;
}

/// Formats a timestamp the way the collection API expects.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(timestamp))
}

/// Sent once per session start.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStart {
    pub session_id: SessionId,
    pub device_model: String,
    pub os_version: String,
    pub app_version: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub start_time: DateTime<Utc>,
    /// Only present when the host has set a user ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Payload for SessionStart {
    const ENDPOINT: Endpoint = Endpoint::Launch;
}

/// Sent when the host ends a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEnd {
    pub session_id: SessionId,
    #[serde(serialize_with = "serialize_timestamp")]
    pub end_time: DateTime<Utc>,
}

impl Payload for SessionEnd {
    const ENDPOINT: Endpoint = Endpoint::Close;
}

/// A custom event.
///
/// `event_name` and `event_data` are forwarded untouched; the server owns
/// their schema. `session_id` is empty when no session has been started.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub event_name: String,
    pub event_data: String,
    pub session_id: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Payload for EventPayload {
    const ENDPOINT: Endpoint = Endpoint::Event;
}
