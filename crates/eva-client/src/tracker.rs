//! Session and event tracking.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use eva_core::{
    ApiKey, EventPayload, HostInfo, Payload, SessionEnd, SessionId, SessionStart, UserId,
};
use serde::Serialize;
use tokio::runtime::Handle;

use crate::crash::ErrorReports;
use crate::delivery::{Delivery, DeliveryHandle, DeliveryObserver, LogObserver};
use crate::transport::{OutboundRequest, Transport};

/// Base URL of the collection API. Not configurable.
pub const DEFAULT_API_URL: &str = "https://api.vrmanager.evaveo.com/api/tracking";

/// Event name used for captured errors and panics.
pub const ERROR_EVENT: &str = "error";

/// Result of an initialization attempt.
#[derive(Debug)]
pub enum InitStatus {
    /// The key was accepted. `session` is the session-start request, or why
    /// none was sent.
    Initialized { session: Dispatch },
    /// The client was already initialized; nothing changed.
    AlreadyInitialized,
    /// The key was empty; nothing changed.
    EmptyKey,
}

impl InitStatus {
    pub const fn is_initialized(&self) -> bool {
        matches!(self, Self::Initialized { .. })
    }
}

/// Why a request was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    Uninitialized,
    Disabled,
    /// No session has been started yet.
    NoSession,
    /// Called outside a tokio runtime.
    NoRuntime,
    /// The payload could not be encoded as JSON.
    Encoding,
}

/// Result of a tracking call.
#[derive(Debug)]
pub enum Dispatch {
    /// The request was handed to the transport.
    Sent(DeliveryHandle),
    /// Nothing was sent.
    Skipped(Skip),
}

impl Dispatch {
    pub const fn skipped(&self) -> Option<Skip> {
        match self {
            Self::Sent(_) => None,
            Self::Skipped(skip) => Some(*skip),
        }
    }

    pub fn into_handle(self) -> Option<DeliveryHandle> {
        match self {
            Self::Sent(handle) => Some(handle),
            Self::Skipped(_) => None,
        }
    }

    /// Waits for delivery. Skipped requests count as undelivered.
    pub async fn wait(self) -> bool {
        match self {
            Self::Sent(handle) => handle.wait().await,
            Self::Skipped(_) => false,
        }
    }
}

/// Settings applied in one step by [`TrackingClient::initialize_with`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_key: String,
    pub enabled: bool,
    pub user_id: Option<String>,
}

struct ClientConfig {
    /// Set once; `Some` means initialized.
    api_key: Option<ApiKey>,
    enabled: bool,
}

#[derive(Default)]
struct SessionState {
    /// Last started session. Kept after the session ends.
    session_id: Option<SessionId>,
    started_at: Option<Instant>,
    user_id: Option<UserId>,
}

/// Tracks sessions and custom events for one host application.
///
/// Mutating operations take `&mut self`: state is owned by a single caller.
/// Requests run on background tasks of the ambient tokio runtime and report
/// their outcome to the [`DeliveryObserver`]; nothing is ever returned as an
/// error.
pub struct TrackingClient {
    transport: Arc<dyn Transport>,
    host: Arc<dyn HostInfo>,
    observer: Arc<dyn DeliveryObserver>,
    config: ClientConfig,
    session: SessionState,
}

impl fmt::Debug for TrackingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingClient")
            .field("initialized", &self.is_initialized())
            .field("enabled", &self.config.enabled)
            .field("session_id", &self.session.session_id)
            .field("user_id", &self.session.user_id)
            .finish_non_exhaustive()
    }
}

impl TrackingClient {
    /// Creates an uninitialized, enabled client that logs delivery outcomes.
    pub fn new(transport: Arc<dyn Transport>, host: Arc<dyn HostInfo>) -> Self {
        Self {
            transport,
            host,
            observer: Arc::new(LogObserver),
            config: ClientConfig {
                api_key: None,
                enabled: true,
            },
            session: SessionState::default(),
        }
    }

    /// Replaces the delivery observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DeliveryObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Stores the API key and, when tracking is enabled, starts a session.
    ///
    /// Only the first successful call has any effect.
    pub fn initialize(&mut self, api_key: &str) -> InitStatus {
        if self.is_initialized() {
            tracing::warn!("SDK already initialized");
            return InitStatus::AlreadyInitialized;
        }

        let api_key = match ApiKey::new(api_key) {
            Ok(key) => key,
            Err(err) => {
                tracing::error!(error = %err, "cannot initialize SDK");
                return InitStatus::EmptyKey;
            }
        };

        self.config.api_key = Some(api_key);
        tracing::info!("SDK initialized successfully");

        let session = if self.config.enabled {
            self.start_session()
        } else {
            Dispatch::Skipped(Skip::Disabled)
        };
        InitStatus::Initialized { session }
    }

    /// Applies `enabled` and `user_id`, then initializes with the key.
    ///
    /// Settings are left untouched when initialization would be a no-op.
    pub fn initialize_with(&mut self, settings: &ClientSettings) -> InitStatus {
        if !self.is_initialized() && !settings.api_key.is_empty() {
            self.set_enabled(settings.enabled);
            if let Some(user_id) = &settings.user_id {
                self.set_user_id(user_id);
            }
        }
        self.initialize(&settings.api_key)
    }

    /// Sends a custom event tagged with the current session.
    ///
    /// Dropped silently when uninitialized or disabled.
    pub fn track_event(&self, event_name: &str, event_data: &str) -> Dispatch {
        if let Some(skip) = self.tracking_gate() {
            return Dispatch::Skipped(skip);
        }
        self.send(&self.event_payload(event_name, event_data.to_string()))
    }

    /// Like [`track_event`](Self::track_event), with `data` encoded as a JSON
    /// string for the event data field.
    pub fn track_event_json<T: Serialize + ?Sized>(&self, event_name: &str, data: &T) -> Dispatch {
        if let Some(skip) = self.tracking_gate() {
            return Dispatch::Skipped(skip);
        }
        match serde_json::to_string(data) {
            Ok(event_data) => self.send(&self.event_payload(event_name, event_data)),
            Err(err) => {
                tracing::warn!(event_name, error = %err, "failed to encode event data");
                Dispatch::Skipped(Skip::Encoding)
            }
        }
    }

    /// Toggles tracking. Never starts or ends a session.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        tracing::info!(
            "Tracking {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    /// Sets the user reported by future session starts. Empty clears it.
    pub fn set_user_id(&mut self, user_id: &str) {
        self.session.user_id = UserId::new(user_id).ok();
    }

    pub const fn is_initialized(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub const fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// The most recently started session, if any.
    pub const fn session_id(&self) -> Option<&SessionId> {
        self.session.session_id.as_ref()
    }

    pub const fn user_id(&self) -> Option<&UserId> {
        self.session.user_id.as_ref()
    }

    /// Time since the current session started.
    pub fn session_elapsed(&self) -> Option<Duration> {
        self.session.started_at.map(|started| started.elapsed())
    }

    /// Starts a new session with a fresh ID and reports it.
    ///
    /// The ID only becomes current once the launch request is handed to the
    /// transport.
    pub fn start_session(&mut self) -> Dispatch {
        if let Some(skip) = self.tracking_gate() {
            return Dispatch::Skipped(skip);
        }

        let session_id = SessionId::generate();
        let payload = SessionStart {
            session_id: session_id.clone(),
            device_model: self.host.device_model(),
            os_version: self.host.os_version(),
            app_version: self.host.app_version(),
            start_time: Utc::now(),
            user_id: self.session.user_id.clone(),
        };
        let dispatch = self.send(&payload);
        if matches!(dispatch, Dispatch::Sent(_)) {
            tracing::info!(%session_id, "Session started");
            self.session.session_id = Some(session_id);
            self.session.started_at = Some(Instant::now());
        }
        dispatch
    }

    /// Reports the end of the current session. The session ID is kept.
    pub fn end_session(&self) -> Dispatch {
        let Some(session_id) = self.session.session_id.clone() else {
            return Dispatch::Skipped(Skip::NoSession);
        };

        let payload = SessionEnd {
            session_id,
            end_time: Utc::now(),
        };
        let dispatch = self.send(&payload);
        let duration_secs = self
            .session_elapsed()
            .map_or(0.0, |elapsed| elapsed.as_secs_f64());
        tracing::info!(duration_secs, "Session ended");
        dispatch
    }

    /// Sends every error captured since the last call as an `"error"` event.
    pub fn report_errors(&self, reports: &mut ErrorReports) -> Vec<Dispatch> {
        reports
            .drain()
            .into_iter()
            .map(|report| self.track_event_json(ERROR_EVENT, &report))
            .collect()
    }

    const fn tracking_gate(&self) -> Option<Skip> {
        if !self.is_initialized() {
            Some(Skip::Uninitialized)
        } else if !self.config.enabled {
            Some(Skip::Disabled)
        } else {
            None
        }
    }

    fn event_payload(&self, event_name: &str, event_data: String) -> EventPayload {
        EventPayload {
            event_name: event_name.to_string(),
            event_data,
            session_id: self
                .session
                .session_id
                .as_ref()
                .map(|id| id.as_str().to_string())
                .unwrap_or_default(),
            timestamp: Utc::now(),
        }
    }

    fn send<P: Payload>(&self, payload: &P) -> Dispatch {
        let Some(api_key) = self.config.api_key.clone() else {
            return Dispatch::Skipped(Skip::Uninitialized);
        };

        let body = match serde_json::to_string(payload) {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(endpoint = %P::ENDPOINT, error = %err, "failed to encode payload");
                return Dispatch::Skipped(Skip::Encoding);
            }
        };

        let request = OutboundRequest {
            endpoint: P::ENDPOINT,
            url: format!("{DEFAULT_API_URL}{}", P::ENDPOINT.path()),
            api_key,
            body,
        };
        self.dispatch(request)
    }

    fn dispatch(&self, request: OutboundRequest) -> Dispatch {
        let endpoint = request.endpoint;
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(%endpoint, "no async runtime available, dropping request");
            return Dispatch::Skipped(Skip::NoRuntime);
        };

        let transport = Arc::clone(&self.transport);
        let observer = Arc::clone(&self.observer);
        let task = runtime.spawn(async move {
            let delivery = match transport.post(request).await {
                Ok(status) => Delivery::Sent { endpoint, status },
                Err(error) => Delivery::Failed { endpoint, error },
            };
            observer.on_complete(&delivery);
            delivery.is_success()
        });
        Dispatch::Sent(DeliveryHandle::new(endpoint, task))
    }
}
