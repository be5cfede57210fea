//! Delivery observation.
//!
//! Every dispatched request completes on a background task. The outcome is
//! reported to a [`DeliveryObserver`] and never to the code that fired it.

use std::fmt;

use eva_core::Endpoint;
use tokio::task::JoinHandle;

use crate::transport::TransportError;

/// Outcome of one request.
#[derive(Debug)]
pub enum Delivery {
    /// The server accepted the payload.
    Sent { endpoint: Endpoint, status: u16 },
    /// The request failed or the server rejected it.
    Failed {
        endpoint: Endpoint,
        error: TransportError,
    },
}

impl Delivery {
    pub const fn endpoint(&self) -> Endpoint {
        match self {
            Self::Sent { endpoint, .. } | Self::Failed { endpoint, .. } => *endpoint,
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

/// Receives the outcome of every request.
///
/// Called from the task that ran the request, possibly after the client's
/// session state has moved on.
pub trait DeliveryObserver: Send + Sync {
    fn on_complete(&self, delivery: &Delivery);
}

/// Default observer: success at debug level, failure as a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl DeliveryObserver for LogObserver {
    fn on_complete(&self, delivery: &Delivery) {
        match delivery {
            Delivery::Sent { endpoint, status } => {
                tracing::debug!(%endpoint, status, "data sent successfully");
            }
            Delivery::Failed { endpoint, error } => {
                tracing::warn!(%endpoint, %error, "failed to send data");
            }
        }
    }
}

/// Handle to an in-flight request.
///
/// Dropping the handle does not cancel the request.
pub struct DeliveryHandle {
    endpoint: Endpoint,
    task: JoinHandle<bool>,
}

impl DeliveryHandle {
    pub(crate) const fn new(endpoint: Endpoint, task: JoinHandle<bool>) -> Self {
        Self { endpoint, task }
    }

    pub const fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Waits for the request to finish. Returns whether it was delivered.
    pub async fn wait(self) -> bool {
        match self.task.await {
            Ok(delivered) => delivered,
            Err(err) => {
                tracing::warn!(endpoint = %self.endpoint, error = %err, "delivery task aborted");
                false
            }
        }
    }
}

impl fmt::Debug for DeliveryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryHandle")
            .field("endpoint", &self.endpoint)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}
