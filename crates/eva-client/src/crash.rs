//! Error and panic capture.
//!
//! [`ErrorLayer`] watches `tracing` ERROR events and queues them as
//! [`ErrorReport`]s. The host drains the queue into `"error"` events with
//! [`TrackingClient::report_errors`](crate::TrackingClient::report_errors).
//! [`install_panic_hook`] turns panics into ERROR events the layer sees.

use std::backtrace::Backtrace;
use std::fmt;
use std::panic;

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Target of the ERROR events emitted for panics.
pub const PANIC_TARGET: &str = "eva::panic";

/// Whether a report came from an error log or a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Error,
    Exception,
}

/// Event data of an `"error"` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub message: String,
    pub stack_trace: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
}

/// Queue of captured reports waiting to be sent.
#[derive(Debug)]
pub struct ErrorReports {
    receiver: UnboundedReceiver<ErrorReport>,
}

impl ErrorReports {
    /// Takes every report queued so far.
    pub fn drain(&mut self) -> Vec<ErrorReport> {
        let mut reports = Vec::new();
        while let Ok(report) = self.receiver.try_recv() {
            reports.push(report);
        }
        reports
    }
}

/// Queues every ERROR event as an [`ErrorReport`].
#[derive(Debug, Clone)]
pub struct ErrorLayer {
    sender: UnboundedSender<ErrorReport>,
}

impl ErrorLayer {
    pub fn new() -> (Self, ErrorReports) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, ErrorReports { receiver })
    }
}

impl<S: Subscriber> Layer<S> for ErrorLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() != Level::ERROR {
            return;
        }

        let mut fields = ReportFields::default();
        event.record(&mut fields);
        let kind = if metadata.target() == PANIC_TARGET {
            ErrorKind::Exception
        } else {
            ErrorKind::Error
        };

        // The receiver is gone once the host stops draining.
        let _ = self.sender.send(ErrorReport {
            message: fields.message,
            stack_trace: fields.stack_trace,
            kind,
        });
    }
}

#[derive(Default)]
struct ReportFields {
    message: String,
    stack_trace: String,
}

impl Visit for ReportFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "stack_trace" => self.stack_trace = value.to_string(),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "stack_trace" => self.stack_trace = format!("{value:?}"),
            _ => {}
        }
    }
}

/// Logs panics as ERROR events under [`PANIC_TARGET`], then runs the
/// previously installed hook.
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic".to_string());
        let location = info
            .location()
            .map(|location| format!("{}:{}", location.file(), location.line()))
            .unwrap_or_default();
        let stack_trace = Backtrace::force_capture();

        tracing::error!(
            target: PANIC_TARGET,
            location = %location,
            stack_trace = %stack_trace,
            "{message}"
        );
        previous(info);
    }));
}
