//! Observability port.
//!
//! The engine reports fetch activity (`skipped`, `request`, `response`,
//! `error`) to an external log panel.  The port is deliberately tiny and
//! non-fallible; the default adapter forwards to `tracing`.

use std::sync::Arc;

/// Category of a structured log event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Work intentionally not done (cache hit, zoom too low, …).
    Skipped,
    /// A collaborator request was issued.
    Request,
    /// A collaborator request completed.
    Response,
    /// A collaborator request failed and was recovered.
    Error,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Skipped  => "skipped",
            EventKind::Request  => "request",
            EventKind::Response => "response",
            EventKind::Error    => "error",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured event sink for the engine's fetch/route activity.
pub trait EventLog: Send + Sync + 'static {
    fn record(&self, kind: EventKind, message: &str);
}

pub type DynLog = Arc<dyn EventLog>;

/// Forwards events to `tracing` under the `livemap::api` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl EventLog for TracingLog {
    fn record(&self, kind: EventKind, message: &str) {
        match kind {
            EventKind::Error => {
                tracing::warn!(target: "livemap::api", kind = kind.as_str(), "{message}")
            }
            EventKind::Skipped => {
                tracing::debug!(target: "livemap::api", kind = kind.as_str(), "{message}")
            }
            EventKind::Request | EventKind::Response => {
                tracing::info!(target: "livemap::api", kind = kind.as_str(), "{message}")
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLog;

impl EventLog for NoopLog {
    fn record(&self, _kind: EventKind, _message: &str) {}
}

/// The default log: [`TracingLog`].
pub fn tracing_log() -> DynLog {
    Arc::new(TracingLog)
}
