use addrfill_core::LookupError;
use serde::Serialize;
use thiserror::Error;

/// Failures recorded by a session. None of them cross the session boundary
/// as `Err`; they show up in snapshots and outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SessionError {
    /// A required session parameter is missing. Not retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("prediction lookup failed: {0}")]
    LookupFailure(LookupError),

    #[error("place fetch failed: {0}")]
    FetchFailure(LookupError),

    /// The session already committed or was disposed.
    #[error("session is closed")]
    Closed,
}
