//! Observable session state and the values sessions hand back.

use addrfill_core::{AddressResult, Prediction};
use serde::Serialize;

use crate::error::SessionError;

/// `Idle → Querying → {PredictionsShown, Failed} → Committed`.
///
/// `Querying` re-enters itself for every new lookup; `clear` returns a live
/// session to `Idle`; `Committed` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Querying,
    PredictionsShown,
    Failed,
    Committed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PredictionSnapshot {
    /// Replaced wholesale on every applied lookup; kept on failure.
    pub predictions: Vec<Prediction>,
    pub loading: bool,
    pub phase: SessionPhase,
    pub last_failure: Option<SessionError>,
    pub failure_count: u32,
}

/// What a single lookup call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Success(Vec<Prediction>),
    Failure(SessionError),
}

impl LookupOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, LookupOutcome::Success(_))
    }
}

/// The single terminal value a session emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOutcome {
    pub result: AddressResult,
    /// Set when the result is `None` because a place fetch failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<SessionError>,
}
