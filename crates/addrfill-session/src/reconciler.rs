//! Decides the final address result when a session ends.

use addrfill_core::{Address, AddressResult};

use crate::error::SessionError;
use crate::state::SessionOutcome;

/// How the session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// A prediction was selected and its place fetch completed.
    Selected(Result<Address, SessionError>),
    /// The user left without selecting anything.
    BackNavigation,
    /// The user chose to type the address themselves.
    EnterManually,
}

/// Maps a session ending and the query text at that moment to its outcome.
///
/// Back-navigation keeps a non-blank query as a manual line; the explicit
/// manual action keeps the query even when blank.
#[must_use]
pub fn reconcile(end: SessionEnd, current_query: &str) -> SessionOutcome {
    match end {
        SessionEnd::Selected(Ok(address)) => SessionOutcome {
            result: AddressResult::Resolved { address },
            failure: None,
        },
        SessionEnd::Selected(Err(err)) => SessionOutcome {
            result: AddressResult::None,
            failure: Some(err),
        },
        SessionEnd::BackNavigation if current_query.trim().is_empty() => SessionOutcome {
            result: AddressResult::None,
            failure: None,
        },
        SessionEnd::BackNavigation | SessionEnd::EnterManually => SessionOutcome {
            result: AddressResult::Manual {
                line: current_query.to_owned(),
            },
            failure: None,
        },
    }
}
