//! Debounced, cancellable address autocomplete sessions.
//!
//! A [`PredictionSession`] turns a stream of query edits into place lookups
//! through an injected [`PlaceLookup`](addrfill_core::PlaceLookup), publishes
//! the resulting predictions, and emits exactly one [`SessionOutcome`] when
//! the user selects a place, enters an address manually, or navigates back.

pub mod debouncer;
pub mod error;
pub mod reconciler;
pub mod session;
pub mod state;

pub use debouncer::{DebounceConfig, QueryDebouncer};
pub use error::SessionError;
pub use reconciler::{reconcile, SessionEnd};
pub use session::{PredictionSession, SessionConfig, MAX_DISPLAYED_RESULTS};
pub use state::{LookupOutcome, PredictionSnapshot, SessionOutcome, SessionPhase};
