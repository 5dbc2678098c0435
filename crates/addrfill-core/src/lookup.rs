//! The place-lookup port consumed by autocomplete sessions.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::address::PlaceDetails;
use crate::prediction::Prediction;

/// Failure reported by a [`PlaceLookup`] implementation.
///
/// Adapters collapse their transport-specific errors into this taxonomy so
/// that sessions can record and clone them.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("place not found: {0}")]
    NotFound(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("lookup API error: {0}")]
    Api(String),
}

/// Asynchronous address lookup capability.
///
/// Implementations must be safe to share across tasks; a session may have a
/// lookup and a fetch in flight at the same time.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// Returns at most `limit` predictions for `query`, restricted to
    /// `country` (ISO 3166-1 alpha-2).
    async fn find_predictions(
        &self,
        query: &str,
        country: &str,
        limit: usize,
    ) -> Result<Vec<Prediction>, LookupError>;

    /// Resolves a prediction's `place_id` into place details.
    async fn fetch_place(&self, place_id: &str) -> Result<PlaceDetails, LookupError>;
}
