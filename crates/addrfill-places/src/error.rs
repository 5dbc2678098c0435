use addrfill_core::LookupError;
use thiserror::Error;

/// Errors returned by the Places API client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-OK envelope status.
    #[error("Places API error ({status}): {message}")]
    ApiError { status: String, message: String },

    /// `OVER_QUERY_LIMIT`. Never retried.
    #[error("Places quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("place not found: {0}")]
    NotFound(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl PlacesError {
    /// Wraps a request error with its URL stripped; the URL carries the API key.
    pub(crate) fn from_request(err: reqwest::Error) -> Self {
        PlacesError::Http(err.without_url())
    }
}

impl From<PlacesError> for LookupError {
    fn from(err: PlacesError) -> Self {
        match err {
            PlacesError::Http(e) => LookupError::Network(e.without_url().to_string()),
            PlacesError::QuotaExceeded(msg) => LookupError::QuotaExceeded(msg),
            PlacesError::NotFound(id) => LookupError::NotFound(id),
            e @ PlacesError::Deserialize { .. } => LookupError::InvalidResponse(e.to_string()),
            e @ (PlacesError::ApiError { .. } | PlacesError::InvalidBaseUrl { .. }) => {
                LookupError::Api(e.to_string())
            }
        }
    }
}
