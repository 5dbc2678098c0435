//! HTTP client for a Places-style REST API.
//!
//! Wraps `reqwest` with API-key handling, envelope status checks, typed
//! response deserialization and retry on transient failures. Non-OK envelope
//! statuses surface as [`PlacesError::ApiError`], [`PlacesError::QuotaExceeded`]
//! or [`PlacesError::NotFound`].

use std::time::Duration;

use addrfill_core::{PlaceDetails, Prediction};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::PlacesError;
use crate::retry::retry_with_backoff;
use crate::types::{ApiResponse, AutocompleteResponse, DetailsResponse};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";

const DEFAULT_USER_AGENT: &str = "addrfill/0.1 (address-autocomplete)";
const DETAILS_FIELDS: &str = "address_components,formatted_address";

/// Client for the Places autocomplete and details endpoints.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    /// Additional attempts after the first failure for transient errors.
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PlacesClient {
    /// Creates a client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_USER_AGENT, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `Url::join` appends endpoint paths
        // instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Sets the retry policy for transient failures.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::with_base_url`].
    pub fn from_app_config(config: &addrfill_core::AppConfig) -> Result<Self, PlacesError> {
        Ok(Self::with_base_url(
            &config.places_api_key,
            config.request_timeout_secs,
            &config.user_agent,
            &config.places_base_url,
        )?
        .with_retry(config.max_retries, config.retry_backoff_base_ms))
    }

    /// Fetches address predictions for `query`, restricted to `country`.
    ///
    /// The API has no result-count parameter, so results are truncated to
    /// `limit` client-side. `ZERO_RESULTS` yields an empty list.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::QuotaExceeded`] on `OVER_QUERY_LIMIT`.
    /// - [`PlacesError::ApiError`] on any other non-OK status.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    pub async fn autocomplete(
        &self,
        query: &str,
        country: &str,
        limit: usize,
    ) -> Result<Vec<Prediction>, PlacesError> {
        let components = format!("country:{}", country.to_ascii_lowercase());
        let url = self.build_url(
            "autocomplete/json",
            &[
                ("input", query),
                ("components", &components),
                ("types", "address"),
            ],
        )?;
        let envelope: ApiResponse<AutocompleteResponse> =
            self.get_envelope(&url, "autocomplete").await?;
        Self::check_status(&envelope.status, envelope.error_message.as_deref(), query)?;

        let predictions: Vec<Prediction> = envelope
            .data
            .predictions
            .into_iter()
            .take(limit)
            .map(Prediction::from)
            .collect();
        tracing::debug!(
            query_len = query.chars().count(),
            country,
            count = predictions.len(),
            "autocomplete returned predictions"
        );
        Ok(predictions)
    }

    /// Fetches address details for a prediction's `place_id`.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::NotFound`] on `NOT_FOUND` or an envelope without a result.
    /// - [`PlacesError::QuotaExceeded`] on `OVER_QUERY_LIMIT`.
    /// - [`PlacesError::ApiError`] on any other non-OK status.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = self.build_url(
            "details/json",
            &[("place_id", place_id), ("fields", DETAILS_FIELDS)],
        )?;
        let envelope: ApiResponse<DetailsResponse> = self.get_envelope(&url, "details").await?;
        Self::check_status(&envelope.status, envelope.error_message.as_deref(), place_id)?;

        envelope
            .data
            .result
            .map(|result| result.into_details(place_id))
            .ok_or_else(|| PlacesError::NotFound(place_id.to_owned()))
    }

    /// Builds the endpoint URL with percent-encoded query parameters, the
    /// API key first.
    pub(crate) fn build_url(&self, path: &str, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request with retry, asserts a 2xx status and decodes the
    /// envelope.
    async fn get_envelope<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, PlacesError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(PlacesError::from_request)?;
            let response = response
                .error_for_status()
                .map_err(PlacesError::from_request)?;
            response.text().await.map_err(PlacesError::from_request)
        })
        .await?;

        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    /// Maps the envelope `status` to an error for anything but `OK` and
    /// `ZERO_RESULTS`.
    pub(crate) fn check_status(
        status: &str,
        error_message: Option<&str>,
        subject: &str,
    ) -> Result<(), PlacesError> {
        let message = || error_message.unwrap_or("no error message").to_owned();
        match status {
            "OK" | "ZERO_RESULTS" => Ok(()),
            "OVER_QUERY_LIMIT" => Err(PlacesError::QuotaExceeded(message())),
            "NOT_FOUND" => Err(PlacesError::NotFound(subject.to_owned())),
            other => Err(PlacesError::ApiError {
                status: other.to_owned(),
                message: message(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
