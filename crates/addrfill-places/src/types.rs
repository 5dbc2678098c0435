//! Places API response types.
//!
//! Every response is wrapped in a `{"status": "...", ...}` envelope with an
//! optional `error_message`; [`ApiResponse`] captures that generically.

use addrfill_core::{AddressComponent, PlaceDetails, Prediction};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

// ---------------------------------------------------------------------------
// autocomplete
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AutocompleteResponse {
    #[serde(default)]
    pub predictions: Vec<AutocompletePrediction>,
}

#[derive(Debug, Deserialize)]
pub struct AutocompletePrediction {
    pub place_id: String,
    pub description: String,
    #[serde(default)]
    pub structured_formatting: Option<StructuredFormatting>,
}

#[derive(Debug, Deserialize)]
pub struct StructuredFormatting {
    pub main_text: String,
    #[serde(default)]
    pub secondary_text: Option<String>,
}

impl From<AutocompletePrediction> for Prediction {
    fn from(raw: AutocompletePrediction) -> Self {
        match raw.structured_formatting {
            Some(fmt) => Prediction {
                place_id: raw.place_id,
                primary_text: fmt.main_text,
                secondary_text: fmt.secondary_text,
                description: raw.description,
            },
            None => Prediction {
                place_id: raw.place_id,
                primary_text: raw.description.clone(),
                secondary_text: None,
                description: raw.description,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// details
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DetailsResponse {
    #[serde(default)]
    pub result: Option<PlaceResult>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceResult {
    /// Absent when `place_id` was not among the requested fields.
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

impl PlaceResult {
    pub(crate) fn into_details(self, requested_id: &str) -> PlaceDetails {
        PlaceDetails {
            place_id: self.place_id.unwrap_or_else(|| requested_id.to_owned()),
            formatted_address: self.formatted_address,
            address_components: self.address_components,
        }
    }
}
