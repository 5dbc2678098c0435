use serde::{Deserialize, Serialize};

/// A candidate address returned by a place lookup.
///
/// `place_id` is opaque; it is only ever handed back to
/// [`PlaceLookup::fetch_place`](crate::PlaceLookup::fetch_place).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub place_id: String,
    pub primary_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_text: Option<String>,
    pub description: String,
}

impl Prediction {
    /// Builds a prediction whose description is `primary, secondary`.
    #[must_use]
    pub fn new(place_id: &str, primary_text: &str, secondary_text: Option<&str>) -> Self {
        let description = match secondary_text {
            Some(secondary) if !secondary.is_empty() => format!("{primary_text}, {secondary}"),
            _ => primary_text.to_owned(),
        };
        Self {
            place_id: place_id.to_owned(),
            primary_text: primary_text.to_owned(),
            secondary_text: secondary_text.map(str::to_owned),
            description,
        }
    }
}
