use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use addrfill_core::{AddressComponent, LookupError, PlaceDetails, PlaceLookup, Prediction};
use addrfill_session::{PredictionSession, SessionConfig};
use async_trait::async_trait;

/// Answers lookups from a fixed table and records every query it sees.
#[derive(Default)]
pub(crate) struct TableLookup {
    pub(crate) predictions: HashMap<String, Vec<Prediction>>,
    pub(crate) queries: Mutex<Vec<String>>,
}

impl TableLookup {
    pub(crate) fn with(query: &str, predictions: Vec<Prediction>) -> Arc<Self> {
        let mut table = HashMap::new();
        table.insert(query.to_owned(), predictions);
        Arc::new(Self {
            predictions: table,
            queries: Mutex::default(),
        })
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaceLookup for TableLookup {
    async fn find_predictions(
        &self,
        query: &str,
        _country: &str,
        limit: usize,
    ) -> Result<Vec<Prediction>, LookupError> {
        self.queries.lock().unwrap().push(query.to_owned());
        let mut found = self.predictions.get(query).cloned().unwrap_or_default();
        found.truncate(limit);
        Ok(found)
    }

    async fn fetch_place(&self, place_id: &str) -> Result<PlaceDetails, LookupError> {
        Ok(PlaceDetails {
            place_id: place_id.to_owned(),
            formatted_address: Some("123 Main St, Springfield, IL 62701, USA".to_owned()),
            address_components: vec![
                AddressComponent::new("123", "123", &["street_number"]),
                AddressComponent::new("Main Street", "Main St", &["route"]),
                AddressComponent::new("Springfield", "Springfield", &["locality"]),
                AddressComponent::new("Illinois", "IL", &["administrative_area_level_1"]),
                AddressComponent::new("United States", "US", &["country"]),
            ],
        })
    }
}

pub(crate) fn session_with(lookup: &Arc<TableLookup>) -> PredictionSession {
    let lookup: Arc<dyn PlaceLookup> = lookup.clone();
    PredictionSession::new(lookup, SessionConfig::default().with_country("US"))
}

pub(crate) fn main_street() -> Vec<Prediction> {
    vec![
        Prediction::new("p1", "123 Main St", Some("Springfield, IL, USA")),
        Prediction::new("p2", "123 Main Ave", Some("Springfield, MO, USA")),
    ]
}
