//! Scripted in-memory `PlaceLookup` for session tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use addrfill_core::{AddressComponent, LookupError, PlaceDetails, PlaceLookup, Prediction};
use async_trait::async_trait;
use tokio::time::Instant;

#[derive(Default)]
pub struct FakeLookup {
    predictions: Mutex<HashMap<String, Result<Vec<Prediction>, LookupError>>>,
    places: Mutex<HashMap<String, Result<PlaceDetails, LookupError>>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<(String, String, usize, Instant)>>,
    fetches: Mutex<Vec<String>>,
}

impl FakeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predictions(self, query: &str, predictions: Vec<Prediction>) -> Self {
        self.predictions
            .lock()
            .unwrap()
            .insert(query.to_owned(), Ok(predictions));
        self
    }

    pub fn with_lookup_error(self, query: &str, err: LookupError) -> Self {
        self.predictions
            .lock()
            .unwrap()
            .insert(query.to_owned(), Err(err));
        self
    }

    pub fn with_place(self, place: PlaceDetails) -> Self {
        self.places
            .lock()
            .unwrap()
            .insert(place.place_id.clone(), Ok(place));
        self
    }

    pub fn with_fetch_error(self, place_id: &str, err: LookupError) -> Self {
        self.places
            .lock()
            .unwrap()
            .insert(place_id.to_owned(), Err(err));
        self
    }

    /// Delays answers for `key` (a query or a place id).
    pub fn with_delay(self, key: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(key.to_owned(), delay);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(q, _, _, _)| q.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<(String, String, usize, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    fn delay_for(&self, key: &str) -> Option<Duration> {
        self.delays.lock().unwrap().get(key).copied()
    }
}

#[async_trait]
impl PlaceLookup for FakeLookup {
    async fn find_predictions(
        &self,
        query: &str,
        country: &str,
        limit: usize,
    ) -> Result<Vec<Prediction>, LookupError> {
        self.calls.lock().unwrap().push((
            query.to_owned(),
            country.to_owned(),
            limit,
            Instant::now(),
        ));
        if let Some(delay) = self.delay_for(query) {
            tokio::time::sleep(delay).await;
        }
        let answer = self.predictions.lock().unwrap().get(query).cloned();
        answer
            .unwrap_or_else(|| Ok(Vec::new()))
            .map(|mut p| {
                p.truncate(limit);
                p
            })
    }

    async fn fetch_place(&self, place_id: &str) -> Result<PlaceDetails, LookupError> {
        self.fetches.lock().unwrap().push(place_id.to_owned());
        if let Some(delay) = self.delay_for(place_id) {
            tokio::time::sleep(delay).await;
        }
        let answer = self.places.lock().unwrap().get(place_id).cloned();
        answer.unwrap_or_else(|| Err(LookupError::NotFound(place_id.to_owned())))
    }
}

pub fn prediction(id: &str, main: &str) -> Prediction {
    Prediction::new(id, main, Some("Springfield, IL, USA"))
}

pub fn springfield_place(id: &str, number: &str) -> PlaceDetails {
    PlaceDetails {
        place_id: id.to_owned(),
        formatted_address: Some(format!("{number} Main St, Springfield, IL 62701, USA")),
        address_components: vec![
            AddressComponent::new(number, number, &["street_number"]),
            AddressComponent::new("Main Street", "Main St", &["route"]),
            AddressComponent::new("Springfield", "Springfield", &["locality", "political"]),
            AddressComponent::new("Illinois", "IL", &["administrative_area_level_1"]),
            AddressComponent::new("United States", "US", &["country"]),
            AddressComponent::new("62701", "62701", &["postal_code"]),
        ],
    }
}
