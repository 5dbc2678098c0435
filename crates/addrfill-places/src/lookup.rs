use addrfill_core::{LookupError, PlaceDetails, PlaceLookup, Prediction};
use async_trait::async_trait;

use crate::client::PlacesClient;

#[async_trait]
impl PlaceLookup for PlacesClient {
    async fn find_predictions(
        &self,
        query: &str,
        country: &str,
        limit: usize,
    ) -> Result<Vec<Prediction>, LookupError> {
        self.autocomplete(query, country, limit)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "autocomplete request failed");
                LookupError::from(e)
            })
    }

    async fn fetch_place(&self, place_id: &str) -> Result<PlaceDetails, LookupError> {
        self.place_details(place_id).await.map_err(|e| {
            tracing::warn!(place_id, error = %e, "place details request failed");
            LookupError::from(e)
        })
    }
}
