use std::sync::Arc;

use addrfill_core::PlaceLookup;
use addrfill_session::{LookupOutcome, PredictionSession, SessionConfig};

/// One-shot lookup for `query`.
///
/// Prints the predictions as JSON. With `select`, fetches the prediction at
/// that index and prints the committed outcome instead.
///
/// # Errors
///
/// Returns an error if the lookup fails or `select` is out of range.
pub(crate) async fn run_suggest(
    lookup: Arc<dyn PlaceLookup>,
    config: SessionConfig,
    query: &str,
    select: Option<usize>,
) -> anyhow::Result<()> {
    let session = PredictionSession::new(lookup, config);
    session.set_query(query);

    let predictions = match session.lookup(query).await {
        LookupOutcome::Success(predictions) => predictions,
        LookupOutcome::Failure(err) => {
            session.shutdown().await;
            anyhow::bail!("lookup failed: {err}");
        }
    };

    let Some(index) = select else {
        crate::print_json(&predictions)?;
        session.shutdown().await;
        return Ok(());
    };

    let Some(prediction) = predictions.get(index) else {
        session.shutdown().await;
        anyhow::bail!(
            "no prediction at index {index}; {} returned",
            predictions.len()
        );
    };

    let outcome = session
        .select_prediction(prediction)
        .await
        .ok_or_else(|| anyhow::anyhow!("session closed before the place was fetched"))?;
    crate::print_json(&outcome)?;
    session.shutdown().await;
    Ok(())
}
