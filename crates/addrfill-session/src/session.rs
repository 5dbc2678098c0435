//! The autocomplete session: debounced lookups, observable predictions and a
//! single terminal outcome.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use addrfill_core::{Address, AppConfig, PlaceLookup, Prediction};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::debouncer::{DebounceConfig, QueryDebouncer};
use crate::error::SessionError;
use crate::reconciler::{reconcile, SessionEnd};
use crate::state::{LookupOutcome, PredictionSnapshot, SessionOutcome, SessionPhase};

pub const MAX_DISPLAYED_RESULTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Country lookups are restricted to. Lookups fail without one.
    pub country: Option<String>,
    pub limit: usize,
    pub debounce: DebounceConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            country: None,
            limit: MAX_DISPLAYED_RESULTS,
            debounce: DebounceConfig::default(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            country: config.country.clone(),
            limit: config.max_results,
            debounce: DebounceConfig {
                min_chars: config.min_query_chars,
                delay: std::time::Duration::from_millis(config.debounce_ms),
            },
        }
    }

    #[must_use]
    pub fn with_country(mut self, country: &str) -> Self {
        self.country = Some(country.to_ascii_uppercase());
        self
    }
}

/// State shared between the session handle, its debouncer task and the
/// lookup tasks it spawns.
struct Shared {
    id: Uuid,
    lookup: Arc<dyn PlaceLookup>,
    country: Option<String>,
    limit: usize,
    query_tx: watch::Sender<String>,
    state_tx: watch::Sender<PredictionSnapshot>,
    outcome_tx: Mutex<Option<oneshot::Sender<SessionOutcome>>>,
    /// Id of the newest lookup; completions carrying any other id are stale.
    latest_request: AtomicU64,
    cancel: CancellationToken,
}

/// One autocomplete interaction, from the first keystroke to a committed
/// result.
///
/// Must be created inside a tokio runtime: construction spawns the debouncer
/// task. Dropping the session disposes it.
pub struct PredictionSession {
    shared: Arc<Shared>,
    outcome_rx: Option<oneshot::Receiver<SessionOutcome>>,
    debouncer: Option<JoinHandle<()>>,
}

impl PredictionSession {
    pub fn new(lookup: Arc<dyn PlaceLookup>, config: SessionConfig) -> Self {
        let (query_tx, query_rx) = watch::channel(String::new());
        let (state_tx, _) = watch::channel(PredictionSnapshot::default());
        let (outcome_tx, outcome_rx) = oneshot::channel();

        let shared = Arc::new(Shared {
            id: Uuid::new_v4(),
            lookup,
            country: config.country,
            limit: config.limit,
            query_tx,
            state_tx,
            outcome_tx: Mutex::new(Some(outcome_tx)),
            latest_request: AtomicU64::new(0),
            cancel: CancellationToken::new(),
        });

        tracing::info!(
            session_id = %shared.id,
            country = shared.country.as_deref().unwrap_or("<unset>"),
            "autocomplete session started"
        );

        let debouncer = QueryDebouncer::new(config.debounce);
        let token = shared.cancel.clone();
        let task_shared = Arc::clone(&shared);
        let debouncer = tokio::spawn(async move {
            debouncer
                .watch(query_rx, token, move |query| {
                    let shared = Arc::clone(&task_shared);
                    let request_id = shared.next_request_id();
                    tokio::spawn(async move {
                        shared.lookup_with_id(&query, request_id).await;
                    });
                })
                .await;
        });

        Self {
            shared,
            outcome_rx: Some(outcome_rx),
            debouncer: Some(debouncer),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Hands out the terminal outcome receiver. Returns `None` after the
    /// first call.
    pub fn take_outcome(&mut self) -> Option<oneshot::Receiver<SessionOutcome>> {
        self.outcome_rx.take()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PredictionSnapshot> {
        self.shared.state_tx.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> PredictionSnapshot {
        self.shared.state_tx.borrow().clone()
    }

    #[must_use]
    pub fn query(&self) -> String {
        self.shared.query_tx.borrow().clone()
    }

    /// `true` once the session committed a result or was disposed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Replaces the query text. Setting the current value again is not an
    /// edit and does not restart the debounce timer.
    pub fn set_query(&self, text: &str) {
        if self.is_closed() {
            return;
        }
        self.shared.query_tx.send_if_modified(|query| {
            if query == text {
                false
            } else {
                text.clone_into(query);
                true
            }
        });
    }

    /// Looks `query` up immediately, bypassing the debouncer.
    ///
    /// The returned outcome is what the lookup capability answered; it is
    /// only applied to the snapshot if no newer lookup was issued meanwhile.
    pub async fn lookup(&self, query: &str) -> LookupOutcome {
        let request_id = self.shared.next_request_id();
        self.shared.lookup_with_id(query, request_id).await
    }

    /// Fetches the selected prediction's place and commits the session.
    ///
    /// A failed fetch is recorded and still commits, with
    /// [`AddressResult::None`](addrfill_core::AddressResult::None). Returns
    /// `None` if the session was already closed.
    pub async fn fetch_place(&self, place_id: &str) -> Option<SessionOutcome> {
        self.shared.fetch_place(place_id).await
    }

    pub async fn select_prediction(&self, prediction: &Prediction) -> Option<SessionOutcome> {
        self.fetch_place(&prediction.place_id).await
    }

    /// Empties the query and the predictions.
    ///
    /// Pending debounce timers are dropped and in-flight lookups will not be
    /// applied. Calling it on an empty session changes nothing.
    pub fn clear(&self) {
        if self.is_closed() {
            return;
        }
        self.shared.query_tx.send_if_modified(|query| {
            let changed = !query.is_empty();
            query.clear();
            changed
        });
        let shared = &self.shared;
        shared.state_tx.send_if_modified(|state| {
            if shared.cancel.is_cancelled() {
                return false;
            }
            shared.latest_request.fetch_add(1, Ordering::SeqCst);
            let changed =
                !state.predictions.is_empty() || state.loading || state.phase != SessionPhase::Idle;
            state.predictions.clear();
            state.loading = false;
            state.phase = SessionPhase::Idle;
            changed
        });
    }

    /// Back navigation: commits the typed line if there is one, else nothing.
    pub fn on_back_pressed(&self) -> Option<SessionOutcome> {
        self.shared.commit(SessionEnd::BackNavigation)
    }

    /// Commits the typed line as a manual address, even when blank.
    pub fn on_enter_manually(&self) -> Option<SessionOutcome> {
        self.shared.commit(SessionEnd::EnterManually)
    }

    /// Ends the session without a result. In-flight calls are abandoned and
    /// the outcome receiver observes a closed channel.
    pub fn dispose(&self) {
        if self.shared.cancel.is_cancelled() {
            return;
        }
        self.shared.cancel.cancel();
        self.shared
            .outcome_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        tracing::debug!(session_id = %self.shared.id, "autocomplete session disposed");
    }

    /// Disposes the session and waits for its debouncer task to stop.
    pub async fn shutdown(mut self) {
        self.dispose();
        if let Some(handle) = self.debouncer.take() {
            if let Err(err) = handle.await {
                tracing::warn!(session_id = %self.shared.id, error = %err, "debouncer task failed");
            }
        }
    }
}

impl Drop for PredictionSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Shared {
    fn next_request_id(&self) -> u64 {
        self.latest_request.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Applies `update` under the snapshot lock if the session is live and,
    /// for lookups, `request_id` is still the newest request.
    fn apply<F>(&self, request_id: Option<u64>, update: F) -> bool
    where
        F: FnOnce(&mut PredictionSnapshot),
    {
        let mut applied = false;
        self.state_tx.send_if_modified(|state| {
            if self.cancel.is_cancelled() {
                return false;
            }
            if let Some(id) = request_id {
                if self.latest_request.load(Ordering::SeqCst) != id {
                    return false;
                }
            }
            update(state);
            applied = true;
            true
        });
        applied
    }

    fn record_failure(&self, request_id: Option<u64>, err: SessionError) -> bool {
        self.apply(request_id, |state| {
            state.loading = false;
            state.phase = SessionPhase::Failed;
            state.last_failure = Some(err);
            state.failure_count += 1;
        })
    }

    async fn lookup_with_id(&self, query: &str, request_id: u64) -> LookupOutcome {
        if self.cancel.is_cancelled() {
            return LookupOutcome::Failure(SessionError::Closed);
        }

        let Some(country) = self.country.as_deref() else {
            let err = SessionError::Configuration("country cannot be empty".to_owned());
            tracing::warn!(session_id = %self.id, request_id, "lookup without a country");
            self.record_failure(Some(request_id), err.clone());
            return LookupOutcome::Failure(err);
        };

        self.apply(Some(request_id), |state| {
            state.loading = true;
            state.phase = SessionPhase::Querying;
        });
        tracing::debug!(
            session_id = %self.id,
            request_id,
            query_len = query.chars().count(),
            country,
            "dispatching prediction lookup"
        );

        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                return LookupOutcome::Failure(SessionError::Closed);
            }
            result = self.lookup.find_predictions(query, country, self.limit) => result,
        };

        match result {
            Ok(predictions) => {
                let applied = self.apply(Some(request_id), |state| {
                    state.predictions.clone_from(&predictions);
                    state.loading = false;
                    state.phase = SessionPhase::PredictionsShown;
                });
                if !applied {
                    tracing::debug!(
                        session_id = %self.id,
                        request_id,
                        "discarding stale predictions"
                    );
                }
                LookupOutcome::Success(predictions)
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %self.id,
                    request_id,
                    error = %e,
                    "prediction lookup failed"
                );
                let err = SessionError::LookupFailure(e);
                self.record_failure(Some(request_id), err.clone());
                LookupOutcome::Failure(err)
            }
        }
    }

    async fn fetch_place(&self, place_id: &str) -> Option<SessionOutcome> {
        if self.cancel.is_cancelled() {
            return None;
        }

        // Lookups still in flight must not touch the state once a place is chosen.
        self.next_request_id();
        self.apply(None, |state| state.loading = true);
        tracing::debug!(session_id = %self.id, place_id, "fetching place");

        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return None,
            result = self.lookup.fetch_place(place_id) => result,
        };

        let end = match result {
            Ok(place) => {
                self.apply(None, |state| state.loading = false);
                SessionEnd::Selected(Ok(Address::from_place(&place)))
            }
            Err(e) => {
                tracing::warn!(session_id = %self.id, place_id, error = %e, "place fetch failed");
                let err = SessionError::FetchFailure(e);
                self.record_failure(None, err.clone());
                SessionEnd::Selected(Err(err))
            }
        };
        self.commit(end)
    }

    /// Emits the outcome for `end` exactly once and closes the session.
    fn commit(&self, end: SessionEnd) -> Option<SessionOutcome> {
        let sender = self
            .outcome_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;

        let query = self.query_tx.borrow().clone();
        let outcome = reconcile(end, &query);
        self.cancel.cancel();
        self.state_tx.send_modify(|state| {
            state.loading = false;
            state.phase = SessionPhase::Committed;
        });

        tracing::info!(
            session_id = %self.id,
            result = outcome.result.kind(),
            failed = outcome.failure.is_some(),
            "autocomplete session committed"
        );
        if sender.send(outcome.clone()).is_err() {
            tracing::debug!(session_id = %self.id, "outcome receiver already dropped");
        }
        Some(outcome)
    }
}
