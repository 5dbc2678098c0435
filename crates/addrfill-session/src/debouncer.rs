//! Query debouncing.
//!
//! [`QueryDebouncer::watch`] consumes query edits from a `watch` channel and
//! calls back once per quiet period with the latest qualifying query.
//! Supersession and timer expiry are handled by the same `select!` loop, so a
//! superseded query can never produce a late callback.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(1000);
pub const MIN_CHARS_AUTOCOMPLETE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Queries must be strictly longer than this (in chars) to be looked up.
    pub min_chars: usize,
    /// Quiet period after the last edit before the lookup fires.
    pub delay: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            min_chars: MIN_CHARS_AUTOCOMPLETE,
            delay: SEARCH_DEBOUNCE,
        }
    }
}

impl DebounceConfig {
    #[must_use]
    pub fn qualifies(&self, query: &str) -> bool {
        query.chars().count() > self.min_chars
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryDebouncer {
    config: DebounceConfig,
}

impl QueryDebouncer {
    #[must_use]
    pub fn new(config: DebounceConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> DebounceConfig {
        self.config
    }

    /// Watches `queries` until `cancel` fires or the sender is dropped.
    ///
    /// Every new value discards the pending timer. Values that qualify arm a
    /// fresh timer; when it elapses undisturbed, `on_valid_query` is invoked
    /// with that value. A pending timer is dropped, not fired, on shutdown.
    /// The value present when watching starts is treated as already seen.
    pub async fn watch<F>(
        &self,
        mut queries: watch::Receiver<String>,
        cancel: CancellationToken,
        mut on_valid_query: F,
    ) where
        F: FnMut(String),
    {
        let mut pending: Option<String> = None;
        let timer = tokio::time::sleep(self.config.delay);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,

                changed = queries.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let query = queries.borrow_and_update().clone();
                    if pending.take().is_some() {
                        tracing::trace!("pending query superseded");
                    }
                    if self.config.qualifies(&query) {
                        timer.as_mut().reset(Instant::now() + self.config.delay);
                        pending = Some(query);
                    }
                }

                () = &mut timer, if pending.is_some() => {
                    if let Some(query) = pending.take() {
                        tracing::debug!(query_len = query.chars().count(), "debounce elapsed");
                        on_valid_query(query);
                    }
                }
            }
        }

        if pending.is_some() {
            tracing::trace!("debouncer stopped with a pending query");
        }
    }
}
