//! Scripted sessions for reproducing debounce timing.
//!
//! ```yaml
//! steps:
//!   - type: "123 M"
//!   - type: "123 Main"
//!     after_ms: 200
//!   - wait_ms: 1500
//!   - select: 0
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use addrfill_core::PlaceLookup;
use addrfill_session::{PredictionSession, SessionConfig, SessionOutcome};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct ReplayScript {
    pub(crate) steps: Vec<Step>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub(crate) enum Step {
    Type {
        #[serde(rename = "type")]
        text: String,
        #[serde(default)]
        after_ms: u64,
    },
    Wait {
        wait_ms: u64,
    },
    Select {
        select: usize,
    },
    Manual {
        manual: bool,
    },
    Back {
        back: bool,
    },
    Clear {
        clear: bool,
    },
}

pub(crate) fn parse_script(yaml: &str) -> anyhow::Result<ReplayScript> {
    serde_yaml::from_str(yaml).map_err(|e| anyhow::anyhow!("invalid replay script: {e}"))
}

/// Loads a script from `path`, replays it and prints the outcome as JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a step is
/// invalid for the session's state.
pub(crate) async fn run_replay_file(
    lookup: Arc<dyn PlaceLookup>,
    config: SessionConfig,
    path: &Path,
) -> anyhow::Result<()> {
    let yaml = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let script = parse_script(&yaml)?;

    let session = PredictionSession::new(lookup, config);
    let result = replay(&session, &script).await;
    session.shutdown().await;

    crate::print_json(&result?)
}

/// Runs `script` against `session`.
///
/// Steps after the first one that commits are skipped. A script that ends
/// without committing is treated as back navigation.
pub(crate) async fn replay(
    session: &PredictionSession,
    script: &ReplayScript,
) -> anyhow::Result<SessionOutcome> {
    for (n, step) in script.steps.iter().enumerate() {
        let committed = match step {
            Step::Type { text, after_ms } => {
                tokio::time::sleep(Duration::from_millis(*after_ms)).await;
                session.set_query(text);
                None
            }
            Step::Wait { wait_ms } => {
                tokio::time::sleep(Duration::from_millis(*wait_ms)).await;
                None
            }
            Step::Select { select } => {
                let snapshot = session.snapshot();
                let Some(prediction) = snapshot.predictions.get(*select) else {
                    anyhow::bail!(
                        "step {n}: no prediction at index {select}; {} shown",
                        snapshot.predictions.len()
                    );
                };
                session.select_prediction(prediction).await
            }
            Step::Manual { manual: true } => session.on_enter_manually(),
            Step::Back { back: true } => session.on_back_pressed(),
            Step::Clear { clear: true } => {
                session.clear();
                None
            }
            Step::Manual { manual: false }
            | Step::Back { back: false }
            | Step::Clear { clear: false } => None,
        };

        if let Some(outcome) = committed {
            let skipped = script.steps.len() - n - 1;
            if skipped > 0 {
                tracing::warn!(skipped, "session committed before the script ended");
            }
            return Ok(outcome);
        }
    }

    session
        .on_back_pressed()
        .ok_or_else(|| anyhow::anyhow!("session closed without an outcome"))
}

#[cfg(test)]
#[path = "replay_test.rs"]
mod tests;
