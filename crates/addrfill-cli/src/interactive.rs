//! Line-driven session on stdin.
//!
//! Each plain line replaces the query. Lines starting with `:` are commands:
//! `:N` selects prediction `N`, `:manual` enters the typed line manually,
//! `:clear` clears, and `:back` (or end of input) navigates back.

use std::sync::Arc;

use addrfill_core::PlaceLookup;
use addrfill_session::{PredictionSession, SessionConfig, SessionOutcome};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Query(String),
    Select(usize),
    Manual,
    Clear,
    Back,
    Unknown(String),
}

pub(crate) fn parse_command(line: &str) -> Command {
    let Some(command) = line.strip_prefix(':') else {
        return Command::Query(line.to_owned());
    };
    match command.trim() {
        "manual" => Command::Manual,
        "clear" => Command::Clear,
        "back" => Command::Back,
        other => other
            .parse::<usize>()
            .map_or_else(|_| Command::Unknown(other.to_owned()), Command::Select),
    }
}

/// Runs an interactive session on stdin and prints the outcome as JSON.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or output cannot be serialized.
pub(crate) async fn run_interactive(
    lookup: Arc<dyn PlaceLookup>,
    config: SessionConfig,
) -> anyhow::Result<()> {
    let session = PredictionSession::new(lookup, config);
    let outcome = drive(&session, BufReader::new(tokio::io::stdin())).await?;
    crate::print_json(&outcome)?;
    session.shutdown().await;
    Ok(())
}

/// Feeds `input` to `session`, printing snapshots as they change, until a
/// command commits.
pub(crate) async fn drive<R>(
    session: &PredictionSession,
    input: R,
) -> anyhow::Result<SessionOutcome>
where
    R: AsyncBufRead + Unpin,
{
    let mut states = session.subscribe();
    let mut lines = input.lines();

    loop {
        tokio::select! {
            Ok(()) = states.changed() => {
                let snapshot = states.borrow_and_update().clone();
                crate::print_json(&snapshot)?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return committed(session.on_back_pressed());
                };
                if let Some(outcome) = handle_line(session, &line).await {
                    return committed(Some(outcome));
                }
            }
        }
    }
}

async fn handle_line(session: &PredictionSession, line: &str) -> Option<SessionOutcome> {
    match parse_command(line) {
        Command::Query(query) => {
            session.set_query(&query);
            None
        }
        Command::Select(index) => {
            let snapshot = session.snapshot();
            if let Some(prediction) = snapshot.predictions.get(index) {
                session.select_prediction(prediction).await
            } else {
                eprintln!(
                    "no prediction at index {index}; {} shown",
                    snapshot.predictions.len()
                );
                None
            }
        }
        Command::Manual => session.on_enter_manually(),
        Command::Clear => {
            session.clear();
            None
        }
        Command::Back => session.on_back_pressed(),
        Command::Unknown(command) => {
            eprintln!("unknown command ':{command}'; expected :N, :manual, :clear or :back");
            None
        }
    }
}

fn committed(outcome: Option<SessionOutcome>) -> anyhow::Result<SessionOutcome> {
    outcome.ok_or_else(|| anyhow::anyhow!("session closed without an outcome"))
}

#[cfg(test)]
#[path = "interactive_test.rs"]
mod tests;
