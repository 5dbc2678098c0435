mod interactive;
mod replay;
mod suggest;

use std::path::PathBuf;
use std::sync::Arc;

use addrfill_core::{AppConfig, PlaceLookup};
use addrfill_places::PlacesClient;
use addrfill_session::SessionConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "addrfill")]
#[command(about = "Debounced address autocomplete against the Places API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Look a query up once and print the predictions
    Suggest {
        /// Partial address to look up
        query: String,
        /// Restrict predictions to a country (ISO 3166-1 alpha-2)
        #[arg(long, value_parser = parse_country)]
        country: Option<String>,
        /// Fetch the prediction at this index and print the resolved address
        #[arg(long)]
        select: Option<usize>,
    },
    /// Type queries on stdin and watch predictions update
    Interactive {
        /// Restrict predictions to a country (ISO 3166-1 alpha-2)
        #[arg(long, value_parser = parse_country)]
        country: Option<String>,
    },
    /// Run a YAML script of timed edits and actions against a session
    Replay {
        /// Path to the replay script
        file: PathBuf,
        /// Restrict predictions to a country (ISO 3166-1 alpha-2)
        #[arg(long, value_parser = parse_country)]
        country: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = addrfill_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let client = PlacesClient::from_app_config(&config)
        .map_err(|e| anyhow::anyhow!("failed to build Places client: {e}"))?;
    let lookup: Arc<dyn PlaceLookup> = Arc::new(client);

    match cli.command {
        Commands::Suggest {
            query,
            country,
            select,
        } => {
            let session_config = session_config(&config, country.as_deref());
            suggest::run_suggest(lookup, session_config, &query, select).await
        }
        Commands::Interactive { country } => {
            let session_config = session_config(&config, country.as_deref());
            interactive::run_interactive(lookup, session_config).await
        }
        Commands::Replay { file, country } => {
            let session_config = session_config(&config, country.as_deref());
            replay::run_replay_file(lookup, session_config, &file).await
        }
    }
}

fn parse_country(raw: &str) -> Result<String, String> {
    addrfill_core::normalize_country_code(raw)
        .ok_or_else(|| format!("expected a two-letter country code, got '{raw}'"))
}

/// Session settings from the environment, with a `--country` override.
fn session_config(config: &AppConfig, country: Option<&str>) -> SessionConfig {
    let session_config = SessionConfig::from_app_config(config);
    match country {
        Some(country) => session_config.with_country(country),
        None => session_config,
    }
}

/// Writes `value` as one line of JSON to stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

#[cfg(test)]
mod test_support;
