use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let places_api_key = require("PLACES_API_KEY")?;

    let env = parse_environment(&or_default("ADDRFILL_ENV", "development"))?;
    let log_level = or_default("ADDRFILL_LOG_LEVEL", "info");
    let places_base_url = or_default("ADDRFILL_PLACES_BASE_URL", DEFAULT_PLACES_BASE_URL);
    let country = match lookup("ADDRFILL_COUNTRY") {
        Ok(raw) => Some(parse_country(&raw)?),
        Err(_) => None,
    };

    let request_timeout_secs = parse_u64("ADDRFILL_REQUEST_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("ADDRFILL_USER_AGENT", "addrfill/0.1 (address-autocomplete)");
    let max_retries = parse_u32("ADDRFILL_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("ADDRFILL_RETRY_BACKOFF_BASE_MS", "250")?;

    let debounce_ms = parse_u64("ADDRFILL_DEBOUNCE_MS", "1000")?;
    let min_query_chars = parse_usize("ADDRFILL_MIN_QUERY_CHARS", "3")?;
    let max_results = parse_usize("ADDRFILL_MAX_RESULTS", "4")?;
    if max_results == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ADDRFILL_MAX_RESULTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        places_api_key,
        places_base_url,
        country,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        debounce_ms,
        min_query_chars,
        max_results,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ADDRFILL_ENV".to_string(),
            reason: format!("expected development, test or production, got '{other}'"),
        }),
    }
}

/// Normalises an ISO 3166-1 alpha-2 country code to upper case.
///
/// Returns `None` unless `raw` is exactly two ASCII letters after trimming.
#[must_use]
pub fn normalize_country_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| trimmed.to_ascii_uppercase())
}

fn parse_country(raw: &str) -> Result<String, ConfigError> {
    normalize_country_code(raw).ok_or_else(|| ConfigError::InvalidEnvVar {
        var: "ADDRFILL_COUNTRY".to_string(),
        reason: format!("expected a two-letter country code, got '{raw}'"),
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
