pub mod address;
pub mod app_config;
pub mod config;
pub mod lookup;
pub mod prediction;

pub use address::{Address, AddressComponent, AddressResult, PlaceDetails};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, normalize_country_code};
pub use lookup::{LookupError, PlaceLookup};
pub use prediction::Prediction;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
