pub mod client;
pub mod error;
mod lookup;
pub(crate) mod retry;
pub mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
