//! ECB Rates - Exchange-rate fetcher with a bounded single-flight cache
//!
//! Downloads SDMX exchange-rate series, converts them into JSON-friendly
//! records, and memoizes results in a bounded cache that is flushed on a
//! fixed interval.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod rates;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{Error, FetchError};
pub use rates::{ExchangeRates, RateQuery};
