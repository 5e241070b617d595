//! Exchange Rates Module
//!
//! Query construction, the fetch-and-parse producer, and the memoized
//! pipeline that ties them to the cache.

mod client;
mod fetch;
pub mod parse;
pub mod query;

pub use client::ExchangeRates;
pub use fetch::Fetcher;
pub use query::{Currency, Interval, RateQuery};
