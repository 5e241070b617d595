//! Data models
//!
//! The exchange-rate record produced by the pipeline, plus the DTOs used
//! for serializing/deserializing HTTP request and response bodies.

pub mod record;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use record::{ExchangeRateRecord, Meta, Observation, Series};
pub use requests::RatesRequest;
pub use responses::{ClearResponse, HealthResponse, StatsResponse};
