//! API Module
//!
//! HTTP handlers and routing for the exchange-rate service.
//!
//! # Endpoints
//! - `GET /rates` - Exchange rates for a period and currency pair
//! - `GET /stats` - Get cache statistics
//! - `DELETE /cache` - Flush the cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
