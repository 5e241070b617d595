//! API Handlers
//!
//! HTTP request handlers for each endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::config::Config;
use crate::error::Result;
use crate::models::{
    ClearResponse, ExchangeRateRecord, HealthResponse, RatesRequest, StatsResponse,
};
use crate::rates::ExchangeRates;

/// Application state shared across all handlers.
///
/// Holds the memoized pipeline; the pipeline synchronizes its own cache.
#[derive(Clone)]
pub struct AppState {
    pub rates: Arc<ExchangeRates>,
}

impl AppState {
    /// Creates a new AppState around an existing pipeline.
    pub fn new(rates: ExchangeRates) -> Self {
        Self {
            rates: Arc::new(rates),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Starts the pipeline's invalidation task, so this must run inside a
    /// tokio runtime.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(ExchangeRates::new(config)?))
    }
}

/// Handler for GET /rates
///
/// Fetches (or serves from cache) the exchange rates for the query.
pub async fn rates_handler(
    State(state): State<AppState>,
    Query(req): Query<RatesRequest>,
) -> Result<Json<ExchangeRateRecord>> {
    let query = req.into_query()?;
    let record = state.rates.exchange_rate(&query).await?;

    Ok(Json(record))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.rates.stats().await.into())
}

/// Handler for DELETE /cache
///
/// Flushes the cache without waiting for the next invalidation tick.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let removed = state.rates.clear_cache().await;
    Json(ClearResponse::new(removed))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
