//! Configuration Module
//!
//! Handles loading and managing fetcher and server configuration from
//! environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default SDMX endpoint for ECB exchange rates
pub const DEFAULT_ENDPOINT: &str = "https://sdw-wsrest.ecb.europa.eu/service/data/EXR/";

const MIB: usize = 1024 * 1024;
const HOUR_MS: u64 = 60 * 60 * 1000;

/// Fetcher configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL that series keys are resolved against
    pub endpoint: String,
    /// Upstream request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Largest accepted response body in bytes
    pub max_response_bytes: usize,
    /// Entry count bound of the result cache
    pub max_cache_entries: usize,
    /// Byte size bound of the result cache
    pub max_cache_bytes: usize,
    /// Interval between full cache flushes in milliseconds
    pub invalidation_interval_ms: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `ECB_ENDPOINT` - SDMX data endpoint (default: ECB EXR dataflow)
    /// - `REQUEST_TIMEOUT_MS` - Upstream timeout (default: 20000)
    /// - `MAX_RESPONSE_BYTES` - Response size cap (default: 2 MiB)
    /// - `MAX_CACHE_ENTRIES` - Cache entry bound (default: 100)
    /// - `MAX_CACHE_BYTES` - Cache byte bound (default: 20 MiB)
    /// - `INVALIDATION_INTERVAL_MS` - Full flush interval (default: 1 hour)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: env::var("ECB_ENDPOINT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.endpoint),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
            max_response_bytes: env_or("MAX_RESPONSE_BYTES", defaults.max_response_bytes),
            max_cache_entries: env_or("MAX_CACHE_ENTRIES", defaults.max_cache_entries),
            max_cache_bytes: env_or("MAX_CACHE_BYTES", defaults.max_cache_bytes),
            invalidation_interval_ms: env_or(
                "INVALIDATION_INTERVAL_MS",
                defaults.invalidation_interval_ms,
            ),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }

    /// Upstream timeout, never shorter than 1 ms.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    /// Flush interval, never shorter than 1 ms.
    pub fn invalidation_interval(&self) -> Duration {
        Duration::from_millis(self.invalidation_interval_ms.max(1))
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_ms: 20_000,
            max_response_bytes: 2 * MIB,
            max_cache_entries: 100,
            max_cache_bytes: 20 * MIB,
            invalidation_interval_ms: HOUR_MS,
            server_port: 3000,
        }
    }
}
