//! Request DTOs for the exchange-rate API
//!
//! Defines the query parameters accepted by the HTTP endpoints.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::rates::{Currency, Interval, RateQuery};

/// Query string of `GET /rates`
///
/// # Fields
/// - `start`, `end`: inclusive period bounds (`YYYY-MM-DD`)
/// - `from`: base currency (default EUR; an explicit empty value leaves the
///   base segment blank)
/// - `to`: quoted currency (default: all)
/// - `interval`: `M` or `D` (default M)
/// - `type`, `variation`: series key suffix (default `SP00`, `A`)
#[derive(Debug, Clone, Deserialize)]
pub struct RatesRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default, rename = "type")]
    pub rate_type: Option<String>,
    #[serde(default)]
    pub variation: Option<String>,
}

impl RatesRequest {
    /// Validates the parameters and converts them into a [`RateQuery`].
    ///
    /// Empty strings are treated as absent, except for `from` where an empty
    /// value clears the EUR default.
    pub fn into_query(self) -> Result<RateQuery> {
        let mut query = RateQuery::new(self.start, self.end);

        if let Some(interval) = non_empty(self.interval) {
            query.interval = interval.parse::<Interval>()?;
        }
        if let Some(from) = self.from {
            query.from_currency = non_empty(Some(from))
                .map(|from| from.parse::<Currency>())
                .transpose()?;
        }
        if let Some(to) = non_empty(self.to) {
            query.to_currency = Some(to.parse::<Currency>()?);
        }
        if let Some(rate_type) = non_empty(self.rate_type) {
            query.rate_type = validate_segment("type", rate_type)?;
        }
        if let Some(variation) = non_empty(self.variation) {
            query.variation_code = validate_segment("variation", variation)?;
        }

        Ok(query)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Series key segments are plain alphanumeric codes.
fn validate_segment(name: &str, value: String) -> Result<String> {
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(value)
    } else {
        Err(Error::InvalidRequest(format!(
            "{name} must be alphanumeric, got '{value}'"
        )))
    }
}
