//! Exchange-rate record model
//!
//! Structured form of one SDMX response. Header and observation attributes
//! discovered at runtime are kept as flattened string maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Parsed response: every series found plus the URL it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateRecord {
    pub data: Vec<Series>,
    pub meta: Meta,
}

impl ExchangeRateRecord {
    /// Record for a response without any series.
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            meta: Meta { url: url.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub url: String,
}

/// One time series with its header attributes (`unit`, `decimals`,
/// `title`, `sourceAgency`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
    pub items: Vec<Observation>,
}

impl Series {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// One data point of a series.
///
/// `value` is NaN when the source carried no usable number. NaN is written as
/// JSON `null` and read back as NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default = "nan", deserialize_with = "nan_if_null")]
    pub value: f64,
}

impl Observation {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

fn nan() -> f64 {
    f64::NAN
}

fn nan_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
