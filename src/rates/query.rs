//! Query construction
//!
//! Turns a [`RateQuery`] into the SDMX request URL for the configured
//! endpoint: `<endpoint><series key>?startPeriod=...&endPeriod=...`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

macro_rules! currencies {
    ($($code:ident),+ $(,)?) => {
        /// Currencies published by the ECB reference rate series.
        #[allow(clippy::upper_case_acronyms)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Currency {
            $($code),+
        }

        impl Currency {
            pub const ALL: &'static [Currency] = &[$(Currency::$code),+];

            /// ISO 4217 code.
            pub fn code(self) -> &'static str {
                match self {
                    $(Currency::$code => stringify!($code)),+
                }
            }
        }
    };
}

currencies!(
    EUR, USD, JPY, BGN, CZK, DKK, GBP, HUF, PLN, RON, SEK, CHF, ISK, NOK, HRK, RUB, TRY, AUD,
    BRL, CAD, CNY, HKD, IDR, ILS, INR, KRW, MXN, MYR, NZD, PHP, SGD, THB, ZAR,
);

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_ascii_uppercase();
        Currency::ALL
            .iter()
            .copied()
            .find(|currency| currency.code() == code)
            .ok_or_else(|| Error::InvalidRequest(format!("Unknown currency: {code}")))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Observation frequency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "M")]
    Monthly,
    #[serde(rename = "D")]
    Daily,
}

impl Interval {
    pub fn code(self) -> &'static str {
        match self {
            Interval::Monthly => "M",
            Interval::Daily => "D",
        }
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "M" | "m" => Ok(Interval::Monthly),
            "D" | "d" => Ok(Interval::Daily),
            other => Err(Error::InvalidRequest(format!("Unknown interval: {other}"))),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

pub const DEFAULT_RATE_TYPE: &str = "SP00";
pub const DEFAULT_VARIATION_CODE: &str = "A";

// == Rate Query ==
/// Parameters of one exchange-rate request.
///
/// `to_currency: None` asks for every currency quoted against
/// `from_currency`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuery {
    pub start_period: NaiveDate,
    pub end_period: NaiveDate,
    pub interval: Interval,
    pub from_currency: Option<Currency>,
    pub to_currency: Option<Currency>,
    pub rate_type: String,
    pub variation_code: String,
}

impl RateQuery {
    /// Monthly reference rates against EUR for all currencies.
    pub fn new(start_period: NaiveDate, end_period: NaiveDate) -> Self {
        Self {
            start_period,
            end_period,
            interval: Interval::default(),
            from_currency: Some(Currency::EUR),
            to_currency: None,
            rate_type: DEFAULT_RATE_TYPE.to_string(),
            variation_code: DEFAULT_VARIATION_CODE.to_string(),
        }
    }

    pub fn interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    pub fn from_currency(mut self, currency: Currency) -> Self {
        self.from_currency = Some(currency);
        self
    }

    pub fn to_currency(mut self, currency: Currency) -> Self {
        self.to_currency = Some(currency);
        self
    }

    /// Series key, e.g. `D.USD.EUR.SP00.A`.
    pub fn series_key(&self) -> String {
        [
            self.interval.code(),
            self.to_currency.map_or("", Currency::code),
            self.from_currency.map_or("", Currency::code),
            self.rate_type.as_str(),
            self.variation_code.as_str(),
        ]
        .join(".")
    }

    /// Resolves the request URL against `endpoint`.
    pub fn url(&self, endpoint: &str) -> Result<Url> {
        if self.start_period > self.end_period {
            return Err(Error::InvalidRequest(format!(
                "startPeriod {} is after endPeriod {}",
                self.start_period, self.end_period
            )));
        }

        let base = Url::parse(endpoint)
            .map_err(|e| Error::InvalidRequest(format!("Invalid endpoint '{endpoint}': {e}")))?;
        let mut url = base
            .join(&self.series_key())
            .map_err(|e| Error::InvalidRequest(format!("Invalid series key: {e}")))?;

        url.query_pairs_mut()
            .append_pair("startPeriod", &format_date(self.start_period))
            .append_pair("endPeriod", &format_date(self.end_period));

        Ok(url)
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
