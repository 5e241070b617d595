//! Fetch-and-parse producer
//!
//! Downloads one SDMX document with a timeout and a body size cap, then hands
//! it to the parser. This is the producer the memoizer wraps.

use std::time::{Duration, Instant};

use reqwest::{Client, Response};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::rates::parse;

const USER_AGENT: &str = concat!("ecb_rates/", env!("CARGO_PKG_VERSION"));

// == Fetcher ==
/// HTTP client configured with the pipeline's timeout and size cap.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    max_response_bytes: usize,
}

impl Fetcher {
    pub fn new(timeout: Duration, max_response_bytes: usize) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            max_response_bytes,
        })
    }

    /// Fetches `url` and returns the serialized [`ExchangeRateRecord`].
    ///
    /// [`ExchangeRateRecord`]: crate::models::ExchangeRateRecord
    pub async fn fetch_and_parse(&self, url: &str) -> Result<String, FetchError> {
        let xml = self.fetch_text(url).await?;

        if xml.trim().is_empty() {
            debug!(url, "result set is empty");
        } else {
            debug!(url, "processing result set");
        }

        let json = parse::transform(&xml, url)?;
        debug!(url, "done processing result set");
        Ok(json)
    }

    /// GETs `url` and returns the body text of a successful response.
    ///
    /// A non-success status fails with [`FetchError::Remote`] carrying the
    /// body text.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "fetching");
        let started = Instant::now();

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = self.read_capped(&mut response).await?;
        let text = String::from_utf8_lossy(&body).into_owned();

        if !status.is_success() {
            warn!(url, status = status.as_u16(), "upstream returned an error");
            return Err(FetchError::Remote(text));
        }

        debug!(
            url,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "downloaded exchange rates"
        );
        Ok(text)
    }

    /// Reads the body chunk by chunk, failing as soon as it exceeds the cap.
    async fn read_capped(&self, response: &mut Response) -> Result<Vec<u8>, FetchError> {
        let limit = self.max_response_bytes;

        if let Some(announced) = response.content_length() {
            if announced > limit as u64 {
                return Err(FetchError::TooLarge { limit });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
