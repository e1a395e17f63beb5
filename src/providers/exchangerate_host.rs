use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::core::source::{FetchError, RateSource};

// ExchangeRateHostProvider implementation for RateSource
pub struct ExchangeRateHostProvider {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl ExchangeRateHostProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxconv/1.0")
            .timeout(timeout)
            .build()?;
        Ok(ExchangeRateHostProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }
}

#[derive(Deserialize, Debug)]
struct LatestRatesResponse {
    #[serde(default)]
    rates: HashMap<String, serde_json::Value>,
}

// Non-numeric entries are dropped so one bad value cannot discard the rest.
fn numeric_rates(rates: HashMap<String, serde_json::Value>) -> HashMap<String, f64> {
    rates
        .into_iter()
        .filter_map(|(code, value)| match value.as_f64() {
            Some(rate) => Some((code, rate)),
            None => {
                warn!(code = %code, value = %value, "Ignoring non-numeric fetched rate");
                None
            }
        })
        .collect()
}

#[async_trait]
impl RateSource for ExchangeRateHostProvider {
    #[instrument(
        name = "ExchangeRateFetch",
        skip(self),
        fields(base = %base)
    )]
    async fn fetch_rates(&self, base: &str) -> Result<HashMap<String, f64>, FetchError> {
        let url = format!("{}/latest?base={}", self.base_url, base);
        debug!("Requesting rates from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Network(format!(
                    "Request timed out after {}s",
                    self.timeout.as_secs_f64()
                ))
            } else {
                FetchError::Network(format!("Request error: {e}"))
            }
        })?;

        debug!(response = ?response, "Received rates response");

        if !response.status().is_success() {
            return Err(FetchError::Network(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to read response body: {e}")))?;

        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| FetchError::Parse(format!("Failed to parse JSON response: {e}")))?;

        let rates = numeric_rates(data.rates);
        debug!(count = rates.len(), "Parsed rates");
        Ok(rates)
    }
}
