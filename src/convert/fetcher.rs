use crate::core::currency::CurrencyCode;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Default host of the public exchange-rate API.
pub const DEFAULT_RATE_API_BASE: &str = "https://api.exchangerate-api.com";

/// Errors arising while fetching a fresh rate table.
///
/// These never escape the converter: every fetch failure degrades to the
/// stale-cache or identity-rate fallback.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("rate request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rate API returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("rate fetching is disabled")]
    Offline,
}

/// Source of fresh exchange-rate tables for a base currency.
///
/// Abstracted so tests can substitute canned tables and the CLI can run
/// with networking disabled.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch_rates(
        &self,
        base: &CurrencyCode,
    ) -> Result<HashMap<CurrencyCode, Decimal>, FetchError>;
}

/// Wire shape of `GET /v4/latest/{BASE}`.
#[derive(Debug, Deserialize)]
struct RateApiResponse {
    rates: HashMap<String, f64>,
}

/// Production fetcher backed by the exchangerate-api.com v4 endpoint.
pub struct HttpRateFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRateFetcher {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_RATE_API_BASE)
    }

    /// Point the fetcher at a different host (tests, mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for HttpRateFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateFetcher for HttpRateFetcher {
    async fn fetch_rates(
        &self,
        base: &CurrencyCode,
    ) -> Result<HashMap<CurrencyCode, Decimal>, FetchError> {
        let url = format!("{}/v4/latest/{}", self.base_url, base);
        log::debug!("fetching rate table: {url}");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body: RateApiResponse = response.json().await?;
        let rates = body
            .rates
            .into_iter()
            .filter_map(|(code, rate)| {
                // The API serves rates as floats; non-finite or
                // unrepresentable values are dropped rather than guessed.
                Decimal::from_f64_retain(rate).map(|d| (CurrencyCode::new(code), d))
            })
            .collect();
        Ok(rates)
    }
}

/// Fetcher that always fails, forcing the converter through its cache and
/// identity fallbacks. Used by the CLI's `--offline` mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRateFetcher;

#[async_trait]
impl RateFetcher for OfflineRateFetcher {
    async fn fetch_rates(
        &self,
        _base: &CurrencyCode,
    ) -> Result<HashMap<CurrencyCode, Decimal>, FetchError> {
        Err(FetchError::Offline)
    }
}
