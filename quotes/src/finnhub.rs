//! Finnhub REST API client.
//!
//! Requires the `finnhub` feature. Quotes come from `GET /api/v1/quote`,
//! profiles from `GET /api/v1/stock/profile2`. Finnhub answers unknown
//! symbols with an all-zero quote body rather than an error status; that
//! case is mapped to [`QuoteError::UnknownSymbol`].

use std::time::Duration;

use folio::Symbol;
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::QuoteProvider;
use crate::error::QuoteError;
use crate::types::{CompanyProfile, Quote};

const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

/// Finnhub quote response.
#[derive(Debug, Deserialize)]
pub struct QuoteResponse {
    /// Current price.
    #[serde(default)]
    pub c: f64,
    /// Change since previous close.
    #[serde(default)]
    pub d: f64,
    /// Percent change since previous close.
    #[serde(default)]
    pub dp: f64,
    /// Day high.
    #[serde(default)]
    pub h: f64,
    /// Day low.
    #[serde(default)]
    pub l: f64,
    /// Day open.
    #[serde(default)]
    pub o: f64,
    /// Previous close.
    #[serde(default)]
    pub pc: f64,
}

/// Finnhub company profile response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub finnhub_industry: String,
    #[serde(default)]
    pub market_capitalization: f64,
}

/// Blocking Finnhub REST client.
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_timeout(api_key, Duration::from_secs(30))
    }

    pub fn with_timeout(api_key: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different base URL (for tests or proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        symbol: &str,
    ) -> Result<T, QuoteError> {
        let url = format!(
            "{}/{path}?symbol={symbol}&token={}",
            self.base_url, self.api_key
        );

        debug!("Finnhub request: {path}?symbol={symbol}");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| QuoteError::Connection(format!("{path} request failed: {e}")))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(QuoteError::RateLimit);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(QuoteError::Auth(format!("{path} returned {status}")));
        }
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(QuoteError::Connection(format!(
                "{path} returned {status}: {body}"
            )));
        }

        resp.json::<T>()
            .map_err(|e| QuoteError::Connection(format!("failed to parse {path}: {e}")))
    }
}

impl QuoteProvider for FinnhubClient {
    fn quote(&self, symbol: &Symbol) -> Result<Quote, QuoteError> {
        let raw: QuoteResponse = self.get_json("quote", symbol.as_str())?;

        // All-zero body means Finnhub has no data for the symbol.
        if raw.c == 0.0 && raw.pc == 0.0 && raw.h == 0.0 && raw.l == 0.0 {
            return Err(QuoteError::UnknownSymbol(symbol.as_str().to_string()));
        }

        Ok(Quote {
            symbol: *symbol,
            current: raw.c,
            change: raw.d,
            percent_change: raw.dp,
            high: raw.h,
            low: raw.l,
            open: raw.o,
            previous_close: raw.pc,
        })
    }

    fn profile(&self, symbol: &Symbol) -> Result<CompanyProfile, QuoteError> {
        let raw: ProfileResponse = self.get_json("stock/profile2", symbol.as_str())?;

        // Unknown symbols come back as an empty object.
        if raw.name.is_empty() {
            return Err(QuoteError::UnknownSymbol(symbol.as_str().to_string()));
        }

        Ok(CompanyProfile {
            symbol: *symbol,
            name: raw.name,
            exchange: raw.exchange,
            currency: raw.currency,
            industry: raw.finnhub_industry,
            market_cap: raw.market_capitalization,
        })
    }
}
