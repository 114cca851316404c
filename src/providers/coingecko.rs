//! CoinGecko rate provider implementation

use crate::{
    constants::{
        COINGECKO_API_URL, COINGECKO_BITCOIN_ID, COINGECKO_SIMPLE_PRICE_ENDPOINT,
        COINGECKO_VS_CURRENCY, REQUEST_TIMEOUT_SECS, USER_AGENT,
    },
    error::ProviderError,
    provider::RateProvider,
    types::{ExchangeRate, RateQuote},
};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// CoinGecko API response for simple price queries
#[derive(Debug, Deserialize)]
struct CoinGeckoResponse {
    #[serde(flatten)]
    prices: HashMap<String, CoinGeckoPriceData>,
}

#[derive(Debug, Deserialize)]
struct CoinGeckoPriceData {
    usd: serde_json::Number,
}

/// CoinGecko rate provider
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko provider
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(COINGECKO_API_URL)
    }

    /// Creates a provider talking to another CoinGecko-compatible host
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::NetworkError)?;

        Ok(Self::with_client(client, base_url))
    }

    /// Creates a provider on top of an already configured HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Builds the CoinGecko API URL for the BTC/USD quote
    fn build_url(&self) -> String {
        format!(
            "{}{}?ids={}&vs_currencies={}",
            self.base_url,
            COINGECKO_SIMPLE_PRICE_ENDPOINT,
            COINGECKO_BITCOIN_ID,
            COINGECKO_VS_CURRENCY
        )
    }

    /// Parses a CoinGecko response body into a quote
    fn parse_response(&self, body: &str) -> Result<RateQuote, ProviderError> {
        let response: CoinGeckoResponse = serde_json::from_str(body).map_err(|e| {
            ProviderError::InvalidResponse(format!(
                "Failed to parse CoinGecko response: {}. Response: {}",
                e, body
            ))
        })?;

        let price = response.prices.get(COINGECKO_BITCOIN_ID).ok_or_else(|| {
            ProviderError::InvalidResponse("No bitcoin price returned from CoinGecko".to_string())
        })?;

        let usd = decimal_from_json(&price.usd)?;
        let rate = ExchangeRate::new(usd).ok_or_else(|| {
            ProviderError::InvalidResponse(format!("Non-positive bitcoin price: {}", usd))
        })?;

        Ok(RateQuote::new(rate, self.provider_name()))
    }
}

/// Converts a JSON number to a decimal through its textual form
fn decimal_from_json(number: &serde_json::Number) -> Result<Decimal, ProviderError> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| ProviderError::InvalidResponse(format!("Unusable price {}: {}", text, e)))
}

#[async_trait]
impl RateProvider for CoinGeckoProvider {
    async fn fetch_rate(&self) -> Result<RateQuote, ProviderError> {
        let url = self.build_url();
        tracing::debug!(url = %url, "Fetching BTC price from CoinGecko");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        // Check for rate limiting
        if response.status().as_u16() == 429 {
            return Err(ProviderError::RateLimitExceeded);
        }

        // Check for other errors
        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let response_text = response
            .text()
            .await
            .map_err(ProviderError::from_transport)?;

        let quote = self.parse_response(&response_text)?;

        tracing::debug!(rate = %quote.rate, "Fetched BTC price from CoinGecko");

        Ok(quote)
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}
