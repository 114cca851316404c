//! Error types for the Bitcoin price widget

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur when fetching the rate from a provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Invalid response from provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Provider API error
    #[error("Provider API error: {0}")]
    ApiError(String),

    /// Timeout waiting for response
    #[error("Request timeout")]
    Timeout,
}

impl ProviderError {
    /// Classifies a transport error, keeping timeouts distinct
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::NetworkError(err)
        }
    }
}

/// Errors surfaced to the user by the widget
///
/// None of these is fatal: each one is reported through a toast and the
/// widget keeps its last-known-good state.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The price request failed
    #[error("Failed to fetch BTC price: {0}")]
    FetchFailure(#[from] ProviderError),

    /// The USD amount is above the configured ceiling
    #[error("Amount {value} exceeds the maximum of {limit}")]
    InputLimitExceeded { value: Decimal, limit: Decimal },

    /// The USD field contains something other than a number
    #[error("Invalid amount: {0:?}")]
    InvalidInput(String),
}

impl WidgetError {
    /// Creates an InputLimitExceeded error
    pub fn limit_exceeded(value: Decimal, limit: Decimal) -> Self {
        Self::InputLimitExceeded { value, limit }
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(text: impl Into<String>) -> Self {
        Self::InvalidInput(text.into())
    }
}
