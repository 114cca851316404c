//! Provider abstraction for fetching the BTC/USD rate from external APIs

use crate::{error::ProviderError, types::RateQuote};
use async_trait::async_trait;

/// Trait for rate providers
///
/// Implementations fetch the price of one Bitcoin in US dollars from some
/// source (CoinGecko, a test double, ...).
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the current USD/BTC rate
    ///
    /// # Returns
    /// The quote or an error if the fetch fails. Implementations must not
    /// retry; the widget reports the failure and the user decides.
    async fn fetch_rate(&self) -> Result<RateQuote, ProviderError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::types::ExchangeRate;
    use rust_decimal::Decimal;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    /// Mock provider for testing
    ///
    /// A held provider parks every fetch until `release` is called, which
    /// keeps a request in flight for as long as a test needs.
    pub struct MockProvider {
        outcome: Arc<Mutex<Result<Decimal, String>>>,
        call_count: Arc<Mutex<usize>>,
        gate: Arc<Mutex<Option<Arc<Notify>>>>,
    }

    impl Default for MockProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self {
                outcome: Arc::new(Mutex::new(Err("no rate configured".to_string()))),
                call_count: Arc::new(Mutex::new(0)),
                gate: Arc::new(Mutex::new(None)),
            }
        }

        pub fn with_rate(usd_per_btc: u64) -> Self {
            let provider = Self::new();
            provider.set_rate(Decimal::from(usd_per_btc));
            provider
        }

        pub fn set_rate(&self, usd_per_btc: Decimal) {
            *self.outcome.lock().unwrap() = Ok(usd_per_btc);
        }

        pub fn set_error(&self, message: &str) {
            *self.outcome.lock().unwrap() = Err(message.to_string());
        }

        /// Parks subsequent fetches until `release`
        pub fn hold(&self) {
            *self.gate.lock().unwrap() = Some(Arc::new(Notify::new()));
        }

        /// Lets every parked fetch complete
        pub fn release(&self) {
            if let Some(gate) = self.gate.lock().unwrap().take() {
                gate.notify_waiters();
                gate.notify_one();
            }
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl RateProvider for MockProvider {
        async fn fetch_rate(&self) -> Result<RateQuote, ProviderError> {
            *self.call_count.lock().unwrap() += 1;

            let gate = self.gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }

            let outcome = self.outcome.lock().unwrap().clone();
            match outcome {
                Ok(value) => {
                    let rate = ExchangeRate::new(value).ok_or_else(|| {
                        ProviderError::InvalidResponse(format!("non-positive rate {}", value))
                    })?;
                    Ok(RateQuote::new(rate, self.provider_name()))
                }
                Err(message) => Err(ProviderError::ApiError(message)),
            }
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
