//! Widget settings
//!
//! Every field defaults to the matching constant in `constants`. The `with_*`
//! builders exist for embedders and tests; nothing is read from files or the
//! environment.

use crate::constants::{DEBOUNCE_MS, ERROR_TOAST_MS, MAX_USD_AMOUNT, WARNING_TOAST_MS};
use rust_decimal::Decimal;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Quiet interval before the BTC equivalent is recomputed
    pub debounce: Duration,
    /// Largest USD amount the field accepts
    pub max_usd_amount: Decimal,
    /// Lifetime of fetch error toasts
    pub error_toast_duration: Duration,
    /// Lifetime of input warning toasts
    pub warning_toast_duration: Duration,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEBOUNCE_MS),
            max_usd_amount: Decimal::from(MAX_USD_AMOUNT),
            error_toast_duration: Duration::from_millis(ERROR_TOAST_MS),
            warning_toast_duration: Duration::from_millis(WARNING_TOAST_MS),
        }
    }
}

impl WidgetConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_max_usd_amount(mut self, max_usd_amount: Decimal) -> Self {
        self.max_usd_amount = max_usd_amount;
        self
    }

    pub fn with_toast_durations(mut self, error: Duration, warning: Duration) -> Self {
        self.error_toast_duration = error;
        self.warning_toast_duration = warning;
        self
    }
}
