//! Types for the Bitcoin price widget

use chrono::{DateTime, Local, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price of one Bitcoin in US dollars
///
/// Always strictly positive, so dividing by it is safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct ExchangeRate(Decimal);

impl ExchangeRate {
    /// Creates a rate, rejecting zero and negative values
    pub fn new(usd_per_btc: Decimal) -> Option<Self> {
        (usd_per_btc > Decimal::ZERO).then_some(Self(usd_per_btc))
    }

    /// USD per 1 BTC
    pub fn usd_per_btc(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for ExchangeRate {
    type Error = String;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("exchange rate must be positive, got {}", value))
    }
}

impl From<ExchangeRate> for Decimal {
    fn from(rate: ExchangeRate) -> Self {
        rate.0
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// A rate as returned by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    /// The rate
    pub rate: ExchangeRate,

    /// Wall-clock time the rate was fetched
    pub fetched_at: DateTime<Utc>,

    /// Data source
    pub source: String,
}

impl RateQuote {
    /// Create a quote stamped with the current time
    pub fn new(rate: ExchangeRate, source: impl Into<String>) -> Self {
        Self {
            rate,
            fetched_at: Utc::now(),
            source: source.into(),
        }
    }

    /// The fetch time in local time, e.g. `3/14/2026, 9:05:07 PM`
    pub fn display_timestamp(&self) -> String {
        format_timestamp(&self.fetched_at)
    }
}

/// Formats a timestamp for the "Last Updated" line
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    let local: DateTime<Local> = at.with_timezone(&Local);
    local.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Lifecycle of the rate fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchState {
    /// No rate yet and nothing in flight
    Idle,
    /// A fetch is outstanding
    Loading,
    /// A rate is available
    Ready,
}

/// Lifecycle of the USD input field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputState {
    /// Field is empty
    Empty,
    /// Edit accepted, waiting for the quiet interval
    Editing,
    /// Last edit accepted and converted
    Valid,
    /// Last edit rejected; the previous value is kept
    Rejected,
}

/// Result of a refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new rate was stored
    Updated,
    /// The fetch failed and an error toast was raised
    Failed,
    /// Another fetch was already outstanding; nothing was sent
    AlreadyInFlight,
    /// The widget was unmounted before the fetch resolved
    Discarded,
}

/// Result of an edit of the USD field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// The edit was kept; holds the re-rendered field text
    Accepted(String),
    /// The edit was reverted; holds the field text that stays visible
    Rejected(String),
}
