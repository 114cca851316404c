//! Constants for the Bitcoin price widget
//!
//! All defaults for the widget are centralized here. No runtime configuration
//! file is used - `WidgetConfig::default()` is built from these compile-time
//! constants.

/// HTTP request timeout when fetching the rate (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko API endpoint for simple price queries
pub const COINGECKO_SIMPLE_PRICE_ENDPOINT: &str = "/simple/price";

/// CoinGecko ID of the quoted asset
pub const COINGECKO_BITCOIN_ID: &str = "bitcoin";

/// Quote currency requested from CoinGecko
pub const COINGECKO_VS_CURRENCY: &str = "usd";

/// User agent for HTTP requests
pub const USER_AGENT: &str = "btc-price-widget/0.1.0";

/// Quiet interval before the BTC equivalent is recomputed (in milliseconds)
pub const DEBOUNCE_MS: u64 = 500;

/// Largest USD amount the input field accepts
pub const MAX_USD_AMOUNT: u64 = 100_000_000;

/// Fractional digits of the BTC equivalent
pub const BTC_DECIMALS: u32 = 8;

/// How long a fetch error toast stays visible (in milliseconds)
pub const ERROR_TOAST_MS: u64 = 5_000;

/// How long an input warning toast stays visible (in milliseconds)
pub const WARNING_TOAST_MS: u64 = 3_000;

/// Text shown while a value is unknown
pub const PLACEHOLDER: &str = "--";

/// Grouping separator inserted into the USD field
pub const GROUPING_SEPARATOR: char = ',';
