//! # Bitcoin Price Widget
//!
//! Shows the current Bitcoin price in USD and converts a USD amount typed by
//! the user into its BTC equivalent, using off-chain quotes from CoinGecko.
//!
//! ## Usage
//!
//! The widget is headless: a front end feeds it edits and clicks and renders
//! its snapshots.
//!
//! ```no_run
//! use btc_price_widget::{providers::CoinGeckoProvider, view, ConverterWidget, RootLayout};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let widget = ConverterWidget::new(Arc::new(CoinGeckoProvider::new()?));
//!
//! // First display fetches the rate
//! widget.mount().await?;
//!
//! // Keystrokes are regrouped, conversion waits for a 500ms pause
//! widget.input("10000");
//! tokio::time::sleep(std::time::Duration::from_millis(600)).await;
//!
//! let lines = view::render_widget(&widget.snapshot());
//! print!("{}", RootLayout::new(80, 24).render(&lines));
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! The widget operates with zero runtime configuration. Defaults are
//! compile-time constants in the `constants` module:
//!
//! - Debounce interval: 500 milliseconds
//! - Maximum USD amount: 100,000,000
//! - BTC precision: 8 decimal places
//! - Toasts: 5 seconds for fetch errors, 3 seconds for input warnings
//! - Provider: CoinGecko
//!
//! ## Error Handling
//!
//! Nothing the user does or the network returns is fatal. A failed fetch
//! keeps the last rate and raises an error toast; an amount above the ceiling
//! is refused and raises a warning toast. There are no retries.
//!
//! ```no_run
//! use btc_price_widget::{ConverterWidget, InputOutcome};
//!
//! # fn example(widget: &ConverterWidget) {
//! match widget.input("250,000,000") {
//!     InputOutcome::Accepted(text) => println!("field: {}", text),
//!     InputOutcome::Rejected(kept) => println!("kept: {}", kept),
//! }
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod convert;
pub mod debounce;
pub mod error;
pub mod format;
pub mod notifications;
pub mod provider;
pub mod providers;
pub mod types;
pub mod view;
pub mod widget;

// Re-export commonly used types
pub use config::WidgetConfig;
pub use error::{ProviderError, WidgetError};
pub use notifications::{Severity, Toast};
pub use provider::RateProvider;
pub use types::{
    ExchangeRate, FetchState, InputOutcome, InputState, RateQuote, RefreshOutcome,
};
pub use view::{RootLayout, WidgetView};
pub use widget::ConverterWidget;
