//! The converter widget
//!
//! `ConverterWidget` owns every piece of widget state: the current rate and
//! its timestamp, the USD field, the derived BTC amount and the active toasts.
//! Front ends drive it through `mount`, `refresh`, `input` and `unmount` and
//! read it back through `snapshot`.
//!
//! ```text
//! mount() / refresh()          input(raw)
//!        ↓                         ↓
//!   RateProvider             format::normalize
//!        ↓                         ↓
//!   rate + timestamp          field + amount
//!        └──────────┬──────────────┘
//!                   ↓
//!        Debouncer (quiet interval)
//!                   ↓
//!          convert::usd_to_btc
//! ```
//!
//! State is kept behind a `std::sync::Mutex` that is never held across an
//! `.await`, so each operation applies atomically.

use crate::{
    config::WidgetConfig,
    constants::PLACEHOLDER,
    convert::{format_btc, usd_to_btc},
    debounce::Debouncer,
    error::WidgetError,
    format::{normalize, parse_amount},
    notifications::{Toast, ToastQueue},
    provider::RateProvider,
    types::{
        format_timestamp, ExchangeRate, FetchState, InputOutcome, InputState, RefreshOutcome,
    },
    view::WidgetView,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Mutable state of one widget instance
#[derive(Debug)]
struct WidgetState {
    fetch_state: FetchState,
    rate: Option<ExchangeRate>,
    refreshed_at: Option<DateTime<Utc>>,
    input_state: InputState,
    usd_text: String,
    usd_amount: Option<Decimal>,
    btc_amount: Option<Decimal>,
    toasts: ToastQueue,
    mounted: bool,
    torn_down: bool,
    /// Bumped on every scheduled conversion; only the latest may apply
    conversion_generation: u64,
    conversions: u64,
}

impl WidgetState {
    fn new() -> Self {
        Self {
            fetch_state: FetchState::Idle,
            rate: None,
            refreshed_at: None,
            input_state: InputState::Empty,
            usd_text: String::new(),
            usd_amount: None,
            btc_amount: None,
            toasts: ToastQueue::new(),
            mounted: false,
            torn_down: false,
            conversion_generation: 0,
            conversions: 0,
        }
    }
}

struct Shared {
    state: Mutex<WidgetState>,
    provider: Arc<dyn RateProvider>,
    config: WidgetConfig,
    debouncer: Debouncer,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks a fetch as outstanding. Returns false if one already is.
    fn claim_fetch(&self) -> bool {
        let mut state = self.lock();
        if state.torn_down || state.fetch_state == FetchState::Loading {
            return false;
        }
        state.fetch_state = FetchState::Loading;
        true
    }

    /// Leaves `Loading` without touching the rate
    fn release_fetch(&self) {
        let mut state = self.lock();
        if state.fetch_state == FetchState::Loading {
            state.fetch_state = if state.rate.is_some() {
                FetchState::Ready
            } else {
                FetchState::Idle
            };
        }
    }

    async fn run_fetch(self: Arc<Self>) -> RefreshOutcome {
        let started = Instant::now();
        let result = self.provider.fetch_rate().await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let mut state = self.lock();
        state.fetch_state = if state.rate.is_some() {
            FetchState::Ready
        } else {
            FetchState::Idle
        };

        if state.torn_down {
            tracing::debug!(latency_ms, "Discarding rate fetched after unmount");
            return RefreshOutcome::Discarded;
        }

        match result {
            Ok(quote) => {
                tracing::info!(
                    rate = %quote.rate,
                    provider = %quote.source,
                    latency_ms,
                    "Updated BTC price"
                );
                state.rate = Some(quote.rate);
                state.refreshed_at = Some(quote.fetched_at);
                state.fetch_state = FetchState::Ready;
                drop(state);

                self.schedule_conversion();
                RefreshOutcome::Updated
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.provider_name(),
                    latency_ms,
                    error = %e,
                    "Failed to fetch BTC price"
                );
                let error = WidgetError::FetchFailure(e);
                if let Some(toast) = self.toast_for(&error) {
                    state.toasts.push(toast);
                }
                RefreshOutcome::Failed
            }
        }
    }

    fn toast_for(&self, error: &WidgetError) -> Option<Toast> {
        Toast::from_error_with_durations(
            error,
            self.config.error_toast_duration,
            self.config.warning_toast_duration,
        )
    }

    /// Restarts the quiet interval for the BTC equivalent
    fn schedule_conversion(self: &Arc<Self>) {
        let generation = {
            let mut state = self.lock();
            if state.torn_down {
                return;
            }
            state.conversion_generation += 1;
            state.conversion_generation
        };

        let weak: Weak<Self> = Arc::downgrade(self);
        self.debouncer.schedule(async move {
            if let Some(shared) = weak.upgrade() {
                shared.convert_if_current(generation);
            }
        });
    }

    fn convert_if_current(&self, generation: u64) {
        let mut state = self.lock();
        if state.torn_down || state.conversion_generation != generation {
            return;
        }

        match (state.usd_amount, state.rate) {
            (Some(amount), Some(rate)) => match usd_to_btc(amount, &rate) {
                Some(btc) => {
                    tracing::debug!(
                        usd = %amount,
                        rate = %rate,
                        btc = %btc,
                        "Converted USD to BTC"
                    );
                    state.btc_amount = Some(btc);
                    state.conversions += 1;
                }
                None => {
                    tracing::warn!(usd = %amount, rate = %rate, "BTC equivalent out of range");
                    state.btc_amount = None;
                }
            },
            _ => state.btc_amount = None,
        }

        if state.input_state == InputState::Editing {
            state.input_state = if state.usd_amount.is_some() {
                InputState::Valid
            } else {
                InputState::Empty
            };
        }
    }
}

/// Bitcoin price converter widget
///
/// # Example
/// ```no_run
/// use btc_price_widget::{providers::CoinGeckoProvider, ConverterWidget};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let widget = ConverterWidget::new(Arc::new(CoinGeckoProvider::new()?));
/// widget.mount().await?;
/// widget.input("10,000");
/// tokio::time::sleep(std::time::Duration::from_millis(600)).await;
/// println!("BTC Equivalent: {}", widget.snapshot().btc_equivalent);
/// # Ok(())
/// # }
/// ```
pub struct ConverterWidget {
    shared: Arc<Shared>,
}

impl ConverterWidget {
    /// Creates a widget with the default configuration
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        Self::with_config(provider, WidgetConfig::default())
    }

    pub fn with_config(provider: Arc<dyn RateProvider>, config: WidgetConfig) -> Self {
        let debouncer = Debouncer::new(config.debounce);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(WidgetState::new()),
                provider,
                config,
                debouncer,
            }),
        }
    }

    /// First display: starts the initial rate fetch
    ///
    /// The fetch runs in the background; the returned handle only matters to
    /// callers that want to wait for it. Mounting twice does not fetch twice.
    pub fn mount(&self) -> JoinHandle<RefreshOutcome> {
        let first_mount = {
            let mut state = self.shared.lock();
            let first = !state.mounted && !state.torn_down;
            state.mounted = true;
            first
        };

        if !first_mount || !self.shared.claim_fetch() {
            return tokio::spawn(async { RefreshOutcome::AlreadyInFlight });
        }

        tracing::info!(provider = self.shared.provider.provider_name(), "Mounted BTC converter");
        tokio::spawn(self.shared.clone().run_fetch())
    }

    /// "Refresh Price": fetches the rate again
    ///
    /// A refresh while another fetch is outstanding sends nothing and returns
    /// `AlreadyInFlight`; the widget stays busy until that fetch resolves.
    ///
    /// The fetch runs on its own task, so dropping this future does not leave
    /// the widget busy.
    pub async fn refresh(&self) -> RefreshOutcome {
        if !self.shared.claim_fetch() {
            tracing::debug!("Refresh ignored, fetch already in flight");
            return RefreshOutcome::AlreadyInFlight;
        }

        match tokio::spawn(self.shared.clone().run_fetch()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "Refresh task did not complete");
                self.shared.release_fetch();
                RefreshOutcome::Failed
            }
        }
    }

    /// Applies an edit of the USD field
    ///
    /// Accepted edits are regrouped and restart the quiet interval. Edits
    /// above the ceiling raise a warning toast; those and non-numeric edits
    /// keep the previous field value.
    pub fn input(&self, raw: &str) -> InputOutcome {
        let mut state = self.shared.lock();
        if state.torn_down {
            return InputOutcome::Rejected(state.usd_text.clone());
        }

        match normalize(raw, self.shared.config.max_usd_amount) {
            Ok(normalized) => {
                state.input_state = if normalized.amount.is_some() {
                    InputState::Editing
                } else {
                    InputState::Empty
                };
                state.usd_text = normalized.text.clone();
                state.usd_amount = normalized.amount;
                drop(state);

                self.shared.schedule_conversion();
                InputOutcome::Accepted(normalized.text)
            }
            Err(error) => {
                tracing::warn!(input = raw, error = %error, "Rejected USD amount");
                if let Some(toast) = self.shared.toast_for(&error) {
                    state.toasts.push(toast);
                }
                state.input_state = InputState::Rejected;
                InputOutcome::Rejected(state.usd_text.clone())
            }
        }
    }

    /// Teardown: cancels the pending conversion
    ///
    /// A fetch still in flight completes but its result is discarded.
    pub fn unmount(&self) {
        {
            let mut state = self.shared.lock();
            if state.torn_down {
                return;
            }
            state.torn_down = true;
        }
        let cancelled = self.shared.debouncer.cancel();
        tracing::info!(cancelled_conversion = cancelled, "Unmounted BTC converter");
    }

    /// Closes a toast early
    pub fn dismiss_toast(&self, id: Uuid) -> bool {
        self.shared.lock().toasts.dismiss(id)
    }

    /// Closes every closable toast
    pub fn dismiss_all_toasts(&self) -> usize {
        self.shared.lock().toasts.dismiss_all()
    }

    /// Read-only view of the widget, with expired toasts pruned
    pub fn snapshot(&self) -> WidgetView {
        let mut state = self.shared.lock();
        state.toasts.prune_expired(tokio::time::Instant::now());

        let input_invalid = parse_amount(&state.usd_text)
            .ok()
            .flatten()
            .is_some_and(|value| value > self.shared.config.max_usd_amount);

        WidgetView {
            loading: state.fetch_state == FetchState::Loading,
            fetch_state: state.fetch_state,
            input_state: state.input_state,
            price: state.rate.map(|r| r.to_string()).unwrap_or_default(),
            last_updated: state
                .refreshed_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
            usd_input: state.usd_text.clone(),
            input_invalid,
            btc_equivalent: state
                .btc_amount
                .map(format_btc)
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            toasts: state.toasts.active().to_vec(),
        }
    }

    /// The current rate, if one was ever fetched
    pub fn rate(&self) -> Option<ExchangeRate> {
        self.shared.lock().rate
    }

    /// Time of the last successful fetch
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.shared.lock().refreshed_at
    }

    /// The derived BTC amount, `None` while unknown
    pub fn btc_amount(&self) -> Option<Decimal> {
        self.shared.lock().btc_amount
    }

    pub fn fetch_state(&self) -> FetchState {
        self.shared.lock().fetch_state
    }

    pub fn input_state(&self) -> InputState {
        self.shared.lock().input_state
    }

    pub fn is_loading(&self) -> bool {
        self.fetch_state() == FetchState::Loading
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.shared.config
    }

    /// Returns the name of the current provider
    pub fn provider_name(&self) -> &'static str {
        self.shared.provider.provider_name()
    }

    #[cfg(test)]
    fn conversion_count(&self) -> u64 {
        self.shared.lock().conversions
    }
}

impl Drop for ConverterWidget {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{notifications::Severity, provider::mock::MockProvider};
    use std::str::FromStr;
    use std::time::Duration;
    use tokio::time::sleep;

    const QUIET: Duration = Duration::from_millis(600);

    async fn mounted(provider: Arc<MockProvider>) -> ConverterWidget {
        let widget = ConverterWidget::new(provider);
        assert_eq!(widget.mount().await.unwrap(), RefreshOutcome::Updated);
        widget
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_fetches_once() {
        let provider = Arc::new(MockProvider::with_rate(50_000));
        let widget = mounted(provider.clone()).await;

        assert_eq!(provider.call_count(), 1);
        assert_eq!(widget.fetch_state(), FetchState::Ready);
        assert_eq!(widget.rate().unwrap().usd_per_btc(), Decimal::from(50_000));
        assert!(widget.refreshed_at().is_some());

        assert_eq!(widget.mount().await.unwrap(), RefreshOutcome::AlreadyInFlight);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_converts_after_quiet_interval() {
        let widget = mounted(Arc::new(MockProvider::with_rate(50_000))).await;

        assert_eq!(widget.input("10000"), InputOutcome::Accepted("10,000".to_string()));
        assert_eq!(widget.input_state(), InputState::Editing);
        assert_eq!(widget.snapshot().btc_equivalent, PLACEHOLDER);

        sleep(QUIET).await;
        let view = widget.snapshot();
        assert_eq!(view.usd_input, "10,000");
        assert_eq!(view.btc_equivalent, "0.20000000");
        assert_eq!(widget.input_state(), InputState::Valid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_converted_before_interval() {
        let widget = mounted(Arc::new(MockProvider::with_rate(50_000))).await;

        widget.input("10,000");
        sleep(Duration::from_millis(499)).await;
        assert!(widget.btc_amount().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_placeholder_without_rate() {
        let provider = Arc::new(MockProvider::new());
        provider.set_error("down");
        let widget = ConverterWidget::new(provider);
        assert_eq!(widget.mount().await.unwrap(), RefreshOutcome::Failed);

        widget.input("10,000");
        sleep(QUIET).await;

        assert!(widget.btc_amount().is_none());
        assert_eq!(widget.snapshot().btc_equivalent, PLACEHOLDER);
        assert_eq!(widget.fetch_state(), FetchState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_convert_once_with_final_value() {
        let widget = mounted(Arc::new(MockProvider::with_rate(50_000))).await;
        sleep(QUIET).await;
        assert_eq!(widget.conversion_count(), 0);

        for raw in ["1", "12", "125", "1,250", "12,500"] {
            widget.input(raw);
            sleep(Duration::from_millis(100)).await;
        }
        sleep(QUIET).await;

        assert_eq!(widget.conversion_count(), 1);
        assert_eq!(widget.snapshot().btc_equivalent, "0.25000000");
    }

    #[tokio::test(start_paused = true)]
    async fn test_limit_exceeded_keeps_previous_value() {
        let widget = mounted(Arc::new(MockProvider::with_rate(50_000))).await;
        widget.input("5,000");
        sleep(QUIET).await;

        let outcome = widget.input("5,000,000,000");
        assert_eq!(outcome, InputOutcome::Rejected("5,000".to_string()));
        assert_eq!(widget.input_state(), InputState::Rejected);

        let view = widget.snapshot();
        assert_eq!(view.usd_input, "5,000");
        assert!(!view.input_invalid);
        assert_eq!(view.toasts.len(), 1);
        assert_eq!(view.toasts[0].severity, Severity::Warning);
        assert_eq!(view.toasts[0].title, "Input Limit Exceeded.");

        sleep(QUIET).await;
        assert_eq!(widget.snapshot().btc_equivalent, "0.10000000");
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_numeric_edit_is_reverted_silently() {
        let widget = mounted(Arc::new(MockProvider::with_rate(50_000))).await;
        widget.input("12");

        assert_eq!(widget.input("12x"), InputOutcome::Rejected("12".to_string()));
        assert!(widget.snapshot().toasts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_field_resets_to_placeholder() {
        let widget = mounted(Arc::new(MockProvider::with_rate(50_000))).await;
        widget.input("10,000");
        sleep(QUIET).await;
        assert!(widget.btc_amount().is_some());

        assert_eq!(widget.input(""), InputOutcome::Accepted(String::new()));
        assert_eq!(widget.input_state(), InputState::Empty);
        sleep(QUIET).await;
        assert_eq!(widget.snapshot().btc_equivalent, PLACEHOLDER);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_last_good_rate() {
        let provider = Arc::new(MockProvider::with_rate(50_000));
        let widget = mounted(provider.clone()).await;
        let rate = widget.rate();
        let refreshed_at = widget.refreshed_at();

        provider.set_error("HTTP 500");
        assert_eq!(widget.refresh().await, RefreshOutcome::Failed);

        assert_eq!(widget.rate(), rate);
        assert_eq!(widget.refreshed_at(), refreshed_at);
        assert_eq!(widget.fetch_state(), FetchState::Ready);

        let view = widget.snapshot();
        assert_eq!(view.toasts.len(), 1);
        assert_eq!(view.toasts[0].severity, Severity::Error);
        assert_eq!(view.toasts[0].title, "Error fetching data.");
        assert_eq!(view.price, "50000");
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_toast_expires() {
        let provider = Arc::new(MockProvider::new());
        provider.set_error("down");
        let widget = ConverterWidget::new(provider);
        widget.mount().await.unwrap();
        assert_eq!(widget.snapshot().toasts.len(), 1);

        sleep(Duration::from_secs(5)).await;
        assert!(widget.snapshot().toasts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_toast() {
        let provider = Arc::new(MockProvider::new());
        provider.set_error("down");
        let widget = ConverterWidget::new(provider);
        widget.mount().await.unwrap();

        let id = widget.snapshot().toasts[0].id;
        assert!(widget.dismiss_toast(id));
        assert!(widget.snapshot().toasts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_while_in_flight() {
        let provider = Arc::new(MockProvider::with_rate(50_000));
        provider.hold();
        let widget = ConverterWidget::new(provider.clone());

        let first = widget.mount();
        assert!(widget.is_loading());
        assert!(widget.snapshot().loading);

        assert_eq!(widget.refresh().await, RefreshOutcome::AlreadyInFlight);
        assert!(widget.is_loading());

        provider.release();
        assert_eq!(first.await.unwrap(), RefreshOutcome::Updated);
        assert!(!widget.is_loading());
        assert_eq!(provider.call_count(), 1);
        assert!(widget.snapshot().toasts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_updates_rate_and_reconverts() {
        let provider = Arc::new(MockProvider::with_rate(50_000));
        let widget = mounted(provider.clone()).await;
        widget.input("10,000");
        sleep(QUIET).await;
        assert_eq!(widget.snapshot().btc_equivalent, "0.20000000");

        provider.set_rate(Decimal::from_str("40000").unwrap());
        assert_eq!(widget.refresh().await, RefreshOutcome::Updated);
        // last value persists until the quiet interval elapses
        assert_eq!(widget.snapshot().btc_equivalent, "0.20000000");

        sleep(QUIET).await;
        assert_eq!(widget.snapshot().btc_equivalent, "0.25000000");
        assert_eq!(widget.snapshot().price, "40000");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_cancels_pending_conversion() {
        let widget = mounted(Arc::new(MockProvider::with_rate(50_000))).await;
        widget.input("10,000");
        widget.unmount();

        sleep(QUIET).await;
        assert!(widget.btc_amount().is_none());
        assert_eq!(widget.conversion_count(), 0);
        assert_eq!(widget.input("20,000"), InputOutcome::Rejected("10,000".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_fetch_after_unmount_is_discarded() {
        let provider = Arc::new(MockProvider::with_rate(50_000));
        provider.hold();
        let widget = ConverterWidget::new(provider.clone());
        let pending = widget.mount();

        widget.unmount();
        provider.release();

        assert_eq!(pending.await.unwrap(), RefreshOutcome::Discarded);
        assert!(widget.rate().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_refresh_does_not_stay_busy() {
        let provider = Arc::new(MockProvider::with_rate(50_000));
        let widget = mounted(provider.clone()).await;

        provider.hold();
        provider.set_rate(Decimal::from(40_000));
        let abandoned = tokio::time::timeout(Duration::from_millis(10), widget.refresh()).await;
        assert!(abandoned.is_err());
        assert!(widget.is_loading());

        provider.release();
        sleep(Duration::from_secs(60)).await;
        assert!(!widget.is_loading());
        assert_eq!(widget.rate().unwrap().usd_per_btc(), Decimal::from(40_000));

        assert_eq!(widget.refresh().await, RefreshOutcome::Updated);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tiny_rate_falls_back_to_placeholder() {
        let provider = Arc::new(MockProvider::new());
        provider.set_rate(Decimal::from_scientific("1e-25").unwrap());
        let widget = mounted(provider).await;

        widget.input("100,000,000");
        sleep(QUIET).await;

        assert!(widget.btc_amount().is_none());
        assert_eq!(widget.snapshot().btc_equivalent, PLACEHOLDER);
        assert_eq!(widget.conversion_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_ceiling() {
        let config = WidgetConfig::default().with_max_usd_amount(Decimal::from(1_000));
        let provider = Arc::new(MockProvider::with_rate(50_000));
        let widget = ConverterWidget::with_config(provider, config);

        assert!(matches!(widget.input("999"), InputOutcome::Accepted(_)));
        assert!(matches!(widget.input("1,001"), InputOutcome::Rejected(_)));
        assert!(!widget.snapshot().input_invalid);
    }
}
