//! Transient, dismissible notifications ("toasts")

use crate::{
    constants::{ERROR_TOAST_MS, MAX_USD_AMOUNT, WARNING_TOAST_MS},
    error::WidgetError,
    format::format_grouped,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Something failed
    Error,
    /// The user's action was refused
    Warning,
}

impl Severity {
    /// Short label for text rendering
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// A notification shown for a fixed duration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: Uuid,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub duration: Duration,
    pub closable: bool,
    pub raised_at: Instant,
}

impl Toast {
    /// Creates a closable toast raised now
    pub fn new(
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            title: title.into(),
            description: description.into(),
            duration,
            closable: true,
            raised_at: Instant::now(),
        }
    }

    /// Builds the toast reported for a widget error
    ///
    /// `InvalidInput` has no toast: the edit is reverted silently.
    pub fn from_error(error: &WidgetError) -> Option<Self> {
        Self::from_error_with_durations(
            error,
            Duration::from_millis(ERROR_TOAST_MS),
            Duration::from_millis(WARNING_TOAST_MS),
        )
    }

    /// Same as `from_error` with explicit durations
    pub fn from_error_with_durations(
        error: &WidgetError,
        error_duration: Duration,
        warning_duration: Duration,
    ) -> Option<Self> {
        let toast = match error {
            WidgetError::FetchFailure(_) => Self::new(
                Severity::Error,
                "Error fetching data.",
                "Please try again later.",
                error_duration,
            ),
            WidgetError::InputLimitExceeded { limit, .. } => Self::new(
                Severity::Warning,
                "Input Limit Exceeded.",
                format!("The maximum allowed input is ${}.", format_grouped(*limit)),
                warning_duration,
            ),
            WidgetError::InvalidInput(_) => return None,
        };
        Some(toast)
    }

    /// Returns true once the toast has been visible for its full duration
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= self.duration
    }
}

/// Active toasts, oldest first
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a toast and returns its id
    pub fn push(&mut self, toast: Toast) -> Uuid {
        let id = toast.id;
        tracing::debug!(
            id = %id,
            severity = toast.severity.label(),
            title = %toast.title,
            "Raised toast"
        );
        self.toasts.push(toast);
        id
    }

    /// Closes a toast early. Returns false if it is gone or not closable.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| !(t.id == id && t.closable));
        self.toasts.len() != before
    }

    /// Closes every closable toast
    pub fn dismiss_all(&mut self) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|t| !t.closable);
        before - self.toasts.len()
    }

    /// Drops toasts whose duration has elapsed
    pub fn prune_expired(&mut self, now: Instant) {
        self.toasts.retain(|t| !t.is_expired(now));
    }

    pub fn active(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

/// Default ceiling message, used in docs and the host's help text
pub fn limit_message() -> String {
    format!(
        "The maximum allowed input is ${}.",
        format_grouped(Decimal::from(MAX_USD_AMOUNT))
    )
}
