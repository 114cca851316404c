//! Text rendering of the widget and the root container that centers it

use crate::{
    notifications::Toast,
    types::{FetchState, InputState},
};

/// Heading of the widget
pub const TITLE: &str = "Bitcoin Price Converter";

/// Placeholder of the empty USD field
pub const INPUT_PLACEHOLDER: &str = "Enter USD amount";

/// Label of the refresh affordance
pub const REFRESH_LABEL: &str = "Refresh Price";

/// Read-only snapshot of a `ConverterWidget`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    /// Busy indicator replaces the content while true
    pub loading: bool,
    pub fetch_state: FetchState,
    pub input_state: InputState,
    /// Current rate, empty until the first successful fetch
    pub price: String,
    /// Time of the last successful fetch, empty until then
    pub last_updated: String,
    /// USD field text with grouping separators
    pub usd_input: String,
    /// Field value is above the ceiling
    pub input_invalid: bool,
    /// BTC equivalent, or the placeholder
    pub btc_equivalent: String,
    pub toasts: Vec<Toast>,
}

/// Renders the widget as lines of text
pub fn render_widget(view: &WidgetView) -> Vec<String> {
    let mut lines = vec![TITLE.to_string(), String::new()];

    if view.loading {
        lines.push("Loading...".to_string());
    } else {
        lines.push(format!("Current Price: ${}", view.price));
        lines.push(format!("Last Updated: {}", view.last_updated));
        lines.push(String::new());

        let field = if view.usd_input.is_empty() {
            format!("[ {} ]", INPUT_PLACEHOLDER)
        } else {
            format!("[ ${} ]", view.usd_input)
        };
        if view.input_invalid {
            lines.push(format!("{} (invalid)", field));
        } else {
            lines.push(field);
        }

        lines.push(String::new());
        lines.push(format!("BTC Equivalent: {}", view.btc_equivalent));
        lines.push(String::new());
        lines.push(format!("< {} >", REFRESH_LABEL));
    }

    for toast in &view.toasts {
        lines.push(String::new());
        lines.push(render_toast(toast));
    }

    lines
}

fn render_toast(toast: &Toast) -> String {
    let close = if toast.closable { " [x]" } else { "" };
    format!(
        "({}) {} {}{}",
        toast.severity.label(),
        toast.title,
        toast.description,
        close
    )
}

/// Root container: frames the widget and centers it on a fixed-size screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootLayout {
    pub width: usize,
    pub height: usize,
}

impl RootLayout {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Frames `lines` in a box and centers it
    ///
    /// Content wider or taller than the screen is not clipped; the box is
    /// then placed at the top-left edge.
    pub fn render(&self, lines: &[String]) -> String {
        let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let box_width = inner + 4;
        let box_height = lines.len() + 2;

        let left = " ".repeat(self.width.saturating_sub(box_width) / 2);
        let top = self.height.saturating_sub(box_height) / 2;

        let mut out = String::new();
        for _ in 0..top {
            out.push('\n');
        }

        let border = format!("{}+{}+\n", left, "-".repeat(inner + 2));
        out.push_str(&border);
        for line in lines {
            let len = line.chars().count();
            let pad_left = (inner - len) / 2;
            let pad_right = inner - len - pad_left;
            out.push_str(&format!(
                "{}| {}{}{} |\n",
                left,
                " ".repeat(pad_left),
                line,
                " ".repeat(pad_right)
            ));
        }
        out.push_str(&border);
        out
    }
}
