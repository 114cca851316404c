//! Terminal host for the Bitcoin price widget
//!
//! Acts as the root container: renders the widget centered on the screen and
//! forwards stdin lines to it.

use btc_price_widget::{
    notifications::limit_message, providers::CoinGeckoProvider, view::render_widget,
    ConverterWidget, RootLayout, WidgetView,
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

const SCREEN_WIDTH: usize = 80;
const SCREEN_HEIGHT: usize = 22;

/// How often the screen is checked for changes (toasts expiring, fetches landing)
const REDRAW_INTERVAL: Duration = Duration::from_secs(1);

fn draw(layout: &RootLayout, view: &WidgetView) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    // clear screen, cursor home
    write!(stdout, "\x1b[2J\x1b[H")?;
    write!(stdout, "{}", layout.render(&render_widget(view)))?;
    writeln!(
        stdout,
        "\n<amount> edit USD field | r refresh | d dismiss toasts | q quit"
    )?;
    writeln!(stdout, "{}", limit_message())?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    tracing::info!("Starting BTC converter...");

    let provider = Arc::new(CoinGeckoProvider::new()?);
    let widget = Arc::new(ConverterWidget::new(provider));
    let layout = RootLayout::new(SCREEN_WIDTH, SCREEN_HEIGHT);

    // Initial fetch runs in the background; the busy indicator shows meanwhile
    let _initial_fetch = widget.mount();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(REDRAW_INTERVAL);
    let mut shown: Option<WidgetView> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "q" | "quit" => break,
                    "r" | "refresh" => {
                        let widget = widget.clone();
                        tokio::spawn(async move {
                            let outcome = widget.refresh().await;
                            tracing::debug!(?outcome, "Refresh finished");
                        });
                        // let the fetch claim the busy state before redrawing
                        tokio::task::yield_now().await;
                    }
                    "d" | "dismiss" => {
                        widget.dismiss_all_toasts();
                    }
                    text => {
                        widget.input(text);
                    }
                }
                shown = None;
            }
            _ = tick.tick() => {}
        }

        let view = widget.snapshot();
        if shown.as_ref() != Some(&view) {
            draw(&layout, &view)?;
            shown = Some(view);
        }
    }

    widget.unmount();
    tracing::info!("BTC converter closed");
    Ok(())
}
