//! USD to BTC conversion

use crate::{constants::BTC_DECIMALS, types::ExchangeRate};
use rust_decimal::{Decimal, RoundingStrategy};

/// Converts a USD amount to BTC at the given rate, rounded to 8 digits
///
/// Returns `None` when the quotient does not fit in a `Decimal`.
pub fn usd_to_btc(amount_usd: Decimal, rate: &ExchangeRate) -> Option<Decimal> {
    amount_usd
        .checked_div(rate.usd_per_btc())
        .map(|btc| {
            btc.round_dp_with_strategy(BTC_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
        })
}

/// Renders a BTC amount with exactly 8 fractional digits
pub fn format_btc(value: Decimal) -> String {
    let mut value =
        value.round_dp_with_strategy(BTC_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(BTC_DECIMALS);
    value.to_string()
}
