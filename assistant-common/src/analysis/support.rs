// analysis/support.rs
// Swing-low support levels

use rust_decimal::Decimal;

/// Candles on each side a swing low must undercut.
pub const SWING_WINDOW: usize = 2;

/// Only the most recent candles are scanned.
pub const SWING_LOOKBACK: usize = 50;

/// Distinct swing lows among the last [`SWING_LOOKBACK`] lows, ascending.
///
/// A swing low is strictly below every low in the `window` candles before and
/// after it, so the last `window` candles can never qualify.
pub fn swing_lows(lows: &[Decimal], window: usize) -> Vec<Decimal> {
    let Some(span) = window.checked_mul(2).and_then(|w| w.checked_add(1)) else {
        return Vec::new();
    };
    if window == 0 || lows.len() < span {
        return Vec::new();
    }

    let start = window.max(lows.len().saturating_sub(SWING_LOOKBACK));
    let end = lows.len() - window;

    let mut levels: Vec<Decimal> = (start..end)
        .filter(|&i| {
            let low = lows[i];
            lows[i - window..i].iter().all(|before| low < *before)
                && lows[i + 1..=i + window].iter().all(|after| low < *after)
        })
        .map(|i| lows[i])
        .collect();
    levels.sort();
    levels.dedup();
    levels
}
