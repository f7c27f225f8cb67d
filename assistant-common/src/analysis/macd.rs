// analysis/macd.rs

use rust_decimal::Decimal;
use serde::Serialize;

use super::ema::ema_series;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacdReading {
    pub macd: Decimal,
    pub signal: Option<Decimal>,
    pub histogram: Option<Decimal>,
}

/// MACD line `EMA(fast) - EMA(slow)` and its `signal`-span EMA.
///
/// The line needs `slow` closes, the signal line `slow + signal` closes.
pub fn latest_macd(closes: &[Decimal], fast: usize, slow: usize, signal: usize) -> Option<MacdReading> {
    if fast == 0 || slow == 0 || closes.len() < slow {
        return None;
    }

    let fast_line = ema_series(closes, fast)?;
    let slow_line = ema_series(closes, slow)?;
    let macd_line = fast_line
        .iter()
        .zip(slow_line.iter())
        .map(|(f, s)| f.checked_sub(*s))
        .collect::<Option<Vec<Decimal>>>()?;
    let macd = *macd_line.last()?;

    let signal_value = match slow.checked_add(signal) {
        Some(needed) if signal > 0 && closes.len() >= needed => {
            ema_series(&macd_line, signal).and_then(|line| line.last().copied())
        }
        _ => None,
    };

    Some(MacdReading {
        macd,
        signal: signal_value,
        histogram: signal_value.and_then(|s| macd.checked_sub(s)),
    })
}
