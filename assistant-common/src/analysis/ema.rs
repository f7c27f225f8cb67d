// analysis/ema.rs

use rust_decimal::Decimal;

/// Smoothing factor for a span-`n` EMA: `2 / (n + 1)`.
pub fn span_alpha(span: usize) -> Option<Decimal> {
    let denominator = Decimal::from(span.checked_add(1)?);
    Decimal::TWO.checked_div(denominator)
}

/// Recursive exponential smoothing seeded with the first value:
/// `y[0] = x[0]`, `y[t] = y[t-1] + alpha * (x[t] - y[t-1])`.
///
/// `None` if any step overflows.
pub fn smooth(values: &[Decimal], alpha: Decimal) -> Option<Vec<Decimal>> {
    let mut out = Vec::with_capacity(values.len());
    let mut iter = values.iter();
    let Some(first) = iter.next() else {
        return Some(out);
    };

    let mut prev = *first;
    out.push(prev);
    for value in iter {
        let step = value.checked_sub(prev)?.checked_mul(alpha)?;
        prev = prev.checked_add(step)?;
        out.push(prev);
    }
    Some(out)
}

/// Full EMA series for a span.
pub fn ema_series(values: &[Decimal], span: usize) -> Option<Vec<Decimal>> {
    smooth(values, span_alpha(span)?)
}

/// Latest EMA value, `None` until at least `period` values are available.
pub fn latest_ema(values: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || values.len() < period {
        return None;
    }
    ema_series(values, period)?.last().copied()
}
