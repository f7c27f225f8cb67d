// analysis/rsi.rs
// Relative Strength Index with Wilder smoothing

use rust_decimal::Decimal;

use super::ema::smooth;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Latest RSI over `period`, `None` until `period + 1` closes are available.
///
/// Gains and losses are smoothed with `alpha = 1 / period` starting from a zero
/// first change. A series without losses reads 100, a flat series reads 50.
/// Overflowing inputs also read `None`.
pub fn latest_rsi(closes: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    gains.push(Decimal::ZERO);
    losses.push(Decimal::ZERO);
    for pair in closes.windows(2) {
        let change = pair[1].checked_sub(pair[0])?;
        if change > Decimal::ZERO {
            gains.push(change);
            losses.push(Decimal::ZERO);
        } else {
            gains.push(Decimal::ZERO);
            losses.push(-change);
        }
    }

    let alpha = Decimal::ONE.checked_div(Decimal::from(period))?;
    let avg_gain = *smooth(&gains, alpha)?.last()?;
    let avg_loss = *smooth(&losses, alpha)?.last()?;

    if avg_loss.is_zero() {
        return Some(if avg_gain.is_zero() {
            Decimal::from(50)
        } else {
            HUNDRED
        });
    }

    let rs = avg_gain.checked_div(avg_loss)?;
    let scaled = HUNDRED.checked_div(Decimal::ONE.checked_add(rs)?)?;
    HUNDRED.checked_sub(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rsi_small_series() {
        // gains 0,1,0 / losses 0,0,1 with alpha 0.5 -> 0.25 / 0.5
        let closes = [dec!(1), dec!(2), dec!(1)];
        let rsi = latest_rsi(&closes, 2).unwrap();
        assert_eq!(rsi.round_dp(4), dec!(33.3333));
    }

    #[test]
    fn test_rsi_extremes() {
        let rising: Vec<Decimal> = (1..=20).map(Decimal::from).collect();
        assert_eq!(latest_rsi(&rising, 14), Some(dec!(100)));

        let flat = vec![dec!(10); 20];
        assert_eq!(latest_rsi(&flat, 14), Some(dec!(50)));

        let falling: Vec<Decimal> = (1..=20).rev().map(Decimal::from).collect();
        assert_eq!(latest_rsi(&falling, 14), Some(Decimal::ZERO));
    }

    #[test]
    fn test_rsi_needs_one_more_close_than_period() {
        let closes: Vec<Decimal> = (1..=14).map(Decimal::from).collect();
        assert_eq!(latest_rsi(&closes, 14), None);
    }

    #[test]
    fn test_rsi_overflow_yields_none() {
        let closes = [Decimal::MIN, Decimal::MAX, Decimal::MIN];
        assert_eq!(latest_rsi(&closes, 2), None);
    }
}
