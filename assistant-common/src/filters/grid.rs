// filters/grid.rs
// Exact decimal helpers for step/tick grids

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Tolerance used only at the final "is this value on the grid" comparison.
pub const GRID_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 8);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("decimal overflow while computing {0}")]
    Overflow(&'static str),

    #[error("grid increment must be positive, got {0}")]
    NonPositiveIncrement(Decimal),
}

fn ensure_positive(increment: Decimal) -> Result<(), GridError> {
    if increment <= Decimal::ZERO {
        return Err(GridError::NonPositiveIncrement(increment));
    }
    Ok(())
}

/// Whether `value` sits on the grid `origin + k * increment`.
///
/// The remainder is exact; it is accepted when within [`GRID_TOLERANCE`] of zero
/// or of the increment itself.
pub fn is_on_grid(value: Decimal, origin: Decimal, increment: Decimal) -> Result<bool, GridError> {
    ensure_positive(increment)?;
    let offset = value
        .checked_sub(origin)
        .ok_or(GridError::Overflow("grid offset"))?;
    let remainder = offset
        .checked_rem(increment)
        .ok_or(GridError::Overflow("grid remainder"))?
        .abs();
    Ok(remainder <= GRID_TOLERANCE || (remainder - increment).abs() <= GRID_TOLERANCE)
}

/// `floor((value - origin) / increment) * increment + origin`, never below zero.
///
/// A value under `origin` clamps to 0, which is off the grid whenever `origin`
/// is not a multiple of `increment`; callers reject it through the minimum check.
pub fn floor_to_step(value: Decimal, origin: Decimal, increment: Decimal) -> Result<Decimal, GridError> {
    ensure_positive(increment)?;
    let steps = value
        .checked_sub(origin)
        .and_then(|offset| offset.checked_div(increment))
        .ok_or(GridError::Overflow("step count"))?
        .floor();
    let aligned = steps
        .checked_mul(increment)
        .and_then(|v| v.checked_add(origin))
        .ok_or(GridError::Overflow("aligned quantity"))?;
    Ok(aligned.max(Decimal::ZERO))
}

/// `round(value / increment) * increment`, ties to even.
pub fn round_to_tick(value: Decimal, increment: Decimal) -> Result<Decimal, GridError> {
    ensure_positive(increment)?;
    let ticks = value
        .checked_div(increment)
        .ok_or(GridError::Overflow("tick count"))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    ticks
        .checked_mul(increment)
        .ok_or(GridError::Overflow("aligned price"))
}

/// Significant decimal places of a step, e.g. `0.00010000` -> 4.
pub fn decimal_places(increment: Decimal) -> u32 {
    increment.normalize().scale()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_on_grid_exact_and_misaligned() {
        assert!(is_on_grid(dec!(0.5000), dec!(0.0001), dec!(0.0001)).unwrap());
        assert!(is_on_grid(dec!(2600.00), Decimal::ZERO, dec!(0.01)).unwrap());
        assert!(!is_on_grid(dec!(0.62938), Decimal::ZERO, dec!(0.0001)).unwrap());
        assert!(!is_on_grid(dec!(2680.5555), Decimal::ZERO, dec!(0.01)).unwrap());
    }

    #[test]
    fn test_on_grid_tolerates_near_misses_at_both_edges() {
        // remainder just above zero
        assert!(is_on_grid(dec!(1.000000001), Decimal::ZERO, dec!(0.1)).unwrap());
        // remainder just below the increment
        assert!(is_on_grid(dec!(0.999999999), Decimal::ZERO, dec!(0.1)).unwrap());
        assert!(!is_on_grid(dec!(1.0001), Decimal::ZERO, dec!(0.1)).unwrap());
    }

    #[test]
    fn test_floor_rounds_down() {
        assert_eq!(floor_to_step(dec!(0.62938), Decimal::ZERO, dec!(0.0001)).unwrap(), dec!(0.6293));
        assert_eq!(floor_to_step(dec!(0.62999), Decimal::ZERO, dec!(0.0001)).unwrap(), dec!(0.6299));
        assert_eq!(floor_to_step(dec!(1.25), dec!(0.05), dec!(0.1)).unwrap(), dec!(1.25));
        assert_eq!(floor_to_step(dec!(1.29), dec!(0.05), dec!(0.1)).unwrap(), dec!(1.25));
    }

    #[test]
    fn test_floor_below_origin_clamps_at_zero() {
        assert_eq!(floor_to_step(dec!(0.00005), dec!(0.0001), dec!(0.0001)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_clamped_zero_is_off_grid_when_origin_not_a_step_multiple() {
        let clamped = floor_to_step(dec!(0.0001), dec!(0.001), dec!(0.0007)).unwrap();
        assert_eq!(clamped, Decimal::ZERO);
        assert!(!is_on_grid(clamped, dec!(0.001), dec!(0.0007)).unwrap());
    }

    #[test]
    fn test_round_to_nearest_tick_ties_to_even() {
        assert_eq!(round_to_tick(dec!(2680.5555), dec!(0.01)).unwrap(), dec!(2680.56));
        assert_eq!(round_to_tick(dec!(2680.5549), dec!(0.01)).unwrap(), dec!(2680.55));
        assert_eq!(round_to_tick(dec!(0.125), dec!(0.01)).unwrap(), dec!(0.12));
        assert_eq!(round_to_tick(dec!(0.135), dec!(0.01)).unwrap(), dec!(0.14));
    }

    #[test]
    fn test_non_positive_increment_rejected() {
        assert_eq!(
            round_to_tick(dec!(1), Decimal::ZERO),
            Err(GridError::NonPositiveIncrement(Decimal::ZERO))
        );
        assert!(is_on_grid(dec!(1), Decimal::ZERO, dec!(-0.1)).is_err());
    }

    #[test]
    fn test_overflow_is_reported() {
        assert!(matches!(
            round_to_tick(Decimal::MAX, dec!(0.0000001)),
            Err(GridError::Overflow(_))
        ));
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places(dec!(0.00010000)), 4);
        assert_eq!(decimal_places(dec!(0.01)), 2);
        assert_eq!(decimal_places(dec!(1.00000000)), 0);
    }
}
