// analysis/mod.rs
// Technical indicators over candle closes

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod support;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub use ema::{ema_series, latest_ema};
pub use macd::{latest_macd, MacdReading};
pub use rsi::latest_rsi;
pub use support::{swing_lows, SWING_WINDOW};

/// Upper bound for every configured period.
pub const MAX_PERIOD: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub ema_periods: Vec<usize>,
    pub ema_short_period: usize,
    pub ema_long_period: usize,
    pub ema_signal_period: usize,
    pub rsi_period: usize,
    pub min_data_points: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            ema_periods: vec![7, 25, 99],
            ema_short_period: 12,
            ema_long_period: 26,
            ema_signal_period: 9,
            rsi_period: 14,
            min_data_points: 30,
        }
    }
}

impl AnalysisParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.rsi_period == 0 {
            return Err("rsi_period must be positive".to_string());
        }
        if self.ema_periods.iter().any(|p| *p == 0) {
            return Err("ema_periods must all be positive".to_string());
        }
        if self.ema_short_period == 0 || self.ema_short_period >= self.ema_long_period {
            return Err("ema_short_period must be positive and less than ema_long_period".to_string());
        }
        if self.ema_signal_period == 0 {
            return Err("ema_signal_period must be positive".to_string());
        }
        let longest = self
            .ema_periods
            .iter()
            .chain([&self.ema_long_period, &self.ema_signal_period, &self.rsi_period])
            .max()
            .copied()
            .unwrap_or_default();
        if longest > MAX_PERIOD {
            return Err(format!("periods must not exceed {}, got {}", MAX_PERIOD, longest));
        }
        Ok(())
    }
}

/// Indicator readings for one symbol at the latest close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorSnapshot {
    pub price: Decimal,
    pub rsi: Option<Decimal>,
    /// EMA per period; periods with too little history are absent.
    pub emas: BTreeMap<usize, Decimal>,
    pub macd: Option<MacdReading>,
    /// Recent swing lows, ascending.
    pub support_levels: Vec<Decimal>,
}

/// Compute every configured indicator from candle closes and lows;
/// `None` below `min_data_points` closes.
pub fn analyze(closes: &[Decimal], lows: &[Decimal], params: &AnalysisParams) -> Option<IndicatorSnapshot> {
    if closes.is_empty() || closes.len() < params.min_data_points {
        debug!(
            "Not enough closes for analysis: have {}, need {}",
            closes.len(),
            params.min_data_points
        );
        return None;
    }

    let emas = params
        .ema_periods
        .iter()
        .filter_map(|period| latest_ema(closes, *period).map(|value| (*period, value)))
        .collect();

    Some(IndicatorSnapshot {
        price: *closes.last()?,
        rsi: latest_rsi(closes, params.rsi_period),
        emas,
        macd: latest_macd(
            closes,
            params.ema_short_period,
            params.ema_long_period,
            params.ema_signal_period,
        ),
        support_levels: swing_lows(lows, SWING_WINDOW),
    })
}
