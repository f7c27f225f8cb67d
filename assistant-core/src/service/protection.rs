// service/protection.rs
// How well open SELL orders guard each held position

use assistant_common::{OrderSide, OrderType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::account::PortfolioSummary;
use crate::exchange::types::Order;

const PROXIMITY_BANDS: [(Decimal, u32); 4] = [(dec!(0.05), 50), (dec!(0.10), 40), (dec!(0.15), 25), (dec!(0.25), 10)];
const COVERAGE_BANDS: [(Decimal, u32); 4] = [(dec!(0.95), 30), (dec!(0.75), 25), (dec!(0.50), 15), (dec!(0.25), 5)];
const UNKNOWN_POSITION_COVERAGE: u32 = 20;
/// Positions under this share of the portfolio, in percent, are not scored.
const MIN_ALLOCATION_PCT: Decimal = dec!(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtectionLevel {
    None,
    Poor,
    Weak,
    Moderate,
    Good,
    Excellent,
}

impl ProtectionLevel {
    fn from_score(score: u32) -> Self {
        match score {
            90.. => ProtectionLevel::Excellent,
            70..=89 => ProtectionLevel::Good,
            50..=69 => ProtectionLevel::Moderate,
            30..=49 => ProtectionLevel::Weak,
            _ => ProtectionLevel::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtectionLevel::None => "NONE",
            ProtectionLevel::Poor => "POOR",
            ProtectionLevel::Weak => "WEAK",
            ProtectionLevel::Moderate => "MODERATE",
            ProtectionLevel::Good => "GOOD",
            ProtectionLevel::Excellent => "EXCELLENT",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            ProtectionLevel::Excellent => "MAINTAIN_CURRENT",
            ProtectionLevel::Good => "MINOR_IMPROVEMENTS",
            ProtectionLevel::Moderate => "ENHANCE_PROTECTION",
            ProtectionLevel::Weak => "SIGNIFICANT_IMPROVEMENT",
            ProtectionLevel::Poor | ProtectionLevel::None => "IMPLEMENT_PROTECTION",
        }
    }
}

impl fmt::Display for ProtectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score out of 100: proximity (50), coverage (30), distinct price levels (20).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtectionScore {
    pub symbol: String,
    pub score: u32,
    pub level: ProtectionLevel,
    pub proximity_score: u32,
    pub coverage_score: u32,
    pub diversification_score: u32,
    pub protective_orders: usize,
    /// Distance of the nearest protective price as a fraction of the current price.
    pub closest_distance: Option<Decimal>,
    pub protected_qty: Decimal,
    pub position_qty: Decimal,
}

impl ProtectionScore {
    fn unprotected(symbol: &str, position_qty: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            score: 0,
            level: ProtectionLevel::None,
            proximity_score: 0,
            coverage_score: 0,
            diversification_score: 0,
            protective_orders: 0,
            closest_distance: None,
            protected_qty: Decimal::ZERO,
            position_qty,
        }
    }

    pub fn recommendation(&self) -> &'static str {
        self.level.recommendation()
    }

    /// Share of the position covered, in percent, when the position is known.
    pub fn coverage_pct(&self) -> Option<Decimal> {
        if self.position_qty <= Decimal::ZERO {
            return None;
        }
        self.protected_qty
            .checked_div(self.position_qty)
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
            .map(|pct| pct.round_dp(1))
    }
}

impl fmt::Display for ProtectionScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.protective_orders == 0 {
            return write!(f, "No protective orders found for {}", self.symbol);
        }
        write!(
            f,
            "{} Protection Score: {}/100 ({}) | Protective orders: {}",
            self.symbol, self.score, self.level, self.protective_orders
        )?;
        if let Some(pct) = self.closest_distance.and_then(|d| d.checked_mul(Decimal::ONE_HUNDRED)) {
            write!(f, " | Closest protection: {}%", pct.round_dp(1))?;
        }
        if let Some(pct) = self.coverage_pct() {
            write!(f, " | Coverage: {}% of position", pct)?;
        }
        Ok(())
    }
}

/// The price an order acts at: the trigger for stop types, the limit otherwise.
fn reference_price(order: &Order) -> Option<Decimal> {
    let stop = order.stop_price.filter(|p| *p > Decimal::ZERO);
    let limit = order.price.filter(|p| *p > Decimal::ZERO);
    match order.order_type {
        OrderType::StopLoss | OrderType::StopLossLimit | OrderType::TakeProfit | OrderType::TakeProfitLimit => {
            stop.or(limit)
        }
        _ => limit,
    }
}

/// SELL orders that exit the position away from the current price:
/// take-profits resting above it, stop-losses triggering below it.
fn protective_price(order: &Order, current_price: Decimal) -> Option<Decimal> {
    if order.side != OrderSide::Sell || order.remaining_qty() <= Decimal::ZERO {
        return None;
    }
    let price = reference_price(order)?;
    let protective = match order.order_type {
        OrderType::Limit | OrderType::LimitMaker | OrderType::TakeProfit | OrderType::TakeProfitLimit => {
            price > current_price
        }
        OrderType::StopLoss | OrderType::StopLossLimit => price < current_price,
        OrderType::Market | OrderType::Oco => false,
    };
    protective.then_some(price)
}

fn band_score(value: Decimal, bands: &[(Decimal, u32)], at_least: bool) -> u32 {
    bands
        .iter()
        .find(|(threshold, _)| if at_least { value >= *threshold } else { value <= *threshold })
        .map_or(0, |(_, points)| *points)
}

/// Score the protection `orders` give a position of `position_qty` in `symbol`.
///
/// A zero `position_qty` means the size is unknown; any protection then earns
/// a flat coverage score.
pub fn score_protection(symbol: &str, current_price: Decimal, orders: &[Order], position_qty: Decimal) -> ProtectionScore {
    let protective: Vec<(&Order, Decimal)> = orders
        .iter()
        .filter(|o| o.symbol == symbol)
        .filter_map(|o| protective_price(o, current_price).map(|p| (o, p)))
        .collect();

    if protective.is_empty() || current_price <= Decimal::ZERO {
        return ProtectionScore {
            protective_orders: protective.len(),
            ..ProtectionScore::unprotected(symbol, position_qty)
        };
    }

    let closest_distance = protective
        .iter()
        .filter_map(|(_, price)| (*price - current_price).abs().checked_div(current_price))
        .min();
    let proximity_score = closest_distance.map_or(0, |d| band_score(d, &PROXIMITY_BANDS, false));

    // Both legs of an OCO list guard the same quantity.
    let mut seen_lists = HashSet::new();
    let protected_qty = protective
        .iter()
        .filter(|(o, _)| !o.is_oco_leg() || seen_lists.insert(o.order_list_id))
        .fold(Decimal::ZERO, |acc, (o, _)| acc.saturating_add(o.remaining_qty()));

    let coverage_score = if position_qty > Decimal::ZERO {
        protected_qty
            .checked_div(position_qty)
            .map_or(0, |ratio| band_score(ratio, &COVERAGE_BANDS, true))
    } else if protected_qty > Decimal::ZERO {
        UNKNOWN_POSITION_COVERAGE
    } else {
        0
    };

    let levels: HashSet<Decimal> = protective
        .iter()
        .map(|(_, price)| price.round_dp(2).normalize())
        .collect();
    let diversification_score = match levels.len() {
        0 => 0,
        1 => 5,
        2 => 10,
        _ => 20,
    };

    let score = proximity_score + coverage_score + diversification_score;
    ProtectionScore {
        symbol: symbol.to_string(),
        score,
        level: ProtectionLevel::from_score(score),
        proximity_score,
        coverage_score,
        diversification_score,
        protective_orders: protective.len(),
        closest_distance,
        protected_qty,
        position_qty,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioProtection {
    /// Mean of the position scores, one decimal place.
    pub score: Decimal,
    pub positions: Vec<ProtectionScore>,
}

impl PortfolioProtection {
    /// Positions whose level calls for new protection.
    pub fn needs_protection(&self) -> impl Iterator<Item = &ProtectionScore> {
        self.positions
            .iter()
            .filter(|p| p.recommendation() == "IMPLEMENT_PROTECTION")
    }

    pub fn summary(&self) -> String {
        let pending = self.needs_protection().count();
        if self.score >= dec!(85) {
            format!(
                "Portfolio protection: EXCELLENT ({}/100). All {} major positions well protected.",
                self.score,
                self.positions.len()
            )
        } else if self.score >= dec!(70) {
            format!("Portfolio protection: GOOD ({}/100). Minor improvements may be beneficial.", self.score)
        } else if self.score >= dec!(50) {
            format!("Portfolio protection: MODERATE ({}/100). {} positions need attention.", self.score, pending)
        } else {
            format!(
                "Portfolio protection: POOR ({}/100). {} positions require immediate protection.",
                self.score, pending
            )
        }
    }
}

/// Score every non-quote holding of at least 1% of the portfolio against its `ASSET{quote}` market.
pub fn score_portfolio(
    portfolio: &PortfolioSummary,
    prices: &HashMap<String, Decimal>,
    open_orders: &[Order],
    quote_asset: &str,
) -> PortfolioProtection {
    let mut positions = Vec::new();
    for holding in &portfolio.balances {
        if holding.asset == quote_asset {
            continue;
        }
        let allocation_pct = holding
            .value_usd
            .checked_div(portfolio.total_value)
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO);
        if allocation_pct < MIN_ALLOCATION_PCT {
            continue;
        }
        let symbol = format!("{}{}", holding.asset, quote_asset);
        let Some(price) = prices.get(&symbol).copied().filter(|p| *p > Decimal::ZERO) else {
            continue;
        };
        positions.push(score_protection(&symbol, price, open_orders, holding.total));
    }

    let score = if positions.is_empty() {
        Decimal::ZERO
    } else {
        let total: u32 = positions.iter().map(|p| p.score).sum();
        (Decimal::from(total) / Decimal::from(positions.len())).round_dp(1)
    };
    PortfolioProtection { score, positions }
}
