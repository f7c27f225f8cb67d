// service/account.rs
// Valued balances and per-asset availability

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use super::errors::ServiceError;
use super::protection::{score_portfolio, PortfolioProtection};
use crate::exchange::traits::AccountSource;
use crate::exchange::types::{Balance, Order, Ticker};
use crate::exchange::utils::split_symbol;
use assistant_common::OrderSide;

const USD_QUOTES: &[&str] = &["USDT", "BUSD", "USD"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValuedBalance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
    pub total: Decimal,
    pub value_usd: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PortfolioSummary {
    /// Sorted by value, largest first.
    pub balances: Vec<ValuedBalance>,
    pub total_value: Decimal,
}

/// Funds tied up in open orders for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Commitments {
    /// Quote value of resting BUY orders.
    pub buy_orders: Decimal,
    /// Base quantity of resting plain SELL orders.
    pub sell_orders: Decimal,
    /// Base quantity of resting OCO lists, counted once per list.
    pub oco_orders: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveBalance {
    pub asset: String,
    /// Spendable now. The exchange's `free` already excludes what open orders lock.
    pub available: Decimal,
    pub locked: Decimal,
    pub commitments: Commitments,
}

/// USD value of `amount` of `asset`, trying `ASSETUSDT`, `ASSETBUSD`, `ASSETUSD`,
/// then a route through BTC.
pub fn usd_value(asset: &str, amount: Decimal, prices: &HashMap<String, Decimal>) -> Option<Decimal> {
    if asset == "USDT" {
        return Some(amount);
    }
    let direct = USD_QUOTES
        .iter()
        .find_map(|quote| prices.get(&format!("{}{}", asset, quote)));
    if let Some(price) = direct {
        return amount.checked_mul(*price);
    }
    let via_btc = prices.get(&format!("{}BTC", asset))?;
    let btc_usd = prices.get("BTCUSDT")?;
    amount.checked_mul(*via_btc)?.checked_mul(*btc_usd)
}

/// Value every non-empty balance and keep those worth at least `min_value`.
pub fn value_balances(balances: &[Balance], tickers: &[Ticker], min_value: Decimal) -> PortfolioSummary {
    let prices: HashMap<String, Decimal> = tickers
        .iter()
        .map(|t| (t.symbol.clone(), t.price))
        .collect();

    let mut valued: Vec<ValuedBalance> = balances
        .iter()
        .filter(|b| b.total() > Decimal::ZERO)
        .filter_map(|b| {
            let total = b.total();
            let value_usd = usd_value(&b.asset, total, &prices).unwrap_or(Decimal::ZERO);
            (value_usd >= min_value).then(|| ValuedBalance {
                asset: b.asset.clone(),
                free: b.free,
                locked: b.locked,
                total,
                value_usd,
            })
        })
        .collect();
    valued.sort_by(|a, b| b.value_usd.cmp(&a.value_usd));

    let total_value = valued
        .iter()
        .fold(Decimal::ZERO, |acc, b| acc.saturating_add(b.value_usd));
    PortfolioSummary {
        balances: valued,
        total_value,
    }
}

/// What open orders hold of `asset`: BUYs quoted in it, SELLs of it.
pub fn commitments_for(asset: &str, open_orders: &[Order]) -> Commitments {
    let mut commitments = Commitments::default();
    let mut seen_lists = HashSet::new();

    for order in open_orders {
        let Some((base, quote)) = split_symbol(&order.symbol) else {
            continue;
        };
        let remaining = order.remaining_qty();
        match order.side {
            OrderSide::Buy if quote == asset => {
                if let Some(price) = order.price.filter(|p| *p > Decimal::ZERO) {
                    commitments.buy_orders = commitments
                        .buy_orders
                        .saturating_add(remaining.saturating_mul(price));
                }
            }
            OrderSide::Sell if base == asset => {
                if order.is_oco_leg() {
                    // Both legs of a list reserve the same quantity.
                    if seen_lists.insert(order.order_list_id) {
                        commitments.oco_orders = commitments.oco_orders.saturating_add(remaining);
                    }
                } else {
                    commitments.sell_orders = commitments.sell_orders.saturating_add(remaining);
                }
            }
            _ => {}
        }
    }
    commitments
}

pub struct AccountService {
    source: Arc<dyn AccountSource>,
}

impl AccountService {
    pub fn new(source: Arc<dyn AccountSource>) -> Self {
        Self { source }
    }

    pub async fn portfolio(&self, min_value: Decimal) -> Result<PortfolioSummary, ServiceError> {
        let account = self.source.account_info().await?;
        let tickers = self.source.all_tickers().await?;
        let summary = value_balances(&account.balances, &tickers, min_value);
        info!(
            "Valued {} balance(s), portfolio total {}",
            summary.balances.len(),
            summary.total_value.round_dp(2)
        );
        Ok(summary)
    }

    /// Protection scores for every holding worth at least `min_value`, priced in `quote_asset`.
    pub async fn protection(&self, min_value: Decimal, quote_asset: &str) -> Result<PortfolioProtection, ServiceError> {
        let account = self.source.account_info().await?;
        let tickers = self.source.all_tickers().await?;
        let open_orders = self.source.open_orders(None).await?;

        let summary = value_balances(&account.balances, &tickers, min_value);
        let prices: HashMap<String, Decimal> = tickers.into_iter().map(|t| (t.symbol, t.price)).collect();
        let protection = score_portfolio(&summary, &prices, &open_orders, &quote_asset.to_uppercase());
        info!(
            "Scored protection of {} position(s), portfolio score {}",
            protection.positions.len(),
            protection.score
        );
        Ok(protection)
    }

    pub async fn effective_available_balance(&self, asset: &str) -> Result<EffectiveBalance, ServiceError> {
        let asset = asset.to_uppercase();
        let account = self.source.account_info().await?;
        let open_orders = self.source.open_orders(None).await?;

        let (available, locked) = account
            .balance(&asset)
            .map(|b| (b.free, b.locked))
            .unwrap_or((Decimal::ZERO, Decimal::ZERO));
        let commitments = commitments_for(&asset, &open_orders);
        debug!(
            "Effective balance for {}: available {}, locked {}, commitments {:?}",
            asset, available, locked, commitments
        );

        Ok(EffectiveBalance {
            asset,
            available,
            locked,
            commitments,
        })
    }
}
