// service/preflight.rs
// Everything checked before an order is submitted

use assistant_common::{OrderPricing, OrderSide, ProposedOrder, ValidationResult};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

use super::account::AccountService;
use super::errors::ServiceError;
use super::filter_cache::FilterCache;
use super::validator::OrderValidator;
use crate::exchange::traits::AccountSource;
use crate::exchange::utils::split_symbol;

/// LIMIT orders priced through the market fill at once instead of resting.
pub fn immediate_fill_risk(order: &ProposedOrder, current_price: Decimal) -> Vec<String> {
    let OrderPricing::Limit { price } = order.pricing else {
        return Vec::new();
    };
    let current = current_price.normalize();
    match order.side {
        OrderSide::Sell if price <= current_price => vec![format!(
            "CRITICAL: SELL LIMIT at {} would fill IMMEDIATELY (current price: {}). For profit-taking, use price > {}",
            price.normalize(),
            current,
            current
        )],
        OrderSide::Buy if price >= current_price => vec![format!(
            "CRITICAL: BUY LIMIT at {} would fill IMMEDIATELY (current price: {}). For accumulation, use price < {}",
            price.normalize(),
            current,
            current
        )],
        _ => Vec::new(),
    }
}

/// Immediate-fill risk, exchange filters and available balance in one pass.
pub struct OrderPreflight {
    cache: Arc<FilterCache>,
    validator: OrderValidator,
    account: AccountService,
}

impl OrderPreflight {
    pub fn new(cache: Arc<FilterCache>, account: Arc<dyn AccountSource>) -> Self {
        Self {
            validator: OrderValidator::new(cache.clone()),
            cache,
            account: AccountService::new(account),
        }
    }

    pub async fn check(&self, order: &ProposedOrder) -> ValidationResult {
        let Some(current_price) = self.cache.current_price(&order.symbol).await else {
            return ValidationResult::failure(format!(
                "Could not retrieve current price for {}",
                order.symbol
            ));
        };

        let mut errors = immediate_fill_risk(order, current_price);
        let (_, filter_errors) = self
            .validator
            .validate_at_price(order, Some(current_price))
            .await
            .into_parts();
        errors.extend(filter_errors);

        match self.balance_shortfall(order, current_price).await {
            Ok(Some(shortfall)) => errors.push(shortfall),
            Ok(None) => {}
            Err(e) => errors.push(format!("Balance validation error: {}", e)),
        }

        debug!("Preflight for {}: {} error(s)", order, errors.len());
        ValidationResult::from_errors(errors)
    }

    /// BUY spends the quote asset at the order (or market) price; SELL spends the base asset.
    async fn balance_shortfall(&self, order: &ProposedOrder, current_price: Decimal) -> Result<Option<String>, ServiceError> {
        let (base, quote) = split_symbol(&order.symbol).ok_or_else(|| {
            ServiceError::InvalidOrder(format!(
                "cannot determine base and quote assets of {}",
                order.symbol
            ))
        })?;

        match order.side {
            OrderSide::Buy => {
                let price = order.primary_price().unwrap_or(current_price);
                let required = order
                    .quantity
                    .checked_mul(price)
                    .ok_or_else(|| ServiceError::InvalidOrder("order cost overflows".to_string()))?;
                let balance = self.account.effective_available_balance(&quote).await?;
                if balance.available >= required {
                    return Ok(None);
                }
                Ok(Some(format!(
                    "Insufficient {} balance: have {} available ({} committed to buy orders), need {} for {} {} at {}",
                    quote,
                    balance.available.normalize(),
                    balance.commitments.buy_orders.normalize(),
                    required.normalize(),
                    order.quantity.normalize(),
                    order.symbol,
                    price.normalize()
                )))
            }
            OrderSide::Sell => {
                let balance = self.account.effective_available_balance(&base).await?;
                if balance.available >= order.quantity {
                    return Ok(None);
                }
                Ok(Some(format!(
                    "Insufficient {} balance: have {} available ({} committed to sell orders, {} in OCO orders), need {} to sell",
                    base,
                    balance.available.normalize(),
                    balance.commitments.sell_orders.normalize(),
                    balance.commitments.oco_orders.normalize(),
                    order.quantity.normalize()
                )))
            }
        }
    }
}
