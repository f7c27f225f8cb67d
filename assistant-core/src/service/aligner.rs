// service/aligner.rs
// Snap order fields onto the exchange's step/tick grids

use assistant_common::filters::{floor_to_step, round_to_tick, GridError};
use assistant_common::{OrderPricing, ProposedOrder, SymbolFilterSet};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

use super::filter_cache::FilterCache;

/// Floor `quantity` onto the lot-size grid anchored at `min_qty`; unchanged without a step.
pub fn align_quantity_with(filters: &SymbolFilterSet, quantity: Decimal) -> Result<Decimal, GridError> {
    match filters.step_size() {
        Some(step) => floor_to_step(quantity, filters.min_qty(), step),
        None => Ok(quantity),
    }
}

/// Round `price` to the nearest tick, ties to even; unchanged without a tick.
pub fn align_price_with(filters: &SymbolFilterSet, price: Decimal) -> Result<Decimal, GridError> {
    match filters.tick_size() {
        Some(tick) => round_to_tick(price, tick),
        None => Ok(price),
    }
}

/// Best-effort alignment. Without resolvable filters every input comes back unchanged.
#[derive(Clone)]
pub struct PrecisionAligner {
    cache: Arc<FilterCache>,
}

impl PrecisionAligner {
    pub fn new(cache: Arc<FilterCache>) -> Self {
        Self { cache }
    }

    pub async fn align_quantity(&self, symbol: &str, quantity: Decimal) -> Decimal {
        match self.cache.get_filters(symbol).await {
            Some(filters) => quantity_or_input(&filters, symbol, quantity),
            None => quantity,
        }
    }

    pub async fn align_price(&self, symbol: &str, price: Decimal) -> Decimal {
        match self.cache.get_filters(symbol).await {
            Some(filters) => price_or_input(&filters, symbol, price),
            None => price,
        }
    }

    pub async fn align_limit(&self, symbol: &str, quantity: Decimal, price: Decimal) -> (Decimal, Decimal) {
        let Some(filters) = self.cache.get_filters(symbol).await else {
            return (quantity, price);
        };
        let aligned = (
            quantity_or_input(&filters, symbol, quantity),
            price_or_input(&filters, symbol, price),
        );
        info!(
            "Limit order alignment for {}: quantity {} -> {}, price {} -> {}",
            symbol, quantity, aligned.0, price, aligned.1
        );
        aligned
    }

    pub async fn align_oco(
        &self,
        symbol: &str,
        quantity: Decimal,
        limit_price: Decimal,
        stop_price: Decimal,
    ) -> (Decimal, Decimal, Decimal) {
        let Some(filters) = self.cache.get_filters(symbol).await else {
            return (quantity, limit_price, stop_price);
        };
        let aligned = (
            quantity_or_input(&filters, symbol, quantity),
            price_or_input(&filters, symbol, limit_price),
            price_or_input(&filters, symbol, stop_price),
        );
        info!(
            "OCO alignment for {}: quantity {} -> {}, limit {} -> {}, stop {} -> {}",
            symbol, quantity, aligned.0, limit_price, aligned.1, stop_price, aligned.2
        );
        aligned
    }

    /// Align every numeric field of `order` with a single filter lookup.
    pub async fn align_order(&self, order: &ProposedOrder) -> ProposedOrder {
        let mut aligned = order.clone();
        match order.pricing {
            OrderPricing::Market => {
                aligned.quantity = self.align_quantity(&order.symbol, order.quantity).await;
            }
            OrderPricing::Limit { price } => {
                let (quantity, price) = self.align_limit(&order.symbol, order.quantity, price).await;
                aligned.quantity = quantity;
                aligned.pricing = OrderPricing::Limit { price };
            }
            OrderPricing::Oco {
                limit_price,
                stop_price,
            } => {
                let (quantity, limit_price, stop_price) = self
                    .align_oco(&order.symbol, order.quantity, limit_price, stop_price)
                    .await;
                aligned.quantity = quantity;
                aligned.pricing = OrderPricing::Oco {
                    limit_price,
                    stop_price,
                };
            }
            OrderPricing::Trigger { .. } => {
                let Some(filters) = self.cache.get_filters(&order.symbol).await else {
                    return aligned;
                };
                aligned.quantity = quantity_or_input(&filters, &order.symbol, order.quantity);
                aligned.pricing = order
                    .pricing
                    .try_map_prices(|_, price| align_price_with(&filters, price))
                    .unwrap_or_else(|e| {
                        warn!("Leaving prices of {} unaligned: {}", order, e);
                        order.pricing
                    });
                info!("{} alignment: {} -> {}", order.order_type(), order, aligned);
            }
        }
        aligned
    }
}

fn quantity_or_input(filters: &SymbolFilterSet, symbol: &str, quantity: Decimal) -> Decimal {
    align_quantity_with(filters, quantity).unwrap_or_else(|e| {
        warn!("Leaving quantity {} for {} unaligned: {}", quantity, symbol, e);
        quantity
    })
}

fn price_or_input(filters: &SymbolFilterSet, symbol: &str, price: Decimal) -> Decimal {
    align_price_with(filters, price).unwrap_or_else(|e| {
        warn!("Leaving price {} for {} unaligned: {}", price, symbol, e);
        price
    })
}
