// service/orders.rs
// Preflight -> align -> submit

use assistant_common::{OrderPricing, ProposedOrder};
use std::sync::Arc;
use tracing::{info, warn};

use super::aligner::PrecisionAligner;
use super::errors::ServiceError;
use super::filter_cache::FilterCache;
use super::preflight::OrderPreflight;
use crate::exchange::traits::{AccountSource, OrderGateway};
use crate::exchange::types::{OcoOrder, Order};
use crate::exchange::utils::validate_symbol;

#[derive(Debug, Clone)]
pub enum PlacementOutcome {
    /// Passed every check; this is what would have been submitted.
    DryRun(ProposedOrder),
    Placed { order: ProposedOrder, response: Order },
    PlacedOco { order: ProposedOrder, response: OcoOrder },
}

impl PlacementOutcome {
    /// The aligned order that was (or would have been) sent.
    pub fn order(&self) -> &ProposedOrder {
        match self {
            PlacementOutcome::DryRun(order)
            | PlacementOutcome::Placed { order, .. }
            | PlacementOutcome::PlacedOco { order, .. } => order,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelTarget {
    Order(u64),
    OcoList(i64),
}

#[derive(Debug, Clone)]
pub enum CancelOutcome {
    Order(Order),
    OcoList(OcoOrder),
}

pub struct OrderService {
    preflight: OrderPreflight,
    aligner: PrecisionAligner,
    account: Arc<dyn AccountSource>,
    gateway: Arc<dyn OrderGateway>,
}

impl OrderService {
    pub fn new(
        cache: Arc<FilterCache>,
        account: Arc<dyn AccountSource>,
        gateway: Arc<dyn OrderGateway>,
    ) -> Self {
        Self {
            preflight: OrderPreflight::new(cache.clone(), account.clone()),
            aligner: PrecisionAligner::new(cache),
            account,
            gateway,
        }
    }

    /// Reject with every preflight error, or align and submit (unless `dry_run`).
    pub async fn place(&self, order: &ProposedOrder, dry_run: bool) -> Result<PlacementOutcome, ServiceError> {
        validate_symbol(&order.symbol)?;

        let (ok, errors) = self.preflight.check(order).await.into_parts();
        if !ok {
            warn!("Rejected {}: {} error(s)", order, errors.len());
            return Err(ServiceError::Rejected {
                symbol: order.symbol.clone(),
                errors,
            });
        }

        let aligned = self.aligner.align_order(order).await;
        if dry_run {
            info!("Dry run, not submitting {}", aligned);
            return Ok(PlacementOutcome::DryRun(aligned));
        }

        info!("Submitting {}", aligned);
        let outcome = match aligned.pricing {
            OrderPricing::Market => {
                let response = self
                    .gateway
                    .place_market_order(&aligned.symbol, aligned.side, aligned.quantity)
                    .await?;
                PlacementOutcome::Placed {
                    order: aligned,
                    response,
                }
            }
            OrderPricing::Limit { price } => {
                let response = self
                    .gateway
                    .place_limit_order(&aligned.symbol, aligned.side, aligned.quantity, price)
                    .await?;
                PlacementOutcome::Placed {
                    order: aligned,
                    response,
                }
            }
            OrderPricing::Trigger {
                stop_price,
                limit_price,
                ..
            } => {
                let response = self
                    .gateway
                    .place_trigger_order(
                        &aligned.symbol,
                        aligned.side,
                        aligned.order_type(),
                        aligned.quantity,
                        stop_price,
                        limit_price,
                    )
                    .await?;
                PlacementOutcome::Placed {
                    order: aligned,
                    response,
                }
            }
            OrderPricing::Oco {
                limit_price,
                stop_price,
            } => {
                let response = self
                    .gateway
                    .place_oco_order(&aligned.symbol, aligned.quantity, limit_price, stop_price)
                    .await?;
                PlacementOutcome::PlacedOco {
                    order: aligned,
                    response,
                }
            }
        };
        Ok(outcome)
    }

    pub async fn cancel(&self, symbol: &str, target: CancelTarget) -> Result<CancelOutcome, ServiceError> {
        let symbol = validate_symbol(symbol)?;
        let outcome = match target {
            CancelTarget::Order(order_id) => {
                CancelOutcome::Order(self.gateway.cancel_order(&symbol, order_id).await?)
            }
            CancelTarget::OcoList(list_id) => {
                CancelOutcome::OcoList(self.gateway.cancel_oco_order(&symbol, list_id).await?)
            }
        };
        info!("Cancelled {:?} on {}", target, symbol);
        Ok(outcome)
    }

    pub async fn open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>, ServiceError> {
        let symbol = symbol.map(validate_symbol).transpose()?;
        Ok(self.account.open_orders(symbol.as_deref()).await?)
    }
}
