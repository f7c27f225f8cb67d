// exchange/traits.rs

use assistant_common::{OrderSide, OrderType, SymbolFilterSet};
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::exchange::errors::ExchangeError;
use crate::exchange::types::{AccountInfo, Kline, OcoOrder, Order, Ticker};

/// Trading rules and reference prices, all the validation engine needs from an exchange.
#[async_trait]
pub trait SymbolRulesSource: Send + Sync {
    /// `Ok(None)` for an unknown symbol or one with no filters; `Err` only for transport faults.
    async fn exchange_filters(&self, symbol: &str) -> Result<Option<SymbolFilterSet>, ExchangeError>;

    /// Latest traded price, `Ok(None)` when the symbol has no ticker.
    async fn current_price(&self, symbol: &str) -> Result<Option<Decimal>, ExchangeError>;
}

#[async_trait]
pub trait AccountSource: Send + Sync {
    async fn account_info(&self) -> Result<AccountInfo, ExchangeError>;

    /// Open orders for one symbol, or for the whole account.
    async fn open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>, ExchangeError>;

    async fn all_tickers(&self) -> Result<Vec<Ticker>, ExchangeError>;
}

/// Order submission. Quantities and prices arrive already aligned.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn place_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
    ) -> Result<Order, ExchangeError>;

    async fn place_limit_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<Order, ExchangeError>;

    /// STOP_LOSS, TAKE_PROFIT and their `*_LIMIT` forms, which carry `limit_price`.
    async fn place_trigger_order(
        &self,
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Option<Decimal>,
    ) -> Result<Order, ExchangeError>;

    /// SELL OCO: take-profit limit above market, stop-loss limit below it.
    async fn place_oco_order(
        &self,
        symbol: &str,
        quantity: Decimal,
        limit_price: Decimal,
        stop_price: Decimal,
    ) -> Result<OcoOrder, ExchangeError>;

    async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<Order, ExchangeError>;

    async fn cancel_oco_order(&self, symbol: &str, order_list_id: i64) -> Result<OcoOrder, ExchangeError>;
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn klines(&self, symbol: &str, interval: &str, limit: u16) -> Result<Vec<Kline>, ExchangeError>;
}
