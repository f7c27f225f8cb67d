// testing.rs
// In-memory exchange double for service tests

use assistant_common::{LotSizeFilter, OrderSide, OrderType, PriceFilter, SymbolFilterSet};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::exchange::traits::{AccountSource, MarketDataProvider, OrderGateway, SymbolRulesSource};
use crate::exchange::types::{AccountInfo, Balance, Kline, OcoLeg, OcoOrder, Order, Ticker};
use crate::exchange::ExchangeError;

/// `min_qty = 0.0001, step = 0.0001, tick = 0.01`, nothing else configured.
pub(crate) fn ethusdt_filters() -> SymbolFilterSet {
    SymbolFilterSet {
        lot_size: Some(LotSizeFilter {
            min_qty: dec!(0.0001),
            max_qty: None,
            step_size: dec!(0.0001),
        }),
        price_filter: Some(PriceFilter {
            min_price: Decimal::ZERO,
            max_price: Decimal::ZERO,
            tick_size: dec!(0.01),
        }),
        percent_price_by_side: None,
        notional: None,
    }
}

pub(crate) fn balance(asset: &str, free: Decimal, locked: Decimal) -> Balance {
    Balance {
        asset: asset.to_string(),
        free,
        locked,
    }
}

pub(crate) fn open_order(
    symbol: &str,
    order_id: u64,
    order_list_id: i64,
    side: OrderSide,
    order_type: &str,
    qty: Decimal,
    price: Decimal,
) -> Order {
    Order {
        symbol: symbol.to_string(),
        order_id,
        order_list_id,
        client_order_id: format!("test-{}", order_id),
        price: Some(price),
        orig_qty: Some(qty),
        executed_qty: Some(Decimal::ZERO),
        stop_price: None,
        status: "NEW".to_string(),
        order_type: order_type.parse().unwrap(),
        side,
        time: 0,
    }
}

pub(crate) fn daily_klines(closes: &[Decimal]) -> Vec<Kline> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let open_time = i as i64 * 86_400_000;
            Kline {
                open_time,
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: Decimal::ONE,
                close_time: open_time + 86_399_999,
            }
        })
        .collect()
}

#[derive(Default)]
pub(crate) struct MockExchange {
    filters: HashMap<String, SymbolFilterSet>,
    prices: HashMap<String, Decimal>,
    balances: Vec<Balance>,
    open_orders: Vec<Order>,
    klines: HashMap<String, Vec<Kline>>,
    fail_filters: bool,
    fail_account: bool,
    filter_calls: AtomicUsize,
    price_calls: AtomicUsize,
    submitted: Mutex<Vec<String>>,
}

impl MockExchange {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_symbol(mut self, symbol: &str, filters: SymbolFilterSet, price: Decimal) -> Self {
        self.filters.insert(symbol.to_string(), filters);
        self.prices.insert(symbol.to_string(), price);
        self
    }

    pub(crate) fn with_balance(mut self, asset: &str, free: Decimal, locked: Decimal) -> Self {
        self.balances.push(balance(asset, free, locked));
        self
    }

    pub(crate) fn with_open_order(mut self, order: Order) -> Self {
        self.open_orders.push(order);
        self
    }

    pub(crate) fn with_klines(mut self, symbol: &str, klines: Vec<Kline>) -> Self {
        self.klines.insert(symbol.to_string(), klines);
        self
    }

    pub(crate) fn failing_filters(mut self) -> Self {
        self.fail_filters = true;
        self
    }

    pub(crate) fn failing_account(mut self) -> Self {
        self.fail_account = true;
        self
    }

    pub(crate) fn filter_calls(&self) -> usize {
        self.filter_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn price_calls(&self) -> usize {
        self.price_calls.load(Ordering::SeqCst)
    }

    /// Submissions and cancellations in call order, e.g. `LIMIT ETHUSDT BUY 0.5 @ 2400`.
    pub(crate) fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.submitted.lock().unwrap().push(entry);
    }

    fn unknown_symbol(symbol: &str) -> ExchangeError {
        ExchangeError::from_api_code(-1121, format!("Invalid symbol {}", symbol))
    }

    fn placed_order(symbol: &str, side: OrderSide, order_type: OrderType, qty: Decimal, price: Option<Decimal>) -> Order {
        Order {
            price,
            ..open_order(symbol, 1, -1, side, order_type.as_str(), qty, Decimal::ZERO)
        }
    }
}

#[async_trait]
impl SymbolRulesSource for MockExchange {
    async fn exchange_filters(&self, symbol: &str) -> Result<Option<SymbolFilterSet>, ExchangeError> {
        self.filter_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_filters {
            return Err(ExchangeError::NetworkError("connection reset".to_string()));
        }
        Ok(self.filters.get(symbol).cloned())
    }

    async fn current_price(&self, symbol: &str) -> Result<Option<Decimal>, ExchangeError> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.prices.get(symbol).copied())
    }
}

#[async_trait]
impl AccountSource for MockExchange {
    async fn account_info(&self) -> Result<AccountInfo, ExchangeError> {
        if self.fail_account {
            return Err(ExchangeError::NetworkError("timeout".to_string()));
        }
        Ok(AccountInfo {
            can_trade: true,
            update_time: 0,
            balances: self.balances.clone(),
        })
    }

    async fn open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>, ExchangeError> {
        Ok(self
            .open_orders
            .iter()
            .filter(|o| symbol.map_or(true, |s| o.symbol == s))
            .cloned()
            .collect())
    }

    async fn all_tickers(&self) -> Result<Vec<Ticker>, ExchangeError> {
        Ok(self
            .prices
            .iter()
            .map(|(symbol, price)| Ticker {
                symbol: symbol.clone(),
                price: *price,
            })
            .collect())
    }
}

#[async_trait]
impl OrderGateway for MockExchange {
    async fn place_market_order(&self, symbol: &str, side: OrderSide, quantity: Decimal) -> Result<Order, ExchangeError> {
        if !self.prices.contains_key(symbol) {
            return Err(Self::unknown_symbol(symbol));
        }
        self.record(format!("MARKET {} {} {}", symbol, side, quantity.normalize()));
        Ok(Self::placed_order(symbol, side, OrderType::Market, quantity, None))
    }

    async fn place_limit_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<Order, ExchangeError> {
        if !self.prices.contains_key(symbol) {
            return Err(Self::unknown_symbol(symbol));
        }
        self.record(format!(
            "LIMIT {} {} {} @ {}",
            symbol,
            side,
            quantity.normalize(),
            price.normalize()
        ));
        Ok(Self::placed_order(symbol, side, OrderType::Limit, quantity, Some(price)))
    }

    async fn place_trigger_order(
        &self,
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Option<Decimal>,
    ) -> Result<Order, ExchangeError> {
        if !self.prices.contains_key(symbol) {
            return Err(Self::unknown_symbol(symbol));
        }
        let limit = limit_price
            .map(|p| format!(" @ {}", p.normalize()))
            .unwrap_or_default();
        self.record(format!(
            "{} {} {} {}{} stop {}",
            order_type,
            symbol,
            side,
            quantity.normalize(),
            limit,
            stop_price.normalize()
        ));
        Ok(Order {
            stop_price: Some(stop_price),
            ..Self::placed_order(symbol, side, order_type, quantity, limit_price)
        })
    }

    async fn place_oco_order(
        &self,
        symbol: &str,
        quantity: Decimal,
        limit_price: Decimal,
        stop_price: Decimal,
    ) -> Result<OcoOrder, ExchangeError> {
        if !self.prices.contains_key(symbol) {
            return Err(Self::unknown_symbol(symbol));
        }
        self.record(format!(
            "OCO {} {} {} / {}",
            symbol,
            quantity.normalize(),
            limit_price.normalize(),
            stop_price.normalize()
        ));
        Ok(OcoOrder {
            order_list_id: 7,
            contingency_type: "OCO".to_string(),
            list_status_type: "EXEC_STARTED".to_string(),
            list_order_status: "EXECUTING".to_string(),
            list_client_order_id: "test-list".to_string(),
            transaction_time: 0,
            symbol: symbol.to_string(),
            orders: vec![
                OcoLeg {
                    symbol: symbol.to_string(),
                    order_id: 2,
                    client_order_id: "test-2".to_string(),
                },
                OcoLeg {
                    symbol: symbol.to_string(),
                    order_id: 3,
                    client_order_id: "test-3".to_string(),
                },
            ],
        })
    }

    async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<Order, ExchangeError> {
        let order = self
            .open_orders
            .iter()
            .find(|o| o.symbol == symbol && o.order_id == order_id)
            .cloned()
            .ok_or_else(|| ExchangeError::from_api_code(-2011, "Unknown order sent."))?;
        self.record(format!("CANCEL {} {}", symbol, order_id));
        Ok(Order {
            status: "CANCELED".to_string(),
            ..order
        })
    }

    async fn cancel_oco_order(&self, symbol: &str, order_list_id: i64) -> Result<OcoOrder, ExchangeError> {
        let legs: Vec<OcoLeg> = self
            .open_orders
            .iter()
            .filter(|o| o.symbol == symbol && o.order_list_id == order_list_id)
            .map(|o| OcoLeg {
                symbol: o.symbol.clone(),
                order_id: o.order_id,
                client_order_id: o.client_order_id.clone(),
            })
            .collect();
        if legs.is_empty() {
            return Err(ExchangeError::from_api_code(-2011, "Unknown order list sent."));
        }
        self.record(format!("CANCEL_OCO {} {}", symbol, order_list_id));
        Ok(OcoOrder {
            order_list_id,
            contingency_type: "OCO".to_string(),
            list_status_type: "ALL_DONE".to_string(),
            list_order_status: "ALL_DONE".to_string(),
            list_client_order_id: String::new(),
            transaction_time: 0,
            symbol: symbol.to_string(),
            orders: legs,
        })
    }
}

#[async_trait]
impl MarketDataProvider for MockExchange {
    async fn klines(&self, symbol: &str, _interval: &str, limit: u16) -> Result<Vec<Kline>, ExchangeError> {
        let klines = self
            .klines
            .get(symbol)
            .ok_or_else(|| Self::unknown_symbol(symbol))?;
        let skip = klines.len().saturating_sub(limit as usize);
        Ok(klines[skip..].to_vec())
    }
}
