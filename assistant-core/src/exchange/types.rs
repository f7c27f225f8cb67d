// exchange/types.rs
// REST payloads of the spot API

use assistant_common::{OrderSide, OrderType, SymbolFilter, SymbolFilterSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::str::FromStr;

use super::ExchangeError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTime {
    pub server_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub free: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub locked: Decimal,
}

impl Balance {
    pub fn total(&self) -> Decimal {
        self.free + self.locked
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(default)]
    pub can_trade: bool,
    #[serde(default)]
    pub update_time: i64,
    pub balances: Vec<Balance>,
}

impl AccountInfo {
    pub fn balance(&self, asset: &str) -> Option<&Balance> {
        self.balances
            .iter()
            .find(|b| b.asset.eq_ignore_ascii_case(asset))
    }
}

/// An order as returned by order queries and MARKET/LIMIT placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub symbol: String,
    pub order_id: u64,
    #[serde(default = "no_order_list")]
    pub order_list_id: i64,
    #[serde(default)]
    pub client_order_id: String,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub orig_qty: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub executed_qty: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub stop_price: Option<Decimal>,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub side: OrderSide,
    #[serde(default, alias = "transactTime")]
    pub time: i64,
}

fn no_order_list() -> i64 {
    -1
}

impl Order {
    /// Quantity still resting on the book.
    pub fn remaining_qty(&self) -> Decimal {
        let orig = self.orig_qty.unwrap_or(Decimal::ZERO);
        let executed = self.executed_qty.unwrap_or(Decimal::ZERO);
        (orig - executed).max(Decimal::ZERO)
    }

    pub fn is_oco_leg(&self) -> bool {
        self.order_list_id >= 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcoLeg {
    pub symbol: String,
    pub order_id: u64,
    #[serde(default)]
    pub client_order_id: String,
}

/// Order list created by an OCO placement or returned by an OCO cancel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcoOrder {
    pub order_list_id: i64,
    #[serde(default)]
    pub contingency_type: String,
    #[serde(default)]
    pub list_status_type: String,
    #[serde(default)]
    pub list_order_status: String,
    #[serde(default)]
    pub list_client_order_id: String,
    #[serde(default)]
    pub transaction_time: i64,
    pub symbol: String,
    #[serde(default)]
    pub orders: Vec<OcoLeg>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub symbol: String,
    pub id: u64,
    pub order_id: u64,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub qty: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub quote_qty: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub commission: Decimal,
    pub commission_asset: String,
    pub time: i64,
    pub is_buyer: bool,
    pub is_maker: bool,
}

impl Trade {
    pub fn side(&self) -> OrderSide {
        if self.is_buyer {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        }
    }
}

/// Column names of a kline row, by position.
const KLINE_COLUMNS: [&str; 7] = ["open time", "open", "high", "low", "close", "volume", "close time"];

/// One candle. The API sends these as positional arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kline {
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub close_time: i64,
}

impl Kline {
    pub fn from_row(row: &Value) -> Result<Self, ExchangeError> {
        let fields = row
            .as_array()
            .ok_or_else(|| ExchangeError::ParseError("Kline row is not an array".to_string()))?;
        if fields.len() < 7 {
            return Err(ExchangeError::ParseError(format!(
                "Kline row has {} fields, expected at least 7",
                fields.len()
            )));
        }

        let int_at = |idx: usize| {
            fields[idx].as_i64().ok_or_else(|| {
                ExchangeError::ParseError(format!("Kline {} is not an integer", KLINE_COLUMNS[idx]))
            })
        };
        let dec_at = |idx: usize| {
            let raw = fields[idx].as_str().ok_or_else(|| {
                ExchangeError::ParseError(format!("Kline {} is not a decimal string", KLINE_COLUMNS[idx]))
            })?;
            Decimal::from_str(raw).map_err(|e| {
                ExchangeError::ParseError(format!("Kline {} '{}' is not a decimal: {}", KLINE_COLUMNS[idx], raw, e))
            })
        };

        Ok(Self {
            open_time: int_at(0)?,
            open: dec_at(1)?,
            high: dec_at(2)?,
            low: dec_at(3)?,
            close: dec_at(4)?,
            volume: dec_at(5)?,
            close_time: int_at(6)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub status: String,
    pub base_asset: String,
    pub quote_asset: String,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

impl SymbolInfo {
    /// Evaluated filters, or `None` when the exchange lists none.
    pub fn filter_set(&self) -> Option<SymbolFilterSet> {
        if self.filters.is_empty() {
            return None;
        }
        Some(SymbolFilterSet::from_filters(self.filters.iter().cloned()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    #[serde(default)]
    pub server_time: i64,
    pub symbols: Vec<SymbolInfo>,
}

impl ExchangeInfo {
    pub fn symbol(&self, symbol: &str) -> Option<&SymbolInfo> {
        self.symbols
            .iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
    }
}

/// Raw `{code, msg}` error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}
