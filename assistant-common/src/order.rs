// order.rs
// Order model shared by validation, alignment and submission

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            other => Err(format!("Unknown order side: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
    StopLoss,
    StopLossLimit,
    TakeProfit,
    TakeProfitLimit,
    LimitMaker,
    Oco,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
            OrderType::StopLoss => "STOP_LOSS",
            OrderType::StopLossLimit => "STOP_LOSS_LIMIT",
            OrderType::TakeProfit => "TAKE_PROFIT",
            OrderType::TakeProfitLimit => "TAKE_PROFIT_LIMIT",
            OrderType::LimitMaker => "LIMIT_MAKER",
            OrderType::Oco => "OCO",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = String;

    /// Accepts the exchange spelling as well as `stop-loss-limit` style.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "LIMIT" => Ok(OrderType::Limit),
            "MARKET" => Ok(OrderType::Market),
            "STOP_LOSS" => Ok(OrderType::StopLoss),
            "STOP_LOSS_LIMIT" => Ok(OrderType::StopLossLimit),
            "TAKE_PROFIT" => Ok(OrderType::TakeProfit),
            "TAKE_PROFIT_LIMIT" => Ok(OrderType::TakeProfitLimit),
            "LIMIT_MAKER" => Ok(OrderType::LimitMaker),
            "OCO" => Ok(OrderType::Oco),
            other => Err(format!("Unknown order type: {}", other)),
        }
    }
}

/// Direction a triggered order waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// SELL fires on a fall to the stop price, BUY on a rise.
    StopLoss,
    /// SELL fires on a rise to the stop price, BUY on a fall.
    TakeProfit,
}

/// Which price of an order a check or an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Price,
    LimitPrice,
    StopPrice,
}

impl PriceField {
    pub fn label(&self) -> &'static str {
        match self {
            PriceField::Price => "Price",
            PriceField::LimitPrice => "Limit price",
            PriceField::StopPrice => "Stop price",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPricing {
    Market,
    Limit { price: Decimal },
    /// Rests until the last price reaches `stop_price`, then becomes a market
    /// order, or a limit at `limit_price` for the `*_LIMIT` types.
    Trigger {
        kind: TriggerKind,
        stop_price: Decimal,
        limit_price: Option<Decimal>,
    },
    /// Take-profit limit above market plus stop-loss below it.
    Oco { limit_price: Decimal, stop_price: Decimal },
}

impl OrderPricing {
    /// Same shape with every price passed through `f`.
    pub fn try_map_prices<E>(self, mut f: impl FnMut(PriceField, Decimal) -> Result<Decimal, E>) -> Result<Self, E> {
        Ok(match self {
            OrderPricing::Market => OrderPricing::Market,
            OrderPricing::Limit { price } => OrderPricing::Limit {
                price: f(PriceField::Price, price)?,
            },
            OrderPricing::Trigger {
                kind,
                stop_price,
                limit_price,
            } => OrderPricing::Trigger {
                kind,
                limit_price: limit_price.map(|p| f(PriceField::Price, p)).transpose()?,
                stop_price: f(PriceField::StopPrice, stop_price)?,
            },
            OrderPricing::Oco {
                limit_price,
                stop_price,
            } => OrderPricing::Oco {
                limit_price: f(PriceField::LimitPrice, limit_price)?,
                stop_price: f(PriceField::StopPrice, stop_price)?,
            },
        })
    }
}

/// A trade under evaluation. Built right before validation and dropped after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedOrder {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub pricing: OrderPricing,
}

impl ProposedOrder {
    pub fn market(symbol: &str, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            side,
            quantity,
            pricing: OrderPricing::Market,
        }
    }

    pub fn limit(symbol: &str, side: OrderSide, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            side,
            quantity,
            pricing: OrderPricing::Limit { price },
        }
    }

    /// OCO orders protect a held position, so they are always SELL.
    pub fn oco(symbol: &str, quantity: Decimal, limit_price: Decimal, stop_price: Decimal) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            side: OrderSide::Sell,
            quantity,
            pricing: OrderPricing::Oco {
                limit_price,
                stop_price,
            },
        }
    }

    /// STOP_LOSS / TAKE_PROFIT, or their `*_LIMIT` forms when a limit price is given.
    pub fn trigger(
        symbol: &str,
        side: OrderSide,
        kind: TriggerKind,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Option<Decimal>,
    ) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            side,
            quantity,
            pricing: OrderPricing::Trigger {
                kind,
                stop_price,
                limit_price,
            },
        }
    }

    /// Build an order of an explicit type, checking it carries the prices that type needs.
    pub fn with_type(
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        price: Option<Decimal>,
        stop_price: Option<Decimal>,
    ) -> Result<Self, String> {
        let required = |value: Option<Decimal>, param: &str| {
            value.ok_or_else(|| format!("{} is required for {} orders", param, order_type))
        };
        match order_type {
            OrderType::Market => Ok(Self::market(symbol, side, quantity)),
            OrderType::Limit => Ok(Self::limit(symbol, side, quantity, required(price, "price")?)),
            OrderType::StopLoss | OrderType::TakeProfit => {
                let kind = if order_type == OrderType::StopLoss {
                    TriggerKind::StopLoss
                } else {
                    TriggerKind::TakeProfit
                };
                Ok(Self::trigger(symbol, side, kind, quantity, required(stop_price, "stop_price")?, None))
            }
            OrderType::StopLossLimit | OrderType::TakeProfitLimit => {
                let kind = if order_type == OrderType::StopLossLimit {
                    TriggerKind::StopLoss
                } else {
                    TriggerKind::TakeProfit
                };
                let limit = required(price, "price")?;
                let stop = required(stop_price, "stop_price")?;
                Ok(Self::trigger(symbol, side, kind, quantity, stop, Some(limit)))
            }
            OrderType::Oco => Self::from_fields(
                symbol,
                side,
                quantity,
                Some(required(price, "price")?),
                Some(required(stop_price, "stop_price")?),
            ),
            OrderType::LimitMaker => Err("LIMIT_MAKER orders cannot be placed from here".to_string()),
        }
    }

    /// Build from loose fields: a stop price makes it OCO, a lone price LIMIT, neither MARKET.
    pub fn from_fields(
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        price: Option<Decimal>,
        stop_price: Option<Decimal>,
    ) -> Result<Self, String> {
        match (price, stop_price) {
            (Some(limit_price), Some(stop_price)) => {
                if side != OrderSide::Sell {
                    return Err(format!(
                        "OCO orders are SELL side only (got {} for {})",
                        side, symbol
                    ));
                }
                Ok(Self::oco(symbol, quantity, limit_price, stop_price))
            }
            (None, Some(_)) => Err("Price and stop_price are required for OCO orders".to_string()),
            (Some(price), None) => Ok(Self::limit(symbol, side, quantity, price)),
            (None, None) => Ok(Self::market(symbol, side, quantity)),
        }
    }

    pub fn order_type(&self) -> OrderType {
        match self.pricing {
            OrderPricing::Market => OrderType::Market,
            OrderPricing::Limit { .. } => OrderType::Limit,
            OrderPricing::Trigger {
                kind: TriggerKind::StopLoss,
                limit_price,
                ..
            } => match limit_price {
                Some(_) => OrderType::StopLossLimit,
                None => OrderType::StopLoss,
            },
            OrderPricing::Trigger {
                kind: TriggerKind::TakeProfit,
                limit_price,
                ..
            } => match limit_price {
                Some(_) => OrderType::TakeProfitLimit,
                None => OrderType::TakeProfit,
            },
            OrderPricing::Oco { .. } => OrderType::Oco,
        }
    }

    /// Every price field present, in submission order.
    pub fn prices(&self) -> Vec<(PriceField, Decimal)> {
        match self.pricing {
            OrderPricing::Market => Vec::new(),
            OrderPricing::Limit { price } => vec![(PriceField::Price, price)],
            OrderPricing::Trigger {
                stop_price,
                limit_price: Some(limit_price),
                ..
            } => vec![(PriceField::Price, limit_price), (PriceField::StopPrice, stop_price)],
            OrderPricing::Trigger { stop_price, .. } => vec![(PriceField::StopPrice, stop_price)],
            OrderPricing::Oco {
                limit_price,
                stop_price,
            } => vec![
                (PriceField::LimitPrice, limit_price),
                (PriceField::StopPrice, stop_price),
            ],
        }
    }

    /// The price that determines the order's cost, if any.
    pub fn primary_price(&self) -> Option<Decimal> {
        self.prices().first().map(|(_, price)| *price)
    }
}

impl fmt::Display for ProposedOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pricing {
            OrderPricing::Market => write!(
                f,
                "{} MARKET {} {}",
                self.side, self.quantity, self.symbol
            ),
            OrderPricing::Limit { price } => write!(
                f,
                "{} LIMIT {} {} @ {}",
                self.side, self.quantity, self.symbol, price
            ),
            OrderPricing::Trigger {
                stop_price,
                limit_price: Some(limit_price),
                ..
            } => write!(
                f,
                "{} {} {} {} @ {} stop {}",
                self.side,
                self.order_type(),
                self.quantity,
                self.symbol,
                limit_price,
                stop_price
            ),
            OrderPricing::Trigger { stop_price, .. } => write!(
                f,
                "{} {} {} {} stop {}",
                self.side,
                self.order_type(),
                self.quantity,
                self.symbol,
                stop_price
            ),
            OrderPricing::Oco {
                limit_price,
                stop_price,
            } => write!(
                f,
                "{} OCO {} {} take-profit {} / stop {}",
                self.side, self.quantity, self.symbol, limit_price, stop_price
            ),
        }
    }
}

/// Outcome of a validation pass: valid exactly when no errors were collected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self { errors }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_parts(self) -> (bool, Vec<String>) {
        (self.errors.is_empty(), self.errors)
    }
}
