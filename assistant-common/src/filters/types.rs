// filters/types.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_multiplier_up() -> Decimal {
    Decimal::from(5)
}

fn default_multiplier_down() -> Decimal {
    Decimal::new(2, 1)
}

/// LOT_SIZE: quantity bounds and the step grid anchored at `min_qty`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSizeFilter {
    #[serde(default, with = "rust_decimal::serde::str")]
    pub min_qty: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub max_qty: Option<Decimal>,
    /// Zero means no step constraint.
    #[serde(default, with = "rust_decimal::serde::str")]
    pub step_size: Decimal,
}

/// PRICE_FILTER: zero in any field disables that bound.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFilter {
    #[serde(default, with = "rust_decimal::serde::str")]
    pub min_price: Decimal,
    #[serde(default, with = "rust_decimal::serde::str")]
    pub max_price: Decimal,
    #[serde(default, with = "rust_decimal::serde::str")]
    pub tick_size: Decimal,
}

/// PERCENT_PRICE_BY_SIDE: ratios (not percentages) around the reference price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentPriceBySide {
    #[serde(default = "default_multiplier_up", with = "rust_decimal::serde::str")]
    pub bid_multiplier_up: Decimal,
    #[serde(default = "default_multiplier_down", with = "rust_decimal::serde::str")]
    pub bid_multiplier_down: Decimal,
    #[serde(default = "default_multiplier_up", with = "rust_decimal::serde::str")]
    pub ask_multiplier_up: Decimal,
    #[serde(default = "default_multiplier_down", with = "rust_decimal::serde::str")]
    pub ask_multiplier_down: Decimal,
}

impl Default for PercentPriceBySide {
    fn default() -> Self {
        Self {
            bid_multiplier_up: default_multiplier_up(),
            bid_multiplier_down: default_multiplier_down(),
            ask_multiplier_up: default_multiplier_up(),
            ask_multiplier_down: default_multiplier_down(),
        }
    }
}

/// NOTIONAL: bounds on `quantity * price`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotionalFilter {
    #[serde(default, with = "rust_decimal::serde::str")]
    pub min_notional: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub max_notional: Option<Decimal>,
}

/// One entry of a symbol's raw `filters` array as the exchange returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filterType")]
pub enum SymbolFilter {
    #[serde(rename = "LOT_SIZE")]
    LotSize(LotSizeFilter),
    #[serde(rename = "PRICE_FILTER")]
    Price(PriceFilter),
    #[serde(rename = "PERCENT_PRICE_BY_SIDE")]
    PercentPriceBySide(PercentPriceBySide),
    #[serde(rename = "NOTIONAL")]
    Notional(NotionalFilter),
    /// Filter types the validator does not evaluate (ICEBERG_PARTS, MAX_NUM_ORDERS, ...).
    #[serde(other)]
    Other,
}

/// The trading rules for one symbol.
///
/// A missing filter means "no constraint of that kind", never "reject".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SymbolFilterSet {
    pub lot_size: Option<LotSizeFilter>,
    pub price_filter: Option<PriceFilter>,
    pub percent_price_by_side: Option<PercentPriceBySide>,
    pub notional: Option<NotionalFilter>,
}

impl SymbolFilterSet {
    /// Assemble the set from the exchange's raw filter list. Later duplicates win.
    pub fn from_filters<I>(filters: I) -> Self
    where
        I: IntoIterator<Item = SymbolFilter>,
    {
        let mut set = Self::default();
        for filter in filters {
            match filter {
                SymbolFilter::LotSize(f) => set.lot_size = Some(f),
                SymbolFilter::Price(f) => set.price_filter = Some(f),
                SymbolFilter::PercentPriceBySide(f) => set.percent_price_by_side = Some(f),
                SymbolFilter::Notional(f) => set.notional = Some(f),
                SymbolFilter::Other => {}
            }
        }
        set
    }

    /// Parse a raw JSON filter array, e.g. `symbols[0].filters` of an exchangeInfo payload.
    pub fn from_json(raw: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let filters: Vec<SymbolFilter> = serde_json::from_value(raw.clone())?;
        Ok(Self::from_filters(filters))
    }

    /// True when none of the evaluated filter types is configured.
    pub fn is_unconstrained(&self) -> bool {
        self.lot_size.is_none()
            && self.price_filter.is_none()
            && self.percent_price_by_side.is_none()
            && self.notional.is_none()
    }

    /// Step size when a non-zero one is configured.
    pub fn step_size(&self) -> Option<Decimal> {
        self.lot_size
            .as_ref()
            .map(|lot| lot.step_size)
            .filter(|step| *step > Decimal::ZERO)
    }

    pub fn min_qty(&self) -> Decimal {
        self.lot_size
            .as_ref()
            .map(|lot| lot.min_qty)
            .unwrap_or(Decimal::ZERO)
    }

    /// Tick size when a non-zero one is configured.
    pub fn tick_size(&self) -> Option<Decimal> {
        self.price_filter
            .as_ref()
            .map(|pf| pf.tick_size)
            .filter(|tick| *tick > Decimal::ZERO)
    }
}
