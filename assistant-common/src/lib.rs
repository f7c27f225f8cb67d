// assistant-common/src/lib.rs
// Shared domain types: exchange filters, decimal grid math, order model, indicators

pub mod analysis;
pub mod filters;
pub mod order;

pub use filters::{
    LotSizeFilter, NotionalFilter, PercentPriceBySide, PriceFilter, SymbolFilter, SymbolFilterSet,
};
pub use order::{OrderPricing, OrderSide, OrderType, PriceField, ProposedOrder, TriggerKind, ValidationResult};
