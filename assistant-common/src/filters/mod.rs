// filters/mod.rs
// Exchange trading rules per symbol and the decimal grid they impose

pub mod grid;
pub mod types;

pub use grid::{decimal_places, floor_to_step, is_on_grid, round_to_tick, GridError, GRID_TOLERANCE};
pub use types::{
    LotSizeFilter, NotionalFilter, PercentPriceBySide, PriceFilter, SymbolFilter, SymbolFilterSet,
};
