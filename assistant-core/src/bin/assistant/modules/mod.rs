// assistant-core/src/bin/assistant/modules/mod.rs

pub mod account; // balances & fills
pub mod market; // prices, lot sizes, indicators
pub mod orders; // validate / place / cancel
