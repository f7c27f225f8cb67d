// exchange/mod.rs

pub mod client;
pub mod errors;
pub mod signer;
pub mod traits;
pub mod types;
pub mod utils;

pub use client::BinanceClient;
pub use errors::ExchangeError;
pub use signer::RequestSigner;
pub use traits::{AccountSource, MarketDataProvider, OrderGateway, SymbolRulesSource};
pub use types::*;
