// service/mod.rs

pub mod account;
pub mod aligner;
pub mod errors;
pub mod filter_cache;
pub mod market_data;
pub mod orders;
pub mod preflight;
pub mod protection;
pub mod validator;

pub use account::{AccountService, EffectiveBalance, PortfolioSummary, ValuedBalance};
pub use aligner::PrecisionAligner;
pub use errors::ServiceError;
pub use filter_cache::FilterCache;
pub use market_data::{CoinIndicators, IndicatorService};
pub use orders::{CancelOutcome, CancelTarget, OrderService, PlacementOutcome};
pub use preflight::OrderPreflight;
pub use protection::{PortfolioProtection, ProtectionLevel, ProtectionScore};
pub use validator::{LotSizeInfo, OrderValidator};
