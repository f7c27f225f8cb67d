// exchange/utils.rs
// Utility functions for the spot REST API

use super::ExchangeError;
use rust_decimal::Decimal;

/// Quote assets recognised when splitting a pair, longest first.
const QUOTE_ASSETS: &[&str] = &["FDUSD", "USDT", "BUSD", "USDC", "BTC", "ETH", "BNB"];

/// Validate and normalise a trading pair symbol.
pub fn validate_symbol(symbol: &str) -> Result<String, ExchangeError> {
    if symbol.is_empty() {
        return Err(ExchangeError::InvalidSymbol(
            "Symbol cannot be empty".to_string(),
        ));
    }

    let symbol = symbol.to_uppercase();

    if !symbol.chars().all(char::is_alphanumeric) {
        return Err(ExchangeError::InvalidSymbol(format!(
            "Symbol '{}' contains invalid characters",
            symbol
        )));
    }

    if symbol.len() < 5 || symbol.len() > 20 {
        return Err(ExchangeError::InvalidSymbol(format!(
            "Symbol '{}' has invalid length",
            symbol
        )));
    }

    Ok(symbol)
}

/// Split `ETHUSDT` into `("ETH", "USDT")` using the known quote assets.
pub fn split_symbol(symbol: &str) -> Option<(String, String)> {
    let symbol = symbol.to_uppercase();
    QUOTE_ASSETS.iter().find_map(|quote| {
        symbol
            .strip_suffix(quote)
            .filter(|base| !base.is_empty())
            .map(|base| (base.to_string(), quote.to_string()))
    })
}

/// Plain decimal string for request parameters, without trailing zeros.
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}
