// exchange/errors.rs

use thiserror::Error;

/// Error codes that mean the request itself was malformed or violated a symbol rule.
const INVALID_REQUEST_CODES: &[i64] = &[
    -1013, -1014, -1015, -1016, -1116, -1121, -3008, -3013, -3014, -3015, -3016, -3017, -3018, -3019,
    -3020, -4013, -4024, -4025, -4026,
];

/// Error codes that mean the account cannot fund or is not allowed to place the order.
const INSUFFICIENT_FUNDS_CODES: &[i64] = &[-2010, -2018, -2019, -3010, -3011, -4001, -4002, -4009];

/// Binance error code for an unknown symbol.
pub const UNKNOWN_SYMBOL_CODE: i64 = -1121;

/// Error types for exchange operations
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Exchange error {code}: {message}. Suggestion: {suggestion}")]
    Api {
        code: i64,
        message: String,
        suggestion: &'static str,
    },

    #[error("Invalid request {code}: {message}. Suggestion: {suggestion}")]
    InvalidRequest {
        code: i64,
        message: String,
        suggestion: &'static str,
    },

    #[error("Insufficient funds {code}: {message}. Suggestion: {suggestion}")]
    InsufficientFunds {
        code: i64,
        message: String,
        suggestion: &'static str,
    },

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Missing API credentials: {0}")]
    MissingCredentials(String),

    #[error("Request signing failed: {0}")]
    SigningError(String),
}

impl ExchangeError {
    /// Categorise an exchange `{code, msg}` payload and attach a recovery hint.
    pub fn from_api_code(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        let suggestion = suggestion_for(code);
        if INVALID_REQUEST_CODES.contains(&code) {
            ExchangeError::InvalidRequest {
                code,
                message,
                suggestion,
            }
        } else if INSUFFICIENT_FUNDS_CODES.contains(&code) {
            ExchangeError::InsufficientFunds {
                code,
                message,
                suggestion,
            }
        } else {
            ExchangeError::Api {
                code,
                message,
                suggestion,
            }
        }
    }

    /// Exchange error code, when the error came from an exchange payload.
    pub fn code(&self) -> Option<i64> {
        match self {
            ExchangeError::Api { code, .. }
            | ExchangeError::InvalidRequest { code, .. }
            | ExchangeError::InsufficientFunds { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_unknown_symbol(&self) -> bool {
        self.code() == Some(UNKNOWN_SYMBOL_CODE)
    }
}

fn suggestion_for(code: i64) -> &'static str {
    match code {
        -1000 => "Check your request format and parameters",
        -1001 => "Server is experiencing issues - try again in a few moments",
        -1002 => "Request was not authorized - check API keys and permissions",
        -1003 => "Too many requests - please reduce request frequency",
        -1006 => "Server is currently unavailable - try again later",
        -1007 => "Request timeout - consider reducing complexity or try again",
        -1013 => "Invalid quantity precision - check lot size requirements",
        -1014 => "Unknown order type - use supported order types only",
        -1015 => "Invalid time in force value",
        -1016 => "Invalid order side - use BUY or SELL",
        -1021 => "Request timestamp is invalid - check system clock",
        -1022 => "Invalid signature - verify API secret and signature generation",
        -1121 => "Invalid symbol - check symbol format and market availability",
        -2010 => "NEW_ORDER_REJECTED - check order parameters and account status",
        -2011 => "Order was canceled due to market conditions",
        -2013 => "Order does not exist - check order ID",
        -2014 => "Invalid API key format - verify API key is correct",
        -2015 => "Invalid API key, IP, or permissions - check API settings",
        -2018 => "Account balance is insufficient for this order",
        -2019 => "Account margin is insufficient",
        -2021 => "Order would immediately match and take - adjust price",
        -2022 => "Order would trigger stop condition immediately",
        -2026 => "Order price is too high compared to market price",
        -2027 => "Order price is too low compared to market price",
        -3013 => "Order price precision exceeds maximum allowed",
        -3014 => "Order quantity precision exceeds maximum allowed",
        -3015 => "Order quantity is below minimum required",
        -3016 => "Order price is below minimum required",
        -3017 => "Order quantity exceeds maximum allowed",
        -3018 => "Order price exceeds maximum allowed",
        -3019 => "Order notional value is below minimum required",
        -3020 => "Order notional value exceeds maximum allowed",
        -4011 => "Maximum number of open orders reached",
        -4024 => "Symbol price filter not met",
        -4025 => "Symbol lot size filter not met",
        -4026 => "Symbol notional filter not met",
        _ => "Check the exchange API documentation for this error code",
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ExchangeError::HttpStatus {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => ExchangeError::NetworkError(err.to_string()),
        }
    }
}

impl From<url::ParseError> for ExchangeError {
    fn from(err: url::ParseError) -> Self {
        ExchangeError::ParseError(format!("Invalid URL: {}", err))
    }
}
