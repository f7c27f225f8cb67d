// ====
// Spot REST API Client
// ====
// Signed + public endpoints
// Exchange info TTL cache
// ====

use assistant_common::{OrderSide, OrderType, SymbolFilterSet};
use async_trait::async_trait;
use reqwest::{Client, Method};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::{form_urlencoded, Url};

use super::errors::ExchangeError;
use super::signer::RequestSigner;
use super::traits::{AccountSource, MarketDataProvider, OrderGateway, SymbolRulesSource};
use super::types::{
    AccountInfo, ApiErrorBody, ExchangeInfo, Kline, OcoOrder, Order, ServerTime, Ticker, Trade,
};
use super::utils::format_decimal;
use crate::config::{Credentials, ExchangeSettings};

const API_KEY_HEADER: &str = "X-MBX-APIKEY";
const ALL_SYMBOLS_KEY: &str = "*";

type Params = Vec<(&'static str, String)>;

struct CachedExchangeInfo {
    fetched_at: Instant,
    info: ExchangeInfo,
}

/// Spot REST client
///
/// Public endpoints work without credentials; signed ones return
/// [`ExchangeError::MissingCredentials`] until a key pair is configured.
pub struct BinanceClient {
    /// HTTP client
    client: Client,
    /// API base URL
    base_url: String,
    /// API key sent with every request
    api_key: Option<String>,
    /// HMAC signer for private endpoints
    signer: Option<RequestSigner>,
    recv_window_ms: u64,
    exchange_info_ttl: Duration,
    /// Exchange info cache, keyed by symbol or `*` for the full listing
    exchange_info: Arc<RwLock<HashMap<String, CachedExchangeInfo>>>,
}

impl BinanceClient {
    pub fn new(settings: &ExchangeSettings, credentials: Option<Credentials>) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        let (api_key, signer) = match credentials {
            Some(creds) => (Some(creds.api_key), Some(RequestSigner::new(creds.api_secret))),
            None => (None, None),
        };

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            signer,
            recv_window_ms: settings.recv_window_ms,
            exchange_info_ttl: Duration::from_secs(settings.exchange_info_ttl_secs),
            exchange_info: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.signer.is_some()
    }

    // ====================================================================
    // MARKET DATA
    // ====================================================================

    pub async fn server_time(&self) -> Result<i64, ExchangeError> {
        let time: ServerTime = self
            .send(Method::GET, "/api/v3/time", Vec::new(), false)
            .await?;
        Ok(time.server_time)
    }

    /// Exchange trading rules, for one symbol or all of them.
    ///
    /// Responses are cached per key until the configured TTL expires.
    pub async fn exchange_info(&self, symbol: Option<&str>) -> Result<ExchangeInfo, ExchangeError> {
        let key = symbol
            .map(|s| s.to_uppercase())
            .unwrap_or_else(|| ALL_SYMBOLS_KEY.to_string());

        // Check cache first
        {
            let cache = self.exchange_info.read().await;
            if let Some(entry) = cache.get(&key) {
                if entry.fetched_at.elapsed() < self.exchange_info_ttl {
                    return Ok(entry.info.clone());
                }
            }
        }

        let mut params = Params::new();
        if key != ALL_SYMBOLS_KEY {
            params.push(("symbol", key.clone()));
        }
        let info: ExchangeInfo = self
            .send(Method::GET, "/api/v3/exchangeInfo", params, false)
            .await?;
        debug!("Fetched exchange info for {} ({} symbols)", key, info.symbols.len());

        let mut cache = self.exchange_info.write().await;
        cache.insert(
            key,
            CachedExchangeInfo {
                fetched_at: Instant::now(),
                info: info.clone(),
            },
        );
        Ok(info)
    }

    pub async fn ticker_price(&self, symbol: &str) -> Result<Ticker, ExchangeError> {
        self.send(
            Method::GET,
            "/api/v3/ticker/price",
            vec![("symbol", symbol.to_uppercase())],
            false,
        )
        .await
    }

    pub async fn tickers(&self) -> Result<Vec<Ticker>, ExchangeError> {
        self.send(Method::GET, "/api/v3/ticker/price", Vec::new(), false)
            .await
    }

    pub async fn get_klines(&self, symbol: &str, interval: &str, limit: u16) -> Result<Vec<Kline>, ExchangeError> {
        let rows: Vec<serde_json::Value> = self
            .send(
                Method::GET,
                "/api/v3/klines",
                vec![
                    ("symbol", symbol.to_uppercase()),
                    ("interval", interval.to_string()),
                    ("limit", limit.to_string()),
                ],
                false,
            )
            .await?;
        rows.iter().map(Kline::from_row).collect()
    }

    // ====================================================================
    // ACCOUNT
    // ====================================================================

    pub async fn get_account_info(&self) -> Result<AccountInfo, ExchangeError> {
        self.send(Method::GET, "/api/v3/account", Vec::new(), true)
            .await
    }

    pub async fn get_open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>, ExchangeError> {
        let params = symbol
            .map(|s| vec![("symbol", s.to_uppercase())])
            .unwrap_or_default();
        self.send(Method::GET, "/api/v3/openOrders", params, true)
            .await
    }

    /// Most recent fills for a symbol, oldest first.
    pub async fn trade_history(&self, symbol: &str, limit: u16) -> Result<Vec<Trade>, ExchangeError> {
        self.send(
            Method::GET,
            "/api/v3/myTrades",
            vec![("symbol", symbol.to_uppercase()), ("limit", limit.to_string())],
            true,
        )
        .await
    }

    // ====================================================================
    // TRADING
    // ====================================================================

    pub async fn market_order(&self, symbol: &str, side: OrderSide, quantity: Decimal) -> Result<Order, ExchangeError> {
        self.send(
            Method::POST,
            "/api/v3/order",
            vec![
                ("symbol", symbol.to_uppercase()),
                ("side", side.as_str().to_string()),
                ("type", "MARKET".to_string()),
                ("quantity", format_decimal(quantity)),
            ],
            true,
        )
        .await
    }

    pub async fn limit_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<Order, ExchangeError> {
        self.send(
            Method::POST,
            "/api/v3/order",
            vec![
                ("symbol", symbol.to_uppercase()),
                ("side", side.as_str().to_string()),
                ("type", "LIMIT".to_string()),
                ("timeInForce", "GTC".to_string()),
                ("quantity", format_decimal(quantity)),
                ("price", format_decimal(price)),
            ],
            true,
        )
        .await
    }

    /// STOP_LOSS / TAKE_PROFIT family; `limit_price` is required by the `*_LIMIT` types.
    pub async fn trigger_order(
        &self,
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Option<Decimal>,
    ) -> Result<Order, ExchangeError> {
        let params = trigger_order_params(symbol, side, order_type, quantity, stop_price, limit_price)?;
        self.send(Method::POST, "/api/v3/order", params, true).await
    }

    pub async fn oco_order(
        &self,
        symbol: &str,
        quantity: Decimal,
        limit_price: Decimal,
        stop_price: Decimal,
    ) -> Result<OcoOrder, ExchangeError> {
        self.send(
            Method::POST,
            "/api/v3/order/oco",
            vec![
                ("symbol", symbol.to_uppercase()),
                ("side", OrderSide::Sell.as_str().to_string()),
                ("quantity", format_decimal(quantity)),
                ("price", format_decimal(limit_price)),
                ("stopPrice", format_decimal(stop_price)),
                ("timeInForce", "GTC".to_string()),
            ],
            true,
        )
        .await
    }

    pub async fn cancel(&self, symbol: &str, order_id: u64) -> Result<Order, ExchangeError> {
        self.send(
            Method::DELETE,
            "/api/v3/order",
            vec![("symbol", symbol.to_uppercase()), ("orderId", order_id.to_string())],
            true,
        )
        .await
    }

    pub async fn cancel_oco(&self, symbol: &str, order_list_id: i64) -> Result<OcoOrder, ExchangeError> {
        self.send(
            Method::DELETE,
            "/api/v3/orderList",
            vec![
                ("symbol", symbol.to_uppercase()),
                ("orderListId", order_list_id.to_string()),
            ],
            true,
        )
        .await
    }

    // ====================================================================
    // REQUEST PLUMBING
    // ====================================================================

    /// Signed query string: params, then `recvWindow`, `timestamp` and `signature`.
    fn signed_query(&self, mut params: Params, timestamp: i64) -> Result<String, ExchangeError> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            ExchangeError::MissingCredentials(
                "set BINANCE_API_KEY and BINANCE_API_SECRET for account and trading commands".to_string(),
            )
        })?;
        params.push(("recvWindow", self.recv_window_ms.to_string()));
        params.push(("timestamp", timestamp.to_string()));
        let query = encode_params(&params);
        let signature = signer.sign(&query)?;
        Ok(format!("{}&signature={}", query, signature))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: Params,
        signed: bool,
    ) -> Result<T, ExchangeError> {
        let query = if signed {
            self.signed_query(params, chrono::Utc::now().timestamp_millis())?
        } else {
            encode_params(&params)
        };

        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        if !query.is_empty() {
            url.set_query(Some(&query));
        }

        debug!("{} {}", method, path);
        let mut request = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = error_from_body(status.as_u16(), &body);
            warn!("{} failed: {}", path, err);
            return Err(err);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn encode_params(params: &[(&str, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
        .finish()
}

/// Map a failed response to an error, preferring the exchange's `{code, msg}` body.
fn error_from_body(status: u16, body: &str) -> ExchangeError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(api) => ExchangeError::from_api_code(api.code, api.msg),
        Err(_) => ExchangeError::HttpStatus {
            status,
            message: body.chars().take(200).collect(),
        },
    }
}

// ====================================================================
// COLLABORATOR TRAITS
// ====================================================================

#[async_trait]
impl SymbolRulesSource for BinanceClient {
    async fn exchange_filters(&self, symbol: &str) -> Result<Option<SymbolFilterSet>, ExchangeError> {
        match self.exchange_info(Some(symbol)).await {
            Ok(info) => Ok(info.symbol(symbol).and_then(|s| s.filter_set())),
            Err(err) if err.is_unknown_symbol() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn current_price(&self, symbol: &str) -> Result<Option<Decimal>, ExchangeError> {
        match self.ticker_price(symbol).await {
            Ok(ticker) => Ok(Some(ticker.price)),
            Err(err) if err.is_unknown_symbol() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl AccountSource for BinanceClient {
    async fn account_info(&self) -> Result<AccountInfo, ExchangeError> {
        self.get_account_info().await
    }

    async fn open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>, ExchangeError> {
        self.get_open_orders(symbol).await
    }

    async fn all_tickers(&self) -> Result<Vec<Ticker>, ExchangeError> {
        self.tickers().await
    }
}

#[async_trait]
impl OrderGateway for BinanceClient {
    async fn place_market_order(&self, symbol: &str, side: OrderSide, quantity: Decimal) -> Result<Order, ExchangeError> {
        self.market_order(symbol, side, quantity).await
    }

    async fn place_limit_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<Order, ExchangeError> {
        self.limit_order(symbol, side, quantity, price).await
    }

    async fn place_trigger_order(
        &self,
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Option<Decimal>,
    ) -> Result<Order, ExchangeError> {
        self.trigger_order(symbol, side, order_type, quantity, stop_price, limit_price)
            .await
    }

    async fn place_oco_order(
        &self,
        symbol: &str,
        quantity: Decimal,
        limit_price: Decimal,
        stop_price: Decimal,
    ) -> Result<OcoOrder, ExchangeError> {
        self.oco_order(symbol, quantity, limit_price, stop_price).await
    }

    async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<Order, ExchangeError> {
        self.cancel(symbol, order_id).await
    }

    async fn cancel_oco_order(&self, symbol: &str, order_list_id: i64) -> Result<OcoOrder, ExchangeError> {
        self.cancel_oco(symbol, order_list_id).await
    }
}

#[async_trait]
impl MarketDataProvider for BinanceClient {
    async fn klines(&self, symbol: &str, interval: &str, limit: u16) -> Result<Vec<Kline>, ExchangeError> {
        self.get_klines(symbol, interval, limit).await
    }
}

fn trigger_order_params(
    symbol: &str,
    side: OrderSide,
    order_type: OrderType,
    quantity: Decimal,
    stop_price: Decimal,
    limit_price: Option<Decimal>,
) -> Result<Params, ExchangeError> {
    let mut params: Params = vec![
        ("symbol", symbol.to_uppercase()),
        ("side", side.as_str().to_string()),
        ("type", order_type.as_str().to_string()),
        ("quantity", format_decimal(quantity)),
        ("stopPrice", format_decimal(stop_price)),
    ];
    match (order_type, limit_price) {
        (OrderType::StopLoss | OrderType::TakeProfit, None) => {}
        (OrderType::StopLossLimit | OrderType::TakeProfitLimit, Some(price)) => {
            params.push(("price", format_decimal(price)));
            params.push(("timeInForce", "GTC".to_string()));
        }
        (other, _) => {
            return Err(ExchangeError::from_api_code(
                -1116,
                format!("{} is not a trigger order type for the given prices", other),
            ))
        }
    }
    Ok(params)
}
