// service/market_data.rs
// Daily-candle indicators per coin

use assistant_common::analysis::{analyze, AnalysisParams, IndicatorSnapshot};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::errors::ServiceError;
use crate::config::CliSettings;
use crate::exchange::traits::MarketDataProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoinIndicators {
    pub coin: String,
    pub symbol: String,
    pub snapshot: IndicatorSnapshot,
}

pub struct IndicatorService {
    provider: Arc<dyn MarketDataProvider>,
    params: AnalysisParams,
    quote_asset: String,
    interval: String,
    limit: u16,
}

impl IndicatorService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        params: AnalysisParams,
        cli: &CliSettings,
    ) -> Result<Self, ServiceError> {
        params.validate().map_err(ServiceError::Config)?;
        if (cli.kline_limit as usize) < params.min_data_points {
            return Err(ServiceError::Config(format!(
                "kline_limit {} is below min_data_points {}",
                cli.kline_limit, params.min_data_points
            )));
        }

        Ok(Self {
            provider,
            params,
            quote_asset: cli.quote_asset.to_uppercase(),
            interval: cli.kline_interval.clone(),
            limit: cli.kline_limit,
        })
    }

    /// `Ok(None)` when the market exists but has too little history.
    pub async fn analyze_coin(&self, coin: &str) -> Result<Option<CoinIndicators>, ServiceError> {
        let coin = coin.trim().to_uppercase();
        let symbol = format!("{}{}", coin, self.quote_asset);

        let klines = self.provider.klines(&symbol, &self.interval, self.limit).await?;
        let closes: Vec<Decimal> = klines.iter().map(|k| k.close).collect();
        let lows: Vec<Decimal> = klines.iter().map(|k| k.low).collect();
        debug!("Fetched {} {} candle(s) for {}", closes.len(), self.interval, symbol);

        Ok(analyze(&closes, &lows, &self.params).map(|snapshot| CoinIndicators {
            coin,
            symbol,
            snapshot,
        }))
    }

    /// Analyze every coin, skipping the ones without usable data.
    pub async fn analyze_coins(&self, coins: &[String]) -> Vec<CoinIndicators> {
        let mut results = Vec::with_capacity(coins.len());
        for coin in coins {
            match self.analyze_coin(coin).await {
                Ok(Some(indicators)) => results.push(indicators),
                Ok(None) => warn!("Skipping {}: not enough history", coin),
                Err(e) => warn!("Skipping {}: {}", coin, e),
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{daily_klines, MockExchange};
    use rust_decimal_macros::dec;

    fn cli(kline_limit: u16) -> CliSettings {
        CliSettings {
            account_min_value: dec!(10),
            history_limit: 100,
            kline_interval: "1d".to_string(),
            kline_limit,
            quote_asset: "usdt".to_string(),
        }
    }

    fn rising(n: i64) -> Vec<Decimal> {
        (1..=n).map(Decimal::from).collect()
    }

    #[tokio::test]
    async fn test_analyze_coin_uses_quote_suffix() {
        let exchange = MockExchange::new().with_klines("ETHUSDT", daily_klines(&rising(60)));
        let service = IndicatorService::new(Arc::new(exchange), AnalysisParams::default(), &cli(200)).unwrap();

        let result = service.analyze_coin("eth").await.unwrap().unwrap();
        assert_eq!(result.coin, "ETH");
        assert_eq!(result.symbol, "ETHUSDT");
        assert_eq!(result.snapshot.price, dec!(60));
        assert_eq!(result.snapshot.rsi, Some(dec!(100)));
        assert!(result.snapshot.support_levels.is_empty());
    }

    #[tokio::test]
    async fn test_support_levels_come_from_candle_lows() {
        let mut klines = daily_klines(&vec![dec!(100); 60]);
        klines[40].low = dec!(92.5);
        klines[50].low = dec!(95);
        let exchange = MockExchange::new().with_klines("SOLUSDT", klines);
        let service = IndicatorService::new(Arc::new(exchange), AnalysisParams::default(), &cli(200)).unwrap();

        let result = service.analyze_coin("SOL").await.unwrap().unwrap();
        assert_eq!(result.snapshot.support_levels, vec![dec!(92.5), dec!(95)]);
    }

    #[tokio::test]
    async fn test_analyze_coins_skips_unavailable() {
        let exchange = MockExchange::new()
            .with_klines("ETHUSDT", daily_klines(&rising(60)))
            .with_klines("NEWUSDT", daily_klines(&rising(5)));
        let service = IndicatorService::new(Arc::new(exchange), AnalysisParams::default(), &cli(200)).unwrap();

        let coins = vec!["ETH".to_string(), "NEW".to_string(), "GONE".to_string()];
        let results = service.analyze_coins(&coins).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].coin, "ETH");
    }

    #[tokio::test]
    async fn test_only_latest_candles_requested() {
        let exchange = MockExchange::new().with_klines("ETHUSDT", daily_klines(&rising(300)));
        let service = IndicatorService::new(Arc::new(exchange), AnalysisParams::default(), &cli(50)).unwrap();

        let result = service.analyze_coin("ETH").await.unwrap().unwrap();
        assert_eq!(result.snapshot.price, dec!(300));
    }

    #[test]
    fn test_rejects_inconsistent_settings() {
        let provider: Arc<dyn MarketDataProvider> = Arc::new(MockExchange::new());
        assert!(matches!(
            IndicatorService::new(provider.clone(), AnalysisParams::default(), &cli(10)),
            Err(ServiceError::Config(_))
        ));

        let bad = AnalysisParams {
            rsi_period: 0,
            ..AnalysisParams::default()
        };
        assert!(IndicatorService::new(provider, bad, &cli(200)).is_err());
    }
}
