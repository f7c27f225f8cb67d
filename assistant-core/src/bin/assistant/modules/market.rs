// assistant-core/src/bin/assistant/modules/market.rs

use anyhow::{Context, Result};
use assistant_core::exchange::utils::validate_symbol;
use assistant_core::service::{IndicatorService, OrderValidator};
use chrono::{TimeZone, Utc};
use clap::Args;
use std::process::ExitCode;

use crate::App;

#[derive(Args)]
pub struct PriceArgs {
    #[arg(required = true)]
    pub symbols: Vec<String>,
}

#[derive(Args)]
pub struct LotSizeArgs {
    pub symbol: String,
}

#[derive(Args)]
pub struct IndicatorArgs {
    /// Coins without the quote asset, e.g. BTC ETH SOL
    #[arg(required = true)]
    pub coins: Vec<String>,
}

pub async fn status(app: &App) -> Result<ExitCode> {
    let server_time = app
        .client
        .server_time()
        .await
        .context("exchange is unreachable")?;
    let drift_ms = Utc::now().timestamp_millis() - server_time;

    match Utc.timestamp_millis_opt(server_time).single() {
        Some(t) => println!("✅ {} reachable, server time {}", app.settings.exchange.base_url, t.to_rfc3339()),
        None => println!("✅ {} reachable, server time {} ms", app.settings.exchange.base_url, server_time),
    }
    println!("   Local clock drift: {} ms", drift_ms);
    if drift_ms.unsigned_abs() > app.settings.exchange.recv_window_ms {
        println!("   ⚠️ Drift exceeds recvWindow ({} ms), signed requests will be rejected", app.settings.exchange.recv_window_ms);
    }
    if app.client.has_credentials() {
        println!("   API credentials: configured");
    } else {
        println!("   API credentials: missing (set BINANCE_API_KEY / BINANCE_API_SECRET)");
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn price(app: &App, args: PriceArgs) -> Result<ExitCode> {
    let mut code = ExitCode::SUCCESS;
    for raw in &args.symbols {
        let symbol = validate_symbol(raw)?;
        match app.client.ticker_price(&symbol).await {
            Ok(ticker) => println!("{:<12} {}", ticker.symbol, ticker.price.normalize()),
            Err(e) => {
                eprintln!("❌ {}: {}", symbol, e);
                code = ExitCode::FAILURE;
            }
        }
    }
    Ok(code)
}

pub async fn lot_size(app: &App, args: LotSizeArgs) -> Result<ExitCode> {
    let symbol = validate_symbol(&args.symbol)?;
    let validator = OrderValidator::new(app.filters.clone());
    match validator.lot_size_info(&symbol).await {
        Some(info) => {
            println!("{}", info);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("❌ No LOT_SIZE filter available for {}", symbol);
            Ok(ExitCode::FAILURE)
        }
    }
}

pub async fn indicators(app: &App, args: IndicatorArgs) -> Result<ExitCode> {
    let service = IndicatorService::new(
        app.client.clone(),
        app.settings.analysis.clone(),
        &app.settings.cli,
    )
    .context("invalid indicator settings")?;

    let results = service.analyze_coins(&args.coins).await;
    if results.is_empty() {
        eprintln!("❌ No indicator data for {}", args.coins.join(", "));
        return Ok(ExitCode::FAILURE);
    }

    for r in &results {
        let s = &r.snapshot;
        println!("📈 {} ({})", r.coin, r.symbol);
        println!("   Price: {}", s.price.normalize());
        match s.rsi {
            Some(rsi) => println!("   RSI({}): {:.2}", app.settings.analysis.rsi_period, rsi),
            None => println!("   RSI({}): n/a", app.settings.analysis.rsi_period),
        }
        for (period, value) in &s.emas {
            println!("   EMA({}): {}", period, value.round_dp(8).normalize());
        }
        if let Some(macd) = &s.macd {
            let fmt = |v: Option<rust_decimal::Decimal>| {
                v.map(|v| v.round_dp(8).normalize().to_string())
                    .unwrap_or_else(|| "n/a".to_string())
            };
            println!(
                "   MACD: {}  signal: {}  histogram: {}",
                macd.macd.round_dp(8).normalize(),
                fmt(macd.signal),
                fmt(macd.histogram)
            );
        }
        if s.support_levels.is_empty() {
            println!("   Support: none in recent candles");
        } else {
            let levels: Vec<String> = s.support_levels.iter().map(|l| l.normalize().to_string()).collect();
            println!("   Support: {}", levels.join(", "));
        }
    }
    Ok(ExitCode::SUCCESS)
}
