// assistant-core/src/bin/assistant/modules/account.rs

use anyhow::{Context, Result};
use assistant_core::exchange::utils::validate_symbol;
use assistant_core::service::AccountService;
use chrono::{TimeZone, Utc};
use clap::Args;
use rust_decimal::Decimal;
use std::process::ExitCode;

use crate::App;

#[derive(Args)]
pub struct BalanceArgs {
    /// Hide balances worth less than this many USD
    #[arg(long)]
    pub min_value: Option<Decimal>,

    /// Show what is spendable for one asset instead of the portfolio
    #[arg(long)]
    pub asset: Option<String>,
}

#[derive(Args)]
pub struct ProtectionArgs {
    /// Ignore holdings worth less than this many USD
    #[arg(long)]
    pub min_value: Option<Decimal>,
}

#[derive(Args)]
pub struct HistoryArgs {
    pub symbol: String,

    /// Number of fills to fetch
    #[arg(short, long)]
    pub limit: Option<u16>,
}

pub async fn balance(app: &App, args: BalanceArgs) -> Result<ExitCode> {
    let service = AccountService::new(app.client.clone());

    if let Some(asset) = args.asset {
        let balance = service
            .effective_available_balance(&asset)
            .await
            .with_context(|| format!("failed to load {} balance", asset))?;
        println!("💰 {}", balance.asset);
        println!("   Available: {}", balance.available.normalize());
        println!("   Locked:    {}", balance.locked.normalize());
        println!("   Open BUY orders (quote value): {}", balance.commitments.buy_orders.normalize());
        println!("   Open SELL orders:              {}", balance.commitments.sell_orders.normalize());
        println!("   Open OCO lists:                {}", balance.commitments.oco_orders.normalize());
        return Ok(ExitCode::SUCCESS);
    }

    let min_value = args.min_value.unwrap_or(app.settings.cli.account_min_value);
    let summary = service
        .portfolio(min_value)
        .await
        .context("failed to load account balances")?;

    if summary.balances.is_empty() {
        println!("No balances worth at least ${}", min_value.normalize());
        return Ok(ExitCode::SUCCESS);
    }

    println!("{:<8} {:>18} {:>18} {:>14}", "ASSET", "FREE", "LOCKED", "VALUE (USD)");
    for b in &summary.balances {
        println!(
            "{:<8} {:>18} {:>18} {:>14}",
            b.asset,
            b.free.normalize().to_string(),
            b.locked.normalize().to_string(),
            format!("{:.2}", b.value_usd)
        );
    }
    println!("Total: ${:.2}", summary.total_value);
    Ok(ExitCode::SUCCESS)
}

pub async fn history(app: &App, args: HistoryArgs) -> Result<ExitCode> {
    let symbol = validate_symbol(&args.symbol)?;
    let limit = args.limit.unwrap_or(app.settings.cli.history_limit);
    let trades = app
        .client
        .trade_history(&symbol, limit)
        .await
        .with_context(|| format!("failed to load trade history for {}", symbol))?;

    if trades.is_empty() {
        println!("No trades for {}", symbol);
        return Ok(ExitCode::SUCCESS);
    }

    for trade in &trades {
        let when = Utc
            .timestamp_millis_opt(trade.time)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| trade.time.to_string());
        println!(
            "{}  {:<4} {} @ {}  (fee {} {}){}",
            when,
            trade.side(),
            trade.qty.normalize(),
            trade.price.normalize(),
            trade.commission.normalize(),
            trade.commission_asset,
            if trade.is_maker { "  maker" } else { "" }
        );
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn protection(app: &App, args: ProtectionArgs) -> Result<ExitCode> {
    let service = AccountService::new(app.client.clone());
    let min_value = args.min_value.unwrap_or(app.settings.cli.account_min_value);
    let protection = service
        .protection(min_value, &app.settings.cli.quote_asset)
        .await
        .context("failed to analyze open-order protection")?;

    if protection.positions.is_empty() {
        println!("No positions large enough to score");
        return Ok(ExitCode::SUCCESS);
    }

    for p in &protection.positions {
        println!("🛡️ {}", p);
        if p.protective_orders > 0 {
            println!(
                "   Proximity {}/50, coverage {}/30, levels {}/20 -> {}",
                p.proximity_score,
                p.coverage_score,
                p.diversification_score,
                p.recommendation()
            );
        }
    }
    println!("{}", protection.summary());
    Ok(ExitCode::SUCCESS)
}
