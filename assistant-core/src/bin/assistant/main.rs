// assistant-core/src/bin/assistant/main.rs
// crypto-assistant: balances, market data, order checks and placement from the terminal

mod modules;

use anyhow::{Context, Result};
use assistant_core::config::{Credentials, Settings};
use assistant_core::exchange::BinanceClient;
use assistant_core::service::FilterCache;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use modules::{account, market, orders};

#[derive(Parser)]
#[command(name = "crypto-assistant")]
#[command(author, version, about = "Spot trading assistant with exchange-filter checks", long_about = None)]
struct Cli {
    /// Log at DEBUG level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file, defaults to ./assistant.toml when present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Balances valued in USD, largest first
    Balance(account::BalanceArgs),

    /// Latest price for one or more symbols
    Price(market::PriceArgs),

    /// Open orders, optionally for a single symbol
    Orders(orders::OrdersArgs),

    /// Recent fills for a symbol
    History(account::HistoryArgs),

    /// Score how well open SELL orders protect each holding
    Protection(account::ProtectionArgs),

    /// LOT_SIZE requirements and example quantities
    Lotsize(market::LotSizeArgs),

    /// EMA / RSI / MACD and swing-low support on daily candles
    Indicators(market::IndicatorArgs),

    /// Check an order against the exchange filters without placing it
    Validate(orders::ValidateArgs),

    /// Preflight, align and submit an order
    #[command(subcommand)]
    Place(orders::PlaceCommands),

    /// Cancel an order or an OCO list
    #[command(subcommand)]
    Cancel(orders::CancelCommands),

    /// Exchange connectivity, clock drift and credential status
    Status,
}

/// Shared handles for every command.
pub struct App {
    pub settings: Settings,
    pub client: Arc<BinanceClient>,
    pub filters: Arc<FilterCache>,
}

impl App {
    fn new(settings: Settings) -> Result<Self> {
        let credentials = Credentials::from_env();
        if credentials.is_none() {
            debug!("No API credentials found, signed endpoints are unavailable");
        }
        let client = Arc::new(
            BinanceClient::new(&settings.exchange, credentials).context("failed to build exchange client")?,
        );
        let filters = Arc::new(FilterCache::new(client.clone()));
        Ok(Self {
            settings,
            client,
            filters,
        })
    }
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let settings = Settings::new(cli.config.as_deref()).context("failed to load settings")?;
    let app = App::new(settings)?;

    match cli.command {
        Commands::Balance(args) => account::balance(&app, args).await,
        Commands::Price(args) => market::price(&app, args).await,
        Commands::Orders(args) => orders::open_orders(&app, args).await,
        Commands::History(args) => account::history(&app, args).await,
        Commands::Protection(args) => account::protection(&app, args).await,
        Commands::Lotsize(args) => market::lot_size(&app, args).await,
        Commands::Indicators(args) => market::indicators(&app, args).await,
        Commands::Validate(args) => orders::validate(&app, args).await,
        Commands::Place(cmd) => orders::place(&app, cmd).await,
        Commands::Cancel(cmd) => orders::cancel(&app, cmd).await,
        Commands::Status => market::status(&app).await,
    }
}
