// assistant-core/src/bin/assistant/modules/orders.rs

use anyhow::Result;
use assistant_common::{OrderSide, OrderType, ProposedOrder, TriggerKind};
use assistant_core::service::{
    CancelOutcome, CancelTarget, OrderService, OrderValidator, PlacementOutcome, ServiceError,
};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use std::process::ExitCode;

use crate::App;

#[derive(Args)]
pub struct OrdersArgs {
    pub symbol: Option<String>,
}

#[derive(Args)]
pub struct ValidateArgs {
    pub symbol: String,
    /// BUY or SELL
    pub side: OrderSide,
    pub quantity: Decimal,

    /// Limit price (take-profit price for OCO)
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Stop price; turns the order into an OCO unless --type says otherwise
    #[arg(long)]
    pub stop_price: Option<Decimal>,

    /// Explicit order type, e.g. stop-loss-limit or take-profit
    #[arg(long = "type")]
    pub order_type: Option<OrderType>,
}

/// Trigger orders without a limit price execute at market once triggered.
#[derive(Args)]
pub struct TriggerArgs {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    #[arg(long)]
    pub stop_price: Decimal,
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct TriggerLimitArgs {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    #[arg(long)]
    pub stop_price: Decimal,
    /// Limit price of the order placed once the stop triggers
    #[arg(long)]
    pub price: Decimal,
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum PlaceCommands {
    /// Market order at the best available price
    Market {
        symbol: String,
        side: OrderSide,
        quantity: Decimal,
        /// Run every check and print the aligned order without submitting
        #[arg(long)]
        dry_run: bool,
    },

    /// Good-till-cancelled limit order
    Limit {
        symbol: String,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
        #[arg(long)]
        dry_run: bool,
    },

    /// SELL take-profit limit above market plus stop-loss below it
    Oco {
        symbol: String,
        quantity: Decimal,
        #[arg(long)]
        limit_price: Decimal,
        #[arg(long)]
        stop_price: Decimal,
        #[arg(long)]
        dry_run: bool,
    },

    /// Market order once the price moves against the position to --stop-price
    StopLoss(TriggerArgs),

    /// Limit order at --price once the price moves against the position to --stop-price
    StopLossLimit(TriggerLimitArgs),

    /// Market order once the price moves in favour of the position to --stop-price
    TakeProfit(TriggerArgs),

    /// Limit order at --price once the price moves in favour of the position to --stop-price
    TakeProfitLimit(TriggerLimitArgs),
}

fn trigger(kind: TriggerKind, args: TriggerArgs) -> (ProposedOrder, bool) {
    let order = ProposedOrder::trigger(&args.symbol, args.side, kind, args.quantity, args.stop_price, None);
    (order, args.dry_run)
}

fn trigger_limit(kind: TriggerKind, args: TriggerLimitArgs) -> (ProposedOrder, bool) {
    let order = ProposedOrder::trigger(
        &args.symbol,
        args.side,
        kind,
        args.quantity,
        args.stop_price,
        Some(args.price),
    );
    (order, args.dry_run)
}

#[derive(Subcommand)]
pub enum CancelCommands {
    Order { symbol: String, order_id: u64 },
    Oco { symbol: String, order_list_id: i64 },
}

fn order_service(app: &App) -> OrderService {
    OrderService::new(app.filters.clone(), app.client.clone(), app.client.clone())
}

fn print_errors(header: &str, errors: &[String]) {
    eprintln!("❌ {}", header);
    for e in errors {
        eprintln!("   - {}", e);
    }
}

pub async fn open_orders(app: &App, args: OrdersArgs) -> Result<ExitCode> {
    let orders = order_service(app).open_orders(args.symbol.as_deref()).await?;
    if orders.is_empty() {
        println!("No open orders");
        return Ok(ExitCode::SUCCESS);
    }

    for o in &orders {
        let price = o.price.filter(|p| !p.is_zero()).map(|p| p.normalize().to_string());
        let stop = o.stop_price.filter(|p| !p.is_zero()).map(|p| format!(" stop {}", p.normalize()));
        println!(
            "#{:<12} {:<10} {:<4} {:<16} {} @ {}{}{}",
            o.order_id,
            o.symbol,
            o.side,
            o.order_type.as_str(),
            o.remaining_qty().normalize(),
            price.unwrap_or_else(|| "market".to_string()),
            stop.unwrap_or_default(),
            if o.is_oco_leg() { format!("  [OCO list {}]", o.order_list_id) } else { String::new() }
        );
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn validate(app: &App, args: ValidateArgs) -> Result<ExitCode> {
    let validator = OrderValidator::new(app.filters.clone());
    let result = match args.order_type {
        Some(order_type) => {
            match ProposedOrder::with_type(&args.symbol, args.side, order_type, args.quantity, args.price, args.stop_price) {
                Ok(order) => validator.validate_order(&order).await,
                Err(msg) => {
                    print_errors("Invalid order:", &[msg]);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        None => {
            validator
                .validate(&args.symbol, args.side, args.quantity, args.price, args.stop_price)
                .await
        }
    };

    if result.is_valid() {
        println!("✅ Order passes all exchange filters");
        return Ok(ExitCode::SUCCESS);
    }
    print_errors("Order would be rejected:", result.errors());
    Ok(ExitCode::FAILURE)
}

pub async fn place(app: &App, cmd: PlaceCommands) -> Result<ExitCode> {
    let (order, dry_run) = match cmd {
        PlaceCommands::Market {
            symbol,
            side,
            quantity,
            dry_run,
        } => (ProposedOrder::market(&symbol, side, quantity), dry_run),
        PlaceCommands::Limit {
            symbol,
            side,
            quantity,
            price,
            dry_run,
        } => (ProposedOrder::limit(&symbol, side, quantity, price), dry_run),
        PlaceCommands::Oco {
            symbol,
            quantity,
            limit_price,
            stop_price,
            dry_run,
        } => (ProposedOrder::oco(&symbol, quantity, limit_price, stop_price), dry_run),
        PlaceCommands::StopLoss(args) => trigger(TriggerKind::StopLoss, args),
        PlaceCommands::StopLossLimit(args) => trigger_limit(TriggerKind::StopLoss, args),
        PlaceCommands::TakeProfit(args) => trigger(TriggerKind::TakeProfit, args),
        PlaceCommands::TakeProfitLimit(args) => trigger_limit(TriggerKind::TakeProfit, args),
    };

    match order_service(app).place(&order, dry_run).await {
        Ok(PlacementOutcome::DryRun(aligned)) => {
            println!("🧪 Dry run, all checks passed. Would submit: {}", aligned);
        }
        Ok(PlacementOutcome::Placed { order, response }) => {
            println!("✅ Placed {} (order #{}, status {})", order, response.order_id, response.status);
        }
        Ok(PlacementOutcome::PlacedOco { order, response }) => {
            let legs: Vec<String> = response.orders.iter().map(|l| format!("#{}", l.order_id)).collect();
            println!(
                "✅ Placed {} (OCO list {}, legs {})",
                order,
                response.order_list_id,
                legs.join(", ")
            );
        }
        Err(ServiceError::Rejected { symbol, errors }) => {
            print_errors(&format!("Order for {} rejected:", symbol), &errors);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn cancel(app: &App, cmd: CancelCommands) -> Result<ExitCode> {
    let (symbol, target) = match cmd {
        CancelCommands::Order { symbol, order_id } => (symbol, CancelTarget::Order(order_id)),
        CancelCommands::Oco {
            symbol,
            order_list_id,
        } => (symbol, CancelTarget::OcoList(order_list_id)),
    };

    match order_service(app).cancel(&symbol, target).await? {
        CancelOutcome::Order(order) => {
            println!("✅ Cancelled order #{} on {} ({})", order.order_id, order.symbol, order.status)
        }
        CancelOutcome::OcoList(list) => println!(
            "✅ Cancelled OCO list {} on {} ({} leg(s))",
            list.order_list_id,
            list.symbol,
            list.orders.len()
        ),
    }
    Ok(ExitCode::SUCCESS)
}
