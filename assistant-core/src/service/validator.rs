// service/validator.rs
// Exchange filter validation for proposed orders

use assistant_common::filters::{decimal_places, floor_to_step, is_on_grid, round_to_tick, GridError};
use assistant_common::{
    LotSizeFilter, NotionalFilter, OrderPricing, OrderSide, PercentPriceBySide, PriceField, PriceFilter,
    ProposedOrder, SymbolFilterSet, TriggerKind, ValidationResult,
};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::filter_cache::FilterCache;

pub const UNRESOLVABLE: &str = "Could not retrieve symbol information or current price";

/// Pure filter evaluation. Every violated rule is reported, none short-circuits.
pub struct FilterValidator;

impl FilterValidator {
    /// Check `order` against `filters` with `current_price` as the reference.
    ///
    /// Decimal overflow anywhere collapses the result into a single
    /// `"Validation error: ..."` entry.
    pub fn check(filters: &SymbolFilterSet, current_price: Decimal, order: &ProposedOrder) -> ValidationResult {
        let mut errors = Vec::new();
        match collect_violations(filters, current_price, order, &mut errors) {
            Ok(()) => ValidationResult::from_errors(errors),
            Err(e) => ValidationResult::failure(format!("Validation error: {}", e)),
        }
    }
}

fn collect_violations(
    filters: &SymbolFilterSet,
    current_price: Decimal,
    order: &ProposedOrder,
    errors: &mut Vec<String>,
) -> Result<(), GridError> {
    if order.quantity <= Decimal::ZERO {
        errors.push(format!(
            "Quantity {} must be greater than zero",
            order.quantity.normalize()
        ));
    }

    match order.pricing {
        OrderPricing::Oco {
            limit_price,
            stop_price,
        } => check_oco_ordering(limit_price, stop_price, current_price, errors),
        OrderPricing::Trigger { kind, stop_price, .. } => {
            check_trigger_direction(order, kind, stop_price, current_price, errors)
        }
        OrderPricing::Market | OrderPricing::Limit { .. } => {}
    }

    if let Some(lot) = &filters.lot_size {
        check_lot_size(lot, order.quantity, errors)?;
    }

    // MARKET orders carry no price fields, so only the lot size applies.
    let prices = order.prices();
    if prices.is_empty() {
        return Ok(());
    }

    if let Some(pf) = &filters.price_filter {
        check_price_filter(pf, &prices, errors)?;
    }
    if let Some(band) = &filters.percent_price_by_side {
        check_percent_price(band, order.side, current_price, &prices, errors)?;
    }
    if let Some(notional) = &filters.notional {
        check_notional(notional, order.quantity, &prices, errors)?;
    }
    Ok(())
}

fn check_lot_size(lot: &LotSizeFilter, quantity: Decimal, errors: &mut Vec<String>) -> Result<(), GridError> {
    if quantity < lot.min_qty {
        errors.push(format!(
            "QUANTITY TOO SMALL: {} below minimum {} (exchange requirement)",
            quantity.normalize(),
            lot.min_qty.normalize()
        ));
    }
    if let Some(max_qty) = lot.max_qty.filter(|m| *m > Decimal::ZERO) {
        if quantity > max_qty {
            errors.push(format!(
                "QUANTITY TOO LARGE: {} above maximum {} (exchange requirement)",
                quantity.normalize(),
                max_qty.normalize()
            ));
        }
    }
    if lot.step_size > Decimal::ZERO && !is_on_grid(quantity, lot.min_qty, lot.step_size)? {
        let places = decimal_places(lot.step_size);
        let suggested = floor_to_step(quantity, lot.min_qty, lot.step_size)?;
        errors.push(format!(
            "PRECISION ERROR: Quantity {} not aligned with step size {} ({} decimal places). SUGGESTED: {:.*}",
            quantity.normalize(),
            lot.step_size.normalize(),
            places,
            places as usize,
            suggested
        ));
    }
    Ok(())
}

fn check_price_filter(pf: &PriceFilter, prices: &[(PriceField, Decimal)], errors: &mut Vec<String>) -> Result<(), GridError> {
    for (field, price) in prices {
        if pf.min_price > Decimal::ZERO && *price < pf.min_price {
            errors.push(format!(
                "{} {} below minimum {}",
                field,
                price.normalize(),
                pf.min_price.normalize()
            ));
        }
        if pf.max_price > Decimal::ZERO && *price > pf.max_price {
            errors.push(format!(
                "{} {} above maximum {}",
                field,
                price.normalize(),
                pf.max_price.normalize()
            ));
        }
        if pf.tick_size > Decimal::ZERO && !is_on_grid(*price, Decimal::ZERO, pf.tick_size)? {
            let nearest = round_to_tick(*price, pf.tick_size)?;
            errors.push(format!(
                "{} {} not aligned with tick size {}. SUGGESTED: {}",
                field,
                price.normalize(),
                pf.tick_size.normalize(),
                nearest.normalize()
            ));
        }
    }
    Ok(())
}

fn check_oco_ordering(limit_price: Decimal, stop_price: Decimal, current_price: Decimal, errors: &mut Vec<String>) {
    if limit_price <= current_price {
        errors.push(format!(
            "OCO limit price {} must be ABOVE current price {}",
            limit_price.normalize(),
            current_price.normalize()
        ));
    }
    if stop_price >= current_price {
        errors.push(format!(
            "OCO stop price {} must be BELOW current price {}",
            stop_price.normalize(),
            current_price.normalize()
        ));
    }
    if limit_price <= stop_price {
        errors.push(format!(
            "OCO limit price {} must be ABOVE stop price {}",
            limit_price.normalize(),
            stop_price.normalize()
        ));
    }
}

/// A stop already on the wrong side of the market would fire on arrival.
fn check_trigger_direction(
    order: &ProposedOrder,
    kind: TriggerKind,
    stop_price: Decimal,
    current_price: Decimal,
    errors: &mut Vec<String>,
) {
    let must_be_above = matches!(
        (kind, order.side),
        (TriggerKind::StopLoss, OrderSide::Buy) | (TriggerKind::TakeProfit, OrderSide::Sell)
    );
    let wrong_side = if must_be_above {
        stop_price <= current_price
    } else {
        stop_price >= current_price
    };
    if wrong_side {
        errors.push(format!(
            "{} {} stop price {} must be {} current price {}",
            order.order_type(),
            order.side,
            stop_price.normalize(),
            if must_be_above { "ABOVE" } else { "BELOW" },
            current_price.normalize()
        ));
    }
}

fn check_percent_price(
    band: &PercentPriceBySide,
    side: OrderSide,
    current_price: Decimal,
    prices: &[(PriceField, Decimal)],
    errors: &mut Vec<String>,
) -> Result<(), GridError> {
    let (up, down) = match side {
        OrderSide::Buy => (band.bid_multiplier_up, band.bid_multiplier_down),
        OrderSide::Sell => (band.ask_multiplier_up, band.ask_multiplier_down),
    };
    let max_allowed = current_price
        .checked_mul(up)
        .ok_or(GridError::Overflow("percent price ceiling"))?;
    let min_allowed = current_price
        .checked_mul(down)
        .ok_or(GridError::Overflow("percent price floor"))?;

    for (field, price) in prices {
        if *price > max_allowed {
            errors.push(format!(
                "{} {} above {} limit {} ({}x current)",
                field,
                price.normalize(),
                side,
                max_allowed.normalize(),
                up.normalize()
            ));
        }
        if *price < min_allowed {
            errors.push(format!(
                "{} {} below {} limit {} ({}x current)",
                field,
                price.normalize(),
                side,
                min_allowed.normalize(),
                down.normalize()
            ));
        }
    }
    Ok(())
}

fn check_notional(
    filter: &NotionalFilter,
    quantity: Decimal,
    prices: &[(PriceField, Decimal)],
    errors: &mut Vec<String>,
) -> Result<(), GridError> {
    let max_notional = filter.max_notional.filter(|m| *m > Decimal::ZERO);
    for (field, price) in prices {
        let notional = quantity
            .checked_mul(*price)
            .ok_or(GridError::Overflow("notional"))?;
        if filter.min_notional > Decimal::ZERO && notional < filter.min_notional {
            errors.push(format!(
                "Notional {} at {} {} below minimum {}",
                notional.normalize(),
                field.label().to_lowercase(),
                price.normalize(),
                filter.min_notional.normalize()
            ));
        }
        if let Some(max) = max_notional {
            if notional > max {
                errors.push(format!(
                    "Notional {} at {} {} above maximum {}",
                    notional.normalize(),
                    field.label().to_lowercase(),
                    price.normalize(),
                    max.normalize()
                ));
            }
        }
    }
    Ok(())
}

/// Human-readable LOT_SIZE summary for a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotSizeInfo {
    pub symbol: String,
    pub step_size: Decimal,
    pub decimal_places: u32,
    pub min_qty: Decimal,
    pub max_qty: Option<Decimal>,
}

impl LotSizeInfo {
    pub fn from_filter(symbol: &str, lot: &LotSizeFilter) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            step_size: lot.step_size,
            decimal_places: decimal_places(lot.step_size),
            min_qty: lot.min_qty,
            max_qty: lot.max_qty,
        }
    }

    /// The first three quantities on the grid.
    pub fn example_quantities(&self) -> Vec<Decimal> {
        (0..3u32)
            .filter_map(|k| {
                self.step_size
                    .checked_mul(Decimal::from(k))
                    .and_then(|offset| offset.checked_add(self.min_qty))
            })
            .map(|q| q.round_dp(self.decimal_places))
            .collect()
    }
}

impl fmt::Display for LotSizeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = self.decimal_places as usize;
        writeln!(f, "{} LOT_SIZE Requirements:", self.symbol)?;
        writeln!(
            f,
            "   Step Size: {} ({} decimal places)",
            self.step_size.normalize(),
            self.decimal_places
        )?;
        writeln!(f, "   Minimum: {}", self.min_qty.normalize())?;
        match self.max_qty {
            Some(max) => writeln!(f, "   Maximum: {}", max.normalize())?,
            None => writeln!(f, "   Maximum: unbounded")?,
        }
        let examples: Vec<String> = self
            .example_quantities()
            .iter()
            .map(|q| format!("{:.*}", places, q))
            .collect();
        write!(f, "   Example Valid Quantities: {}", examples.join(", "))
    }
}

/// Resolves filters and the reference price, then runs [`FilterValidator`].
#[derive(Clone)]
pub struct OrderValidator {
    cache: Arc<FilterCache>,
}

impl OrderValidator {
    pub fn new(cache: Arc<FilterCache>) -> Self {
        Self { cache }
    }

    /// `stop_price` makes the order OCO (needs `price`), `price` alone LIMIT, neither MARKET.
    pub async fn validate(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        price: Option<Decimal>,
        stop_price: Option<Decimal>,
    ) -> ValidationResult {
        match ProposedOrder::from_fields(symbol, side, quantity, price, stop_price) {
            Ok(order) => self.validate_order(&order).await,
            Err(msg) => ValidationResult::failure(msg),
        }
    }

    pub async fn validate_order(&self, order: &ProposedOrder) -> ValidationResult {
        let current_price = self.cache.current_price(&order.symbol).await;
        self.validate_at_price(order, current_price).await
    }

    /// Like [`validate_order`](Self::validate_order) with an already fetched reference price.
    pub async fn validate_at_price(&self, order: &ProposedOrder, current_price: Option<Decimal>) -> ValidationResult {
        let filters = self.cache.get_filters(&order.symbol).await;
        match (filters, current_price) {
            (Some(filters), Some(price)) => {
                let result = FilterValidator::check(&filters, price, order);
                debug!(
                    "Validated {}: {} error(s)",
                    order,
                    result.errors().len()
                );
                result
            }
            _ => ValidationResult::failure(UNRESOLVABLE),
        }
    }

    pub async fn lot_size_info(&self, symbol: &str) -> Option<LotSizeInfo> {
        let filters = self.cache.get_filters(symbol).await?;
        filters
            .lot_size
            .as_ref()
            .map(|lot| LotSizeInfo::from_filter(symbol, lot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ethusdt_filters, MockExchange};
    use rust_decimal_macros::dec;

    fn full_filters() -> SymbolFilterSet {
        SymbolFilterSet {
            lot_size: Some(LotSizeFilter {
                min_qty: dec!(0.0001),
                max_qty: Some(dec!(9000)),
                step_size: dec!(0.0001),
            }),
            price_filter: Some(PriceFilter {
                min_price: dec!(0.01),
                max_price: dec!(1000000),
                tick_size: dec!(0.01),
            }),
            percent_price_by_side: Some(PercentPriceBySide::default()),
            notional: Some(NotionalFilter {
                min_notional: dec!(5),
                max_notional: Some(dec!(9000000)),
            }),
        }
    }

    fn validator_for(exchange: MockExchange) -> (OrderValidator, Arc<MockExchange>) {
        let exchange = Arc::new(exchange);
        let cache = Arc::new(FilterCache::new(exchange.clone()));
        (OrderValidator::new(cache), exchange)
    }

    #[test]
    fn test_ethusdt_oco_passes() {
        let order = ProposedOrder::oco("ETHUSDT", dec!(0.5000), dec!(2600.00), dec!(2400.00));
        let result = FilterValidator::check(&ethusdt_filters(), dec!(2500.00), &order);
        assert!(result.is_valid(), "{:?}", result.errors());
    }

    #[test]
    fn test_ethusdt_swapped_oco_reports_all_orderings() {
        let order = ProposedOrder::oco("ETHUSDT", dec!(0.5000), dec!(2400.00), dec!(2600.00));
        let (ok, errors) = FilterValidator::check(&ethusdt_filters(), dec!(2500.00), &order).into_parts();

        assert!(!ok);
        assert_eq!(
            errors,
            vec![
                "OCO limit price 2400 must be ABOVE current price 2500".to_string(),
                "OCO stop price 2600 must be BELOW current price 2500".to_string(),
                "OCO limit price 2400 must be ABOVE stop price 2600".to_string(),
            ]
        );
    }

    #[test]
    fn test_inverted_oco_names_both_current_relations() {
        let order = ProposedOrder::oco("ETHUSDT", dec!(1), dec!(90), dec!(110));
        let result = FilterValidator::check(&SymbolFilterSet::default(), dec!(100), &order);

        assert!(!result.is_valid());
        assert!(result.errors().len() >= 2);
        assert!(result.errors().iter().any(|e| e.contains("limit price 90 must be ABOVE current price 100")));
        assert!(result.errors().iter().any(|e| e.contains("stop price 110 must be BELOW current price 100")));
    }

    #[test]
    fn test_trigger_direction_per_kind_and_side() {
        let filters = ethusdt_filters();
        let cases = [
            (TriggerKind::StopLoss, OrderSide::Sell, dec!(2400), None),
            (TriggerKind::StopLoss, OrderSide::Buy, dec!(2600), None),
            (TriggerKind::TakeProfit, OrderSide::Sell, dec!(2600), None),
            (TriggerKind::TakeProfit, OrderSide::Buy, dec!(2400), None),
            (
                TriggerKind::StopLoss,
                OrderSide::Sell,
                dec!(2600),
                Some("STOP_LOSS SELL stop price 2600 must be BELOW current price 2500"),
            ),
            (
                TriggerKind::TakeProfit,
                OrderSide::Sell,
                dec!(2500),
                Some("TAKE_PROFIT SELL stop price 2500 must be ABOVE current price 2500"),
            ),
        ];
        for (kind, side, stop, expected) in cases {
            let order = ProposedOrder::trigger("ETHUSDT", side, kind, dec!(0.5), stop, None);
            let errors = FilterValidator::check(&filters, dec!(2500), &order).errors().to_vec();
            match expected {
                None => assert!(errors.is_empty(), "{:?} {}: {:?}", kind, side, errors),
                Some(msg) => assert_eq!(errors, vec![msg.to_string()]),
            }
        }
    }

    #[test]
    fn test_stop_loss_limit_checks_both_prices() {
        let order = ProposedOrder::trigger(
            "ETHUSDT",
            OrderSide::Sell,
            TriggerKind::StopLoss,
            dec!(0.5),
            dec!(2400.005),
            Some(dec!(2390.001)),
        );
        let errors = FilterValidator::check(&ethusdt_filters(), dec!(2500), &order).errors().to_vec();
        assert_eq!(
            errors,
            vec![
                "Price 2390.001 not aligned with tick size 0.01. SUGGESTED: 2390".to_string(),
                "Stop price 2400.005 not aligned with tick size 0.01. SUGGESTED: 2400".to_string(),
            ]
        );
    }

    #[test]
    fn test_tick_at_grid_tolerance_accepts_any_price() {
        // A tick no larger than the on-grid tolerance cannot flag a misaligned price.
        let filters = SymbolFilterSet {
            price_filter: Some(PriceFilter {
                min_price: Decimal::ZERO,
                max_price: Decimal::ZERO,
                tick_size: dec!(0.00000001),
            }),
            ..SymbolFilterSet::default()
        };
        let order = ProposedOrder::limit("SHIBUSDT", OrderSide::Buy, dec!(1000000), dec!(0.000015005));
        let result = FilterValidator::check(&filters, dec!(0.000015), &order);
        assert!(result.is_valid(), "{:?}", result.errors());
    }

    #[test]
    fn test_lot_and_price_violations_both_reported() {
        let order = ProposedOrder::limit("ETHUSDT", OrderSide::Buy, dec!(0.62938), dec!(2680.5555));
        let errors = FilterValidator::check(&ethusdt_filters(), dec!(2700), &order)
            .errors()
            .to_vec();

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            "PRECISION ERROR: Quantity 0.62938 not aligned with step size 0.0001 (4 decimal places). SUGGESTED: 0.6293"
        );
        assert_eq!(
            errors[1],
            "Price 2680.5555 not aligned with tick size 0.01. SUGGESTED: 2680.56"
        );
    }

    #[test]
    fn test_quantity_bounds() {
        let small = ProposedOrder::market("ETHUSDT", OrderSide::Buy, dec!(0.00005));
        let errors = FilterValidator::check(&full_filters(), dec!(2500), &small).errors().to_vec();
        assert!(errors.iter().any(|e| e == "QUANTITY TOO SMALL: 0.00005 below minimum 0.0001 (exchange requirement)"));

        let large = ProposedOrder::market("ETHUSDT", OrderSide::Buy, dec!(9000.0001));
        let errors = FilterValidator::check(&full_filters(), dec!(2500), &large).errors().to_vec();
        assert_eq!(errors, vec!["QUANTITY TOO LARGE: 9000.0001 above maximum 9000 (exchange requirement)".to_string()]);
    }

    #[test]
    fn test_non_positive_quantity_reported_alongside_other_checks() {
        let order = ProposedOrder::market("ETHUSDT", OrderSide::Sell, Decimal::ZERO);
        let errors = FilterValidator::check(&ethusdt_filters(), dec!(2500), &order).errors().to_vec();
        assert_eq!(errors[0], "Quantity 0 must be greater than zero");
        assert!(errors.iter().any(|e| e.starts_with("QUANTITY TOO SMALL")));
    }

    #[test]
    fn test_market_orders_only_check_lot_size() {
        let mut filters = full_filters();
        filters.notional = Some(NotionalFilter {
            min_notional: dec!(1000000),
            max_notional: None,
        });
        let order = ProposedOrder::market("ETHUSDT", OrderSide::Buy, dec!(0.5));
        assert!(FilterValidator::check(&filters, dec!(2500), &order).is_valid());
    }

    #[test]
    fn test_price_filter_bounds_for_every_oco_field() {
        let mut filters = ethusdt_filters();
        filters.price_filter = Some(PriceFilter {
            min_price: dec!(2450),
            max_price: dec!(2550),
            tick_size: dec!(0.01),
        });
        let order = ProposedOrder::oco("ETHUSDT", dec!(0.5), dec!(2600), dec!(2400));
        let errors = FilterValidator::check(&filters, dec!(2500), &order).errors().to_vec();
        assert_eq!(
            errors,
            vec![
                "Limit price 2600 above maximum 2550".to_string(),
                "Stop price 2400 below minimum 2450".to_string(),
            ]
        );
    }

    #[test]
    fn test_percent_price_uses_side_multipliers() {
        let mut filters = ethusdt_filters();
        filters.percent_price_by_side = Some(PercentPriceBySide {
            bid_multiplier_up: dec!(1.1),
            bid_multiplier_down: dec!(0.9),
            ask_multiplier_up: dec!(2),
            ask_multiplier_down: dec!(0.5),
        });

        let buy = ProposedOrder::limit("ETHUSDT", OrderSide::Buy, dec!(1), dec!(2000));
        let errors = FilterValidator::check(&filters, dec!(2500), &buy).errors().to_vec();
        assert_eq!(errors, vec!["Price 2000 below BUY limit 2250 (0.9x current)".to_string()]);

        let sell = ProposedOrder::limit("ETHUSDT", OrderSide::Sell, dec!(1), dec!(2000));
        assert!(FilterValidator::check(&filters, dec!(2500), &sell).is_valid());

        let high = ProposedOrder::limit("ETHUSDT", OrderSide::Sell, dec!(1), dec!(5000.01));
        let errors = FilterValidator::check(&filters, dec!(2500), &high).errors().to_vec();
        assert_eq!(errors, vec!["Price 5000.01 above SELL limit 5000 (2x current)".to_string()]);
    }

    #[test]
    fn test_notional_bounds() {
        let order = ProposedOrder::limit("ETHUSDT", OrderSide::Buy, dec!(0.001), dec!(2400));
        let errors = FilterValidator::check(&full_filters(), dec!(2500), &order).errors().to_vec();
        assert_eq!(errors, vec!["Notional 2.4 at price 2400 below minimum 5".to_string()]);
    }

    #[test]
    fn test_missing_notional_filter_is_permissive() {
        // Without a NOTIONAL entry no size of order trips a notional check.
        for (qty, price) in [(dec!(0.0001), dec!(0.01)), (dec!(9000), dec!(999999.99))] {
            let order = ProposedOrder::limit("ETHUSDT", OrderSide::Buy, qty, price);
            let result = FilterValidator::check(&ethusdt_filters(), price, &order);
            assert!(
                result.errors().iter().all(|e| !e.contains("Notional")),
                "{:?}",
                result.errors()
            );
        }
    }

    #[test]
    fn test_empty_filter_set_accepts_anything_positive() {
        let order = ProposedOrder::limit("ETHUSDT", OrderSide::Buy, dec!(123.456789), dec!(0.123456789));
        assert!(FilterValidator::check(&SymbolFilterSet::default(), dec!(1), &order).is_valid());
    }

    #[test]
    fn test_overflow_collapses_to_single_error() {
        let mut filters = ethusdt_filters();
        filters.percent_price_by_side = Some(PercentPriceBySide {
            bid_multiplier_up: Decimal::MAX,
            ..PercentPriceBySide::default()
        });
        let order = ProposedOrder::limit("ETHUSDT", OrderSide::Buy, dec!(0.5), dec!(2400));
        let (ok, errors) = FilterValidator::check(&filters, dec!(2500), &order).into_parts();

        assert!(!ok);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Validation error: "));
    }

    #[test]
    fn test_lot_size_info_display() {
        let lot = LotSizeFilter {
            min_qty: dec!(0.00010000),
            max_qty: Some(dec!(9000.00000000)),
            step_size: dec!(0.00010000),
        };
        let info = LotSizeInfo::from_filter("ethusdt", &lot);
        assert_eq!(info.decimal_places, 4);
        assert_eq!(info.example_quantities(), vec![dec!(0.0001), dec!(0.0002), dec!(0.0003)]);

        let text = info.to_string();
        assert!(text.starts_with("ETHUSDT LOT_SIZE Requirements:"));
        assert!(text.contains("Step Size: 0.0001 (4 decimal places)"));
        assert!(text.contains("Maximum: 9000"));
        assert!(text.ends_with("Example Valid Quantities: 0.0001, 0.0002, 0.0003"));
    }

    #[tokio::test]
    async fn test_validate_end_to_end() {
        let (validator, _) = validator_for(MockExchange::new().with_symbol("ETHUSDT", ethusdt_filters(), dec!(2500.00)));

        let ok = validator
            .validate("ETHUSDT", OrderSide::Sell, dec!(0.5000), Some(dec!(2600.00)), Some(dec!(2400.00)))
            .await;
        assert!(ok.is_valid());

        let swapped = validator
            .validate("ETHUSDT", OrderSide::Sell, dec!(0.5000), Some(dec!(2400.00)), Some(dec!(2600.00)))
            .await;
        assert_eq!(swapped.errors().len(), 3);
    }

    #[tokio::test]
    async fn test_unresolvable_symbol_fails_fast() {
        let (validator, _) = validator_for(MockExchange::new());
        let (ok, errors) = validator
            .validate("NOPEUSDT", OrderSide::Buy, dec!(1), Some(dec!(1)), None)
            .await
            .into_parts();
        assert!(!ok);
        assert_eq!(errors, vec![UNRESOLVABLE.to_string()]);
    }

    #[tokio::test]
    async fn test_missing_price_fails_fast() {
        let (validator, _) = validator_for(MockExchange::new().with_symbol("ETHUSDT", ethusdt_filters(), Decimal::ZERO));
        let result = validator.validate("ETHUSDT", OrderSide::Buy, dec!(1), None, None).await;
        assert_eq!(result.errors(), [UNRESOLVABLE.to_string()]);
    }

    #[tokio::test]
    async fn test_filters_fetched_once_across_validations() {
        let (validator, exchange) = validator_for(MockExchange::new().with_symbol("ETHUSDT", ethusdt_filters(), dec!(2500)));
        for _ in 0..3 {
            validator.validate("ETHUSDT", OrderSide::Buy, dec!(1), None, None).await;
        }
        assert_eq!(exchange.filter_calls(), 1);
        assert_eq!(exchange.price_calls(), 3);
    }

    #[tokio::test]
    async fn test_malformed_oco_fields_rejected() {
        let (validator, exchange) = validator_for(MockExchange::new().with_symbol("ETHUSDT", ethusdt_filters(), dec!(2500)));
        let result = validator
            .validate("ETHUSDT", OrderSide::Sell, dec!(1), None, Some(dec!(2400)))
            .await;
        assert_eq!(result.errors(), ["Price and stop_price are required for OCO orders".to_string()]);
        assert_eq!(exchange.filter_calls(), 0);
    }

    #[tokio::test]
    async fn test_lot_size_info_lookup() {
        let (validator, _) = validator_for(MockExchange::new().with_symbol("ETHUSDT", ethusdt_filters(), dec!(2500)));
        let info = validator.lot_size_info("ETHUSDT").await.unwrap();
        assert_eq!(info.step_size, dec!(0.0001));
        assert!(validator.lot_size_info("NOPEUSDT").await.is_none());
    }
}
