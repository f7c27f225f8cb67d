// service/filter_cache.rs
// Per-owner symbol -> filter set cache shared by validator and aligner

use assistant_common::SymbolFilterSet;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::exchange::traits::SymbolRulesSource;

/// Lazily populated, never invalidated. Failed lookups are cached as `None`
/// so an unreachable symbol is not refetched on every call.
pub struct FilterCache {
    source: Arc<dyn SymbolRulesSource>,
    entries: DashMap<String, Option<SymbolFilterSet>>,
}

impl FilterCache {
    pub fn new(source: Arc<dyn SymbolRulesSource>) -> Self {
        Self {
            source,
            entries: DashMap::new(),
        }
    }

    /// Filters for `symbol`, or `None` when they cannot be resolved.
    pub async fn get_filters(&self, symbol: &str) -> Option<SymbolFilterSet> {
        let key = symbol.to_uppercase();
        if let Some(entry) = self.entries.get(&key) {
            return entry.value().clone();
        }

        let fetched = match self.source.exchange_filters(&key).await {
            Ok(Some(filters)) => {
                if filters.is_unconstrained() {
                    warn!("None of the evaluated filter types are listed for {}, exchange limits go unchecked", key);
                }
                Some(filters)
            }
            Ok(None) => {
                warn!("No trading filters listed for {}", key);
                None
            }
            Err(e) => {
                warn!("Failed to fetch trading filters for {}: {}", key, e);
                None
            }
        };
        debug!("Cached filters for {} (resolved: {})", key, fetched.is_some());

        self.entries.entry(key).or_insert(fetched).value().clone()
    }

    /// Latest positive price for `symbol`. Prices are never cached.
    pub async fn current_price(&self, symbol: &str) -> Option<Decimal> {
        let key = symbol.to_uppercase();
        match self.source.current_price(&key).await {
            Ok(Some(price)) if price > Decimal::ZERO => Some(price),
            Ok(Some(price)) => {
                warn!("Ignoring non-positive price {} for {}", price, key);
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to fetch current price for {}: {}", key, e);
                None
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
