use crate::core::currency::{CurrencyCode, RateTable};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Storage for fetched rate tables, one row per base currency.
///
/// The host application typically backs this with its local store; the
/// engine ships an in-memory implementation. A lookup miss and a storage
/// failure are indistinguishable on purpose: the converter treats both as
/// "no cache" and moves down its fallback chain.
///
/// Concurrent misses for the same base may each trigger an independent
/// fetch; there is no single-flight deduplication. The last successful
/// fetch wins, which is harmless since every fresh table is equally valid.
#[async_trait]
pub trait RateCacheStore: Send + Sync {
    async fn get(&self, base: &CurrencyCode) -> Option<RateTable>;
    async fn put(&self, table: RateTable);
}

/// In-memory cache store keyed by base currency.
#[derive(Debug, Default)]
pub struct InMemoryRateCache {
    tables: RwLock<HashMap<CurrencyCode, RateTable>>,
}

impl InMemoryRateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing table, e.g. one loaded from disk.
    pub fn with_table(table: RateTable) -> Self {
        let store = Self::new();
        if let Ok(mut tables) = store.tables.write() {
            tables.insert(table.base_currency.clone(), table);
        }
        store
    }
}

#[async_trait]
impl RateCacheStore for InMemoryRateCache {
    async fn get(&self, base: &CurrencyCode) -> Option<RateTable> {
        match self.tables.read() {
            Ok(tables) => tables.get(base).cloned(),
            Err(_) => None,
        }
    }

    async fn put(&self, table: RateTable) {
        match self.tables.write() {
            Ok(mut tables) => {
                tables.insert(table.base_currency.clone(), table);
            }
            Err(_) => log::warn!(
                "rate cache lock poisoned, dropping table for {}",
                table.base_currency
            ),
        }
    }
}
