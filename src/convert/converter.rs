use crate::convert::cache::RateCacheStore;
use crate::convert::fetcher::RateFetcher;
use crate::core::balance::BalanceEntry;
use crate::core::currency::{CurrencyCode, ManualRate, RateTable};
use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;

/// Resolves exchange rates with graceful degradation.
///
/// Resolution order, first match wins:
///
/// 1. Identity: `from == to` is always `1.0`, beating any manual rate.
/// 2. A manual rate covering the pair (directly or inverted).
/// 3. An unexpired cached table for base `from`. A valid table that lacks
///    the target currency resolves to `1.0` — conversion visibly becomes a
///    no-op instead of failing, a documented limitation.
/// 4. A fresh fetch, persisted to the cache with a 24 h expiry.
/// 5. A stale cached table, when the fetch fails.
/// 6. `1.0`. Conversion never raises; the caller always gets a number.
#[derive(Clone)]
pub struct CurrencyConverter {
    cache: Arc<dyn RateCacheStore>,
    fetcher: Arc<dyn RateFetcher>,
}

impl CurrencyConverter {
    pub fn new(cache: Arc<dyn RateCacheStore>, fetcher: Arc<dyn RateFetcher>) -> Self {
        Self { cache, fetcher }
    }

    /// Resolve the rate for one unit of `from` expressed in `to`.
    pub async fn get_exchange_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        manual: Option<&ManualRate>,
    ) -> Decimal {
        if from == to {
            return Decimal::ONE;
        }

        if let Some(rate) = manual.and_then(|m| m.rate_for(from, to)) {
            return rate;
        }

        let now = Utc::now();
        let cached = self.cache.get(from).await;

        if let Some(table) = &cached {
            if table.is_valid(now) {
                return match table.rate(to) {
                    Some(rate) => rate,
                    None => {
                        log::warn!("cached {from} table has no {to} rate, not converting");
                        Decimal::ONE
                    }
                };
            }
        }

        match self.fetcher.fetch_rates(from).await {
            Ok(rates) => {
                let table = RateTable::fetched_now(from.clone(), rates, now);
                let rate = table.rate(to);
                self.cache.put(table).await;
                match rate {
                    Some(rate) => rate,
                    None => {
                        log::warn!("fetched {from} table has no {to} rate, not converting");
                        Decimal::ONE
                    }
                }
            }
            Err(err) => {
                // Stale data beats no data.
                if let Some(table) = cached {
                    log::warn!("rate fetch for {from} failed ({err}), using stale table");
                    return table.rate(to).unwrap_or(Decimal::ONE);
                }
                log::warn!("rate fetch for {from} failed ({err}) with no cache, not converting");
                Decimal::ONE
            }
        }
    }

    /// Convert `amount` from one currency to another, rounded to 2 decimal
    /// places. Same-currency conversion returns the input unchanged without
    /// touching the rate or rounding path.
    pub async fn convert_amount(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
        manual: Option<&ManualRate>,
    ) -> Decimal {
        if from == to {
            return amount;
        }
        let rate = self.get_exchange_rate(from, to, manual).await;
        (amount * rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Convert every entry to `target`, preserving parties and audit trails.
    pub async fn convert_balances(
        &self,
        entries: Vec<BalanceEntry>,
        target: &CurrencyCode,
    ) -> Vec<BalanceEntry> {
        let mut converted = Vec::with_capacity(entries.len());
        for mut entry in entries {
            entry.amount = self
                .convert_amount(entry.amount, &entry.currency, target, None)
                .await;
            entry.currency = target.clone();
            converted.push(entry);
        }
        converted
    }
}
