use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// ISO 4217-style currency code.
///
/// Supports standard fiat currencies (USD, EUR, INR, etc.) as well as
/// arbitrary identifiers for currencies the rate API does not know about.
///
/// # Examples
///
/// ```
/// use split_engine::core::currency::CurrencyCode;
///
/// let usd = CurrencyCode::new("USD");
/// let eur = CurrencyCode::new("EUR");
/// assert_ne!(usd, eur);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A user-recorded exchange rate pinned to a specific currency pair.
///
/// Recorded on an expense at entry time so a historical conversion is
/// reproduced exactly instead of drifting with the live market rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualRate {
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    pub rate: Decimal,
}

impl ManualRate {
    pub fn new(
        from_currency: impl Into<CurrencyCode>,
        to_currency: impl Into<CurrencyCode>,
        rate: Decimal,
    ) -> Self {
        Self {
            from_currency: from_currency.into(),
            to_currency: to_currency.into(),
            rate,
        }
    }

    /// Rate applicable to the requested pair, if this manual rate covers it.
    ///
    /// An exact pair match yields the rate directly; the reverse pair yields
    /// the multiplicative inverse; an unrelated pair yields `None`.
    pub fn rate_for(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<Decimal> {
        if &self.from_currency == from && &self.to_currency == to {
            Some(self.rate)
        } else if &self.from_currency == to && &self.to_currency == from {
            if self.rate == Decimal::ZERO {
                None
            } else {
                Some(Decimal::ONE / self.rate)
            }
        } else {
            None
        }
    }
}

/// How long a fetched rate table stays valid.
pub const RATE_TABLE_TTL_HOURS: i64 = 24;

/// A time-boxed table of exchange rates from one base currency to others.
///
/// One table exists per base currency and is overwritten wholesale on every
/// successful fetch. Consumers never mutate it; they read `rates` while
/// `now < expires_at` and fall back to a stale table only when a fresh fetch
/// fails. Serializes with ISO-8601 timestamps, which is the persisted-cache
/// schema shared with the host application's local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base_currency: CurrencyCode,
    pub rates: HashMap<CurrencyCode, Decimal>,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RateTable {
    /// Build a table fetched at `now`, expiring after the standard TTL.
    pub fn fetched_now(
        base_currency: CurrencyCode,
        rates: HashMap<CurrencyCode, Decimal>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            base_currency,
            rates,
            fetched_at: now,
            expires_at: now + Duration::hours(RATE_TABLE_TTL_HOURS),
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn rate(&self, to: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(to).copied()
    }
}
