//! # split-engine
//!
//! Shared-expense balance aggregation, currency conversion, and debt
//! simplification.
//!
//! Given expense, split, and settlement records, this engine computes who
//! owes whom and how much, and can reduce the resulting multi-party debt
//! graph to a small set of pairwise payments via a greedy largest-first
//! heuristic (the exact minimization problem is NP-hard).
//!
//! ## Architecture
//!
//! - **core** — Foundational types: people, currencies, expenses,
//!   settlements, balances
//! - **convert** — Exchange-rate resolution with manual-override, cache,
//!   and live-fetch tiers; never fails hard
//! - **aggregate** — Expense/settlement aggregation into pairwise balances
//! - **simplify** — Greedy netting of balances into a settlement plan
//! - **simulate** — Random expense-network generation for testing

pub mod aggregate;
pub mod convert;
pub mod core;
pub mod simplify;
pub mod simulate;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::aggregate::aggregator::{BalanceAggregator, BalanceOptions};
    pub use crate::aggregate::provider::{DataProvider, ProviderError};
    pub use crate::convert::converter::CurrencyConverter;
    pub use crate::core::balance::{BalanceEntry, BalanceResult};
    pub use crate::core::currency::CurrencyCode;
    pub use crate::core::expense::{Expense, Split};
    pub use crate::core::person::PersonRef;
    pub use crate::core::settlement::{Settlement, SettlementKind};
    pub use crate::simplify::simplify_debts;
}
