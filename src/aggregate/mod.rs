//! Aggregation of expense, split, and settlement records into balances.

pub mod aggregator;
pub mod provider;

pub use aggregator::{BalanceAggregator, BalanceOptions};
pub use provider::{DataProvider, ProviderError};
