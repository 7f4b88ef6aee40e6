use crate::core::expense::Expense;
use crate::core::settlement::Settlement;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by a data provider.
///
/// The aggregator never catches these; they propagate unmodified so the
/// caller can log and present an error state instead of stale balances.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to read records: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse records: {0}")]
    Json(#[from] serde_json::Error),
    #[error("data store error: {0}")]
    Store(String),
}

/// Read-only source of the expense working set.
///
/// The engine always fetches the full set and filters in memory; providers
/// do not need to support queries. Splits not summing to the expense total
/// are the provider's responsibility to reject upstream — the engine
/// assumes that invariant holds and does not re-validate it.
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn expenses(&self) -> Result<Vec<Expense>, ProviderError>;
    async fn settlements(&self) -> Result<Vec<Settlement>, ProviderError>;
}

/// Provider over fixed in-memory records. The natural choice for tests and
/// for hosts that already hold the working set.
#[derive(Debug, Clone, Default)]
pub struct StaticDataProvider {
    pub expenses: Vec<Expense>,
    pub settlements: Vec<Settlement>,
}

impl StaticDataProvider {
    pub fn new(expenses: Vec<Expense>, settlements: Vec<Settlement>) -> Self {
        Self {
            expenses,
            settlements,
        }
    }
}

#[async_trait]
impl DataProvider for StaticDataProvider {
    async fn expenses(&self) -> Result<Vec<Expense>, ProviderError> {
        Ok(self.expenses.clone())
    }

    async fn settlements(&self) -> Result<Vec<Settlement>, ProviderError> {
        Ok(self.settlements.clone())
    }
}

/// On-disk JSON schema for a working set, shared with the CLI.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WorkingSetFile {
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub settlements: Vec<Settlement>,
}

/// Provider that re-reads a JSON working-set file on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<WorkingSetFile, ProviderError> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl DataProvider for JsonFileProvider {
    async fn expenses(&self) -> Result<Vec<Expense>, ProviderError> {
        Ok(self.load()?.expenses)
    }

    async fn settlements(&self) -> Result<Vec<Settlement>, ProviderError> {
        Ok(self.load()?.settlements)
    }
}
