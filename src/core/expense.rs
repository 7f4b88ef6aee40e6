use crate::core::currency::{CurrencyCode, ManualRate};
use crate::core::person::PersonRef;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One participant's share of an expense.
///
/// How the share was derived (equal, percentage, shares) is upstream
/// input validation; by the time a split reaches this engine it is a
/// concrete amount in the expense's native currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Split {
    pub party: PersonRef,
    pub amount: Decimal,
}

impl Split {
    pub fn new(party: PersonRef, amount: Decimal) -> Self {
        Self { party, amount }
    }
}

/// A shared expense paid by one party and split across several.
///
/// Expenses are immutable input records supplied by the data provider;
/// the aggregator consumes them read-only and skips soft-deleted rows.
///
/// # Examples
///
/// ```
/// use split_engine::core::expense::{Expense, Split};
/// use split_engine::core::person::PersonRef;
/// use rust_decimal_macros::dec;
///
/// let dinner = Expense::new("Dinner", dec!(90), "USD", PersonRef::user("alice"))
///     .with_splits(vec![
///         Split::new(PersonRef::user("bob"), dec!(30)),
///         Split::new(PersonRef::user("carol"), dec!(30)),
///         Split::new(PersonRef::user("alice"), dec!(30)),
///     ]);
///
/// assert_eq!(dinner.splits.len(), 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub date: DateTime<Utc>,
    /// Total expense amount in `currency`. Must be positive.
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub paid_by: PersonRef,
    #[serde(default)]
    pub splits: Vec<Split>,
    /// Soft-delete flag; deleted expenses are ignored by aggregation.
    #[serde(default)]
    pub is_deleted: bool,
    /// Exchange rate pinned at entry time, taking precedence over live rates
    /// when this expense is converted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_exchange_rate: Option<ManualRate>,
}

impl Expense {
    /// Create a new expense.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is not positive.
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        currency: impl Into<CurrencyCode>,
        paid_by: PersonRef,
    ) -> Self {
        assert!(
            amount > Decimal::ZERO,
            "Expense amount must be positive, got {}",
            amount
        );
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            date: Utc::now(),
            amount,
            currency: currency.into(),
            paid_by,
            splits: Vec::new(),
            is_deleted: false,
            manual_exchange_rate: None,
        }
    }

    pub fn with_splits(mut self, splits: Vec<Split>) -> Self {
        self.splits = splits;
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn with_manual_rate(mut self, rate: ManualRate) -> Self {
        self.manual_exchange_rate = Some(rate);
        self
    }

    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    /// The audit-trail record this expense contributes to a balance entry.
    pub fn contribution(&self, split_amount: Decimal) -> ExpenseContribution {
        ExpenseContribution {
            expense_id: self.id,
            description: self.description.clone(),
            date: self.date,
            expense_amount: self.amount,
            split_amount,
        }
    }
}

/// Audit-trail breakdown attached to a direct-view balance entry: which
/// expense fed the balance and by how much.
///
/// Simplified output never carries contributions, since after netting a
/// single entry may mix amounts from many unrelated expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseContribution {
    pub expense_id: Uuid,
    pub description: String,
    pub date: DateTime<Utc>,
    /// The full expense total, for context in drill-down views.
    pub expense_amount: Decimal,
    /// The share of the expense this balance carries.
    pub split_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_expense() -> Expense {
        Expense::new("Groceries", dec!(60), "USD", PersonRef::user("alice")).with_splits(vec![
            Split::new(PersonRef::user("alice"), dec!(20)),
            Split::new(PersonRef::user("bob"), dec!(20)),
            Split::new(PersonRef::user("carol"), dec!(20)),
        ])
    }

    #[test]
    fn test_expense_creation() {
        let e = sample_expense();
        assert_eq!(e.amount, dec!(60));
        assert_eq!(e.currency.as_str(), "USD");
        assert_eq!(e.splits.len(), 3);
        assert!(!e.is_deleted);
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_expense_zero_amount() {
        Expense::new("Nothing", Decimal::ZERO, "USD", PersonRef::user("alice"));
    }

    #[test]
    fn test_contribution_carries_split_share() {
        let e = sample_expense();
        let c = e.contribution(dec!(20));
        assert_eq!(c.expense_id, e.id);
        assert_eq!(c.expense_amount, dec!(60));
        assert_eq!(c.split_amount, dec!(20));
    }

    #[test]
    fn test_expense_json_round_trip() {
        let e = sample_expense().with_manual_rate(ManualRate::new("USD", "EUR", dec!(0.9)));
        let json = serde_json::to_string(&e).unwrap();
        let back: Expense = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, e.id);
        assert_eq!(back.manual_exchange_rate, e.manual_exchange_rate);
        assert_eq!(back.splits.len(), 3);
    }
}
