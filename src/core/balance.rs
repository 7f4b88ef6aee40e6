use crate::core::currency::CurrencyCode;
use crate::core::expense::ExpenseContribution;
use crate::core::person::{NameResolver, PersonRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One directed, positive-amount debt: `from` owes `to` `amount` in `currency`.
///
/// This is the atomic unit of both the direct and the simplified balance
/// views. In the direct view `expenses` lists the contributions that built
/// the balance; simplified output always leaves it empty.
///
/// # Examples
///
/// ```
/// use split_engine::core::balance::BalanceEntry;
/// use split_engine::core::person::PersonRef;
/// use rust_decimal_macros::dec;
///
/// let entry = BalanceEntry::new(
///     PersonRef::user("bob"),
///     PersonRef::user("alice"),
///     dec!(42.50),
///     "USD",
/// );
/// assert_eq!(entry.amount, dec!(42.50));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceEntry {
    /// The party that owes.
    pub from: PersonRef,
    /// The party that is owed.
    pub to: PersonRef,
    /// The amount owed. Positive by construction.
    pub amount: Decimal,
    pub currency: CurrencyCode,
    /// Per-expense audit trail, direct view only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expenses: Vec<ExpenseContribution>,
}

impl BalanceEntry {
    pub fn new(
        from: PersonRef,
        to: PersonRef,
        amount: Decimal,
        currency: impl Into<CurrencyCode>,
    ) -> Self {
        Self {
            from,
            to,
            amount,
            currency: currency.into(),
            expenses: Vec::new(),
        }
    }

    pub fn with_contributions(mut self, expenses: Vec<ExpenseContribution>) -> Self {
        self.expenses = expenses;
        self
    }

    /// Human-readable one-line rendering using the injected resolver.
    pub fn describe(&self, resolver: &dyn NameResolver) -> String {
        format!(
            "{} owes {} {} {}",
            resolver.display_name(&self.from),
            resolver.display_name(&self.to),
            self.amount,
            self.currency,
        )
    }
}

/// The externally visible output of a balance computation.
///
/// An immutable snapshot: recomputation always replaces the prior result
/// wholesale, nothing is patched in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResult {
    pub balances: Vec<BalanceEntry>,
    /// Sum of all in-scope expense amounts, converted to `currency`.
    pub total_expenses: Decimal,
    /// The target currency every balance is expressed in.
    pub currency: CurrencyCode,
}

impl BalanceResult {
    /// Total of all outstanding balance amounts.
    pub fn outstanding_total(&self) -> Decimal {
        self.balances.iter().map(|b| b.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::person::TruncatedIdResolver;
    use rust_decimal_macros::dec;

    #[test]
    fn test_describe_uses_resolver() {
        let entry = BalanceEntry::new(
            PersonRef::user("bob").with_name("Bob"),
            PersonRef::user("alice").with_name("Alice"),
            dec!(12.50),
            "USD",
        );
        assert_eq!(
            entry.describe(&TruncatedIdResolver),
            "Bob owes Alice 12.50 USD"
        );
    }

    #[test]
    fn test_empty_contributions_skipped_in_json() {
        let entry = BalanceEntry::new(PersonRef::user("a"), PersonRef::user("b"), dec!(1), "USD");
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("expenses").is_none());
    }

    #[test]
    fn test_outstanding_total() {
        let result = BalanceResult {
            balances: vec![
                BalanceEntry::new(PersonRef::user("a"), PersonRef::user("b"), dec!(10), "USD"),
                BalanceEntry::new(PersonRef::user("c"), PersonRef::user("b"), dec!(5), "USD"),
            ],
            total_expenses: dec!(30),
            currency: CurrencyCode::new("USD"),
        };
        assert_eq!(result.outstanding_total(), dec!(15));
    }
}
