//! Random expense-network generation.
//!
//! Produces synthetic working sets for benchmarks and for exercising the
//! pipeline from the command line.

use crate::core::currency::CurrencyCode;
use crate::core::expense::{Expense, Split};
use crate::core::person::PersonRef;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Configuration for generating a random expense network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Number of people in the group.
    pub people_count: usize,
    /// Number of expenses to generate.
    pub expense_count: usize,
    /// Currencies to draw from.
    pub currencies: Vec<CurrencyCode>,
    /// Minimum expense amount.
    pub min_amount: Decimal,
    /// Maximum expense amount.
    pub max_amount: Decimal,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            people_count: 5,
            expense_count: 20,
            currencies: vec![CurrencyCode::new("USD")],
            min_amount: Decimal::from(10),
            max_amount: Decimal::from(500),
        }
    }
}

/// Generate a random expense network.
///
/// Each expense picks a random payer and splits the amount equally across
/// a random subset of the group that always includes the payer. Rounding
/// residue from the equal division lands on the payer's own split, so the
/// splits always sum exactly to the expense total.
pub fn generate_random_network(config: &NetworkConfig) -> Vec<Expense> {
    let mut rng = rand::thread_rng();

    // A split needs at least a payer and one other participant.
    let people: Vec<PersonRef> = (0..config.people_count.max(2))
        .map(|i| PersonRef::user(format!("person-{i:03}")))
        .collect();

    let min = config.min_amount.to_u64().unwrap_or(1).max(1);
    let max = config.max_amount.to_u64().unwrap_or(min + 1).max(min + 1);

    let mut expenses = Vec::with_capacity(config.expense_count);
    for n in 0..config.expense_count {
        let payer_idx = rng.gen_range(0..people.len());
        let currency = &config.currencies[rng.gen_range(0..config.currencies.len())];
        let amount = Decimal::from(rng.gen_range(min..max));

        // Random subset of 2..=all participants, payer always included.
        let party_count = rng.gen_range(2..=people.len().max(2));
        let mut participant_idx: Vec<usize> = vec![payer_idx];
        while participant_idx.len() < party_count {
            let candidate = rng.gen_range(0..people.len());
            if !participant_idx.contains(&candidate) {
                participant_idx.push(candidate);
            }
        }

        let share = (amount / Decimal::from(participant_idx.len())).round_dp(2);
        let remainder = amount - share * Decimal::from(participant_idx.len() - 1);

        let splits = participant_idx
            .iter()
            .map(|&idx| {
                let split_amount = if idx == payer_idx { remainder } else { share };
                Split::new(people[idx].clone(), split_amount)
            })
            .collect();

        expenses.push(
            Expense::new(
                format!("expense-{n:04}"),
                amount,
                currency.clone(),
                people[payer_idx].clone(),
            )
            .with_splits(splits),
        );
    }
    expenses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_requested_count() {
        let config = NetworkConfig {
            people_count: 4,
            expense_count: 12,
            ..Default::default()
        };
        let expenses = generate_random_network(&config);
        assert_eq!(expenses.len(), 12);
    }

    #[test]
    fn test_splits_sum_to_expense_total() {
        let config = NetworkConfig::default();
        for expense in generate_random_network(&config) {
            let split_total: Decimal = expense.splits.iter().map(|s| s.amount).sum();
            assert_eq!(split_total, expense.amount);
        }
    }

    #[test]
    fn test_payer_always_participates() {
        let config = NetworkConfig::default();
        for expense in generate_random_network(&config) {
            assert!(expense
                .splits
                .iter()
                .any(|s| s.party.same_party(&expense.paid_by)));
        }
    }
}
