use crate::core::balance::BalanceEntry;
use crate::core::person::{PersonKey, PersonRef};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Net balances within this distance of zero count as settled.
///
/// Absorbs rounding noise left by prior conversions and aggregation. The
/// tolerance is uniform across currencies; minor units finer or coarser
/// than 1/100 are not treated specially.
pub const SETTLED_EPSILON: Decimal = dec!(0.01);

/// Reduce a set of same-currency balances to a small set of payments.
///
/// Greedy largest-first matching: the biggest debtor pays the biggest
/// creditor until one side is exhausted, repeatedly. This reduces — but
/// does not provably minimize — the transaction count; the exact problem
/// is NP-hard (subset-sum partitioning), so a heuristic is intentional.
///
/// Entries whose `from` or `to` carries no resolvable id are dropped
/// silently: one bad record must not block the whole computation.
/// Output entries carry no expense breakdown, since a netted payment may
/// mix contributions from many unrelated expenses.
///
/// Precondition: all entries share one currency; callers convert first.
/// The output currency is copied from the first input entry.
///
/// # Examples
///
/// ```
/// use split_engine::core::balance::BalanceEntry;
/// use split_engine::core::person::PersonRef;
/// use split_engine::simplify::simplify_debts;
/// use rust_decimal_macros::dec;
///
/// // A owes B, B owes C: the chain collapses to A paying C directly.
/// let entries = vec![
///     BalanceEntry::new(PersonRef::user("a"), PersonRef::user("b"), dec!(50), "USD"),
///     BalanceEntry::new(PersonRef::user("b"), PersonRef::user("c"), dec!(50), "USD"),
/// ];
/// let simplified = simplify_debts(&entries);
/// assert_eq!(simplified.len(), 1);
/// assert_eq!(simplified[0].amount, dec!(50));
/// ```
pub fn simplify_debts(entries: &[BalanceEntry]) -> Vec<BalanceEntry> {
    let currency = match entries.first() {
        Some(entry) => entry.currency.clone(),
        None => return Vec::new(),
    };

    // Net ledger: debtor side down, creditor side up. A pass-through
    // middleman nets to ~0 and disappears from the output.
    let mut net: HashMap<PersonKey, Decimal> = HashMap::new();
    let mut people: HashMap<PersonKey, PersonRef> = HashMap::new();

    for entry in entries {
        let (from_key, to_key) = match (entry.from.key(), entry.to.key()) {
            (Some(f), Some(t)) => (f, t),
            _ => {
                log::debug!("dropping balance entry with unresolvable party");
                continue;
            }
        };
        *net.entry(from_key.clone()).or_insert(Decimal::ZERO) -= entry.amount;
        *net.entry(to_key.clone()).or_insert(Decimal::ZERO) += entry.amount;
        people.entry(from_key).or_insert_with(|| entry.from.clone());
        people.entry(to_key).or_insert_with(|| entry.to.clone());
    }

    // Partition into debtors and creditors, carrying magnitudes.
    let mut debtors: Vec<(PersonKey, Decimal)> = Vec::new();
    let mut creditors: Vec<(PersonKey, Decimal)> = Vec::new();
    for (key, balance) in &net {
        if *balance < -SETTLED_EPSILON {
            debtors.push((key.clone(), -*balance));
        } else if *balance > SETTLED_EPSILON {
            creditors.push((key.clone(), *balance));
        }
    }

    // Largest first; ties broken by key so the output is deterministic.
    debtors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    creditors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut payments = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < debtors.len() && j < creditors.len() {
        let settle = debtors[i].1.min(creditors[j].1);

        payments.push(BalanceEntry::new(
            people[&debtors[i].0].clone(),
            people[&creditors[j].0].clone(),
            settle,
            currency.clone(),
        ));

        debtors[i].1 -= settle;
        creditors[j].1 -= settle;
        if debtors[i].1 == Decimal::ZERO {
            i += 1;
        }
        if creditors[j].1 == Decimal::ZERO {
            j += 1;
        }
    }

    payments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(from: &str, to: &str, amount: Decimal) -> BalanceEntry {
        BalanceEntry::new(PersonRef::user(from), PersonRef::user(to), amount, "USD")
    }

    #[test]
    fn test_empty_input() {
        assert!(simplify_debts(&[]).is_empty());
    }

    #[test]
    fn test_chain_collapses_to_direct_payment() {
        let entries = vec![entry("a", "b", dec!(50)), entry("b", "c", dec!(50))];
        let out = simplify_debts(&entries);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].from, PersonRef::user("a"));
        assert_eq!(out[0].to, PersonRef::user("c"));
        assert_eq!(out[0].amount, dec!(50));
    }

    #[test]
    fn test_equal_circle_cancels_entirely() {
        let entries = vec![
            entry("a", "b", dec!(50)),
            entry("b", "c", dec!(50)),
            entry("c", "a", dec!(50)),
        ];
        assert!(simplify_debts(&entries).is_empty());
    }

    #[test]
    fn test_mutual_debts_cancel() {
        let entries = vec![entry("a", "b", dec!(50)), entry("b", "a", dec!(50))];
        assert!(simplify_debts(&entries).is_empty());
    }

    #[test]
    fn test_near_zero_net_within_epsilon_is_settled() {
        let entries = vec![entry("a", "b", dec!(50.005)), entry("b", "a", dec!(50))];
        assert!(simplify_debts(&entries).is_empty());
    }

    #[test]
    fn test_net_just_beyond_epsilon_survives() {
        let entries = vec![entry("a", "b", dec!(50.02)), entry("b", "a", dec!(50))];
        let out = simplify_debts(&entries);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].amount, dec!(0.02));
    }

    #[test]
    fn test_fan_out_stays_two_payments() {
        let entries = vec![entry("a", "b", dec!(60)), entry("a", "c", dec!(40))];
        let out = simplify_debts(&entries);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|e| e.from == PersonRef::user("a")));
        let total: Decimal = out.iter().map(|e| e.amount).sum();
        assert_eq!(total, dec!(100));
    }

    #[test]
    fn test_unresolvable_entries_dropped_silently() {
        let ghost = PersonRef::default().with_name("Ghost");
        let entries = vec![
            BalanceEntry::new(ghost.clone(), PersonRef::user("b"), dec!(50), "USD"),
            BalanceEntry::new(PersonRef::user("b"), ghost, dec!(20), "USD"),
            entry("a", "b", dec!(10)),
        ];
        let out = simplify_debts(&entries);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].amount, dec!(10));
    }

    #[test]
    fn test_output_has_no_expense_breakdown() {
        let mut entry_with_audit = entry("a", "b", dec!(25));
        entry_with_audit.expenses = vec![crate::core::expense::ExpenseContribution {
            expense_id: uuid::Uuid::new_v4(),
            description: "Dinner".into(),
            date: chrono::Utc::now(),
            expense_amount: dec!(75),
            split_amount: dec!(25),
        }];
        let out = simplify_debts(&[entry_with_audit]);
        assert_eq!(out.len(), 1);
        assert!(out[0].expenses.is_empty());
    }

    #[test]
    fn test_conservation_on_mixed_network() {
        let entries = vec![
            entry("a", "b", dec!(30)),
            entry("a", "c", dec!(20)),
            entry("b", "c", dec!(10)),
            entry("d", "a", dec!(5)),
        ];
        // Nets: a -45, b +20, c +30, d -5. Debtor magnitude total = 50.
        let out = simplify_debts(&entries);
        let total: Decimal = out.iter().map(|e| e.amount).sum();
        assert_eq!(total, dec!(50));
    }

    #[test]
    fn test_deterministic_under_ties() {
        let entries = vec![entry("a", "c", dec!(50)), entry("b", "d", dec!(50))];
        let first = simplify_debts(&entries);
        let second = simplify_debts(&entries);
        assert_eq!(first.len(), second.len());
        for (x, y) in first.iter().zip(second.iter()) {
            assert_eq!(x.from, y.from);
            assert_eq!(x.to, y.to);
            assert_eq!(x.amount, y.amount);
        }
    }
}
