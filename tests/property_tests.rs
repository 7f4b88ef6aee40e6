use proptest::prelude::*;
use rust_decimal::Decimal;
use split_engine::core::balance::BalanceEntry;
use split_engine::core::person::PersonRef;
use split_engine::simplify::{simplify_debts, SETTLED_EPSILON};
use std::collections::HashMap;

/// Random party from a small pool (to force netting interactions).
fn arb_person() -> impl Strategy<Value = PersonRef> {
    prop::sample::select(vec![
        PersonRef::user("a"),
        PersonRef::user("b"),
        PersonRef::user("c"),
        PersonRef::user("d"),
        PersonRef::user("e"),
        PersonRef::user("f"),
    ])
}

/// Random positive whole-unit amount (1 to 1,000,000).
///
/// Whole units keep every nonzero net position far outside the settled
/// epsilon, so conservation is exact; boundary behavior around the epsilon
/// is covered by the simplifier's unit tests.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1u64..1_000_000u64).prop_map(Decimal::from)
}

/// Random balance entry between two distinct parties.
fn arb_entry() -> impl Strategy<Value = BalanceEntry> {
    (arb_person(), arb_person(), arb_amount()).prop_filter_map(
        "debtor must differ from creditor",
        |(from, to, amount)| {
            if from.same_party(&to) {
                None
            } else {
                Some(BalanceEntry::new(from, to, amount, "USD"))
            }
        },
    )
}

fn arb_entries() -> impl Strategy<Value = Vec<BalanceEntry>> {
    prop::collection::vec(arb_entry(), 1..40)
}

/// Net position of every party over a set of entries.
fn net_positions(entries: &[BalanceEntry]) -> HashMap<String, Decimal> {
    let mut net: HashMap<String, Decimal> = HashMap::new();
    for entry in entries {
        let from = entry.from.key().unwrap().to_string();
        let to = entry.to.key().unwrap().to_string();
        *net.entry(from).or_insert(Decimal::ZERO) -= entry.amount;
        *net.entry(to).or_insert(Decimal::ZERO) += entry.amount;
    }
    net
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Conservation. The simplified plan moves exactly the
    // total debtor magnitude (ignoring parties inside the epsilon band).
    // ===================================================================
    #[test]
    fn plan_total_equals_debtor_magnitude(entries in arb_entries()) {
        let plan = simplify_debts(&entries);
        let plan_total: Decimal = plan.iter().map(|e| e.amount).sum();

        let debtor_total: Decimal = net_positions(&entries)
            .values()
            .filter(|v| **v < -SETTLED_EPSILON)
            .map(|v| -*v)
            .sum();
        let creditor_total: Decimal = net_positions(&entries)
            .values()
            .filter(|v| **v > SETTLED_EPSILON)
            .map(|v| *v)
            .sum();

        // Whole-unit inputs mean nobody lands inside the epsilon band,
        // so both sides match the plan exactly.
        prop_assert_eq!(debtor_total, creditor_total);
        prop_assert_eq!(plan_total, debtor_total);
    }

    // ===================================================================
    // INVARIANT 2: The plan preserves every party's net position.
    // Settling the plan leaves everyone exactly where the input said.
    // ===================================================================
    #[test]
    fn plan_preserves_net_positions(entries in arb_entries()) {
        let plan = simplify_debts(&entries);
        let input_net = net_positions(&entries);
        let plan_net = net_positions(&plan);

        for (person, net) in &input_net {
            let planned = plan_net.get(person).copied().unwrap_or(Decimal::ZERO);
            prop_assert_eq!(*net, planned, "net position drifted for {}", person);
        }
    }

    // ===================================================================
    // INVARIANT 3: No settled party appears in the output, and no output
    // amount is zero or negative.
    // ===================================================================
    #[test]
    fn output_entries_are_meaningful(entries in arb_entries()) {
        let plan = simplify_debts(&entries);
        let input_net = net_positions(&entries);

        for payment in &plan {
            prop_assert!(payment.amount > Decimal::ZERO);
            let from = payment.from.key().unwrap().to_string();
            let to = payment.to.key().unwrap().to_string();
            prop_assert!(input_net[&from] < -SETTLED_EPSILON);
            prop_assert!(input_net[&to] > SETTLED_EPSILON);
        }
    }

    // ===================================================================
    // INVARIANT 4: The plan never has more payments than debtors plus
    // creditors minus one (the classic bound for greedy matching).
    // ===================================================================
    #[test]
    fn plan_size_is_bounded(entries in arb_entries()) {
        let plan = simplify_debts(&entries);
        let net = net_positions(&entries);
        let debtors = net.values().filter(|v| **v < -SETTLED_EPSILON).count();
        let creditors = net.values().filter(|v| **v > SETTLED_EPSILON).count();

        if debtors == 0 || creditors == 0 {
            prop_assert!(plan.is_empty());
        } else {
            prop_assert!(plan.len() <= debtors + creditors - 1);
        }
    }

    // ===================================================================
    // INVARIANT 5: Simplification is deterministic — same input, same
    // plan, payment by payment.
    // ===================================================================
    #[test]
    fn simplification_is_deterministic(entries in arb_entries()) {
        let first = simplify_debts(&entries);
        let second = simplify_debts(&entries);
        prop_assert_eq!(first.len(), second.len());
        for (x, y) in first.iter().zip(second.iter()) {
            prop_assert_eq!(&x.from, &y.from);
            prop_assert_eq!(&x.to, &y.to);
            prop_assert_eq!(x.amount, y.amount);
        }
    }

    // ===================================================================
    // INVARIANT 6: Simplifying a plan again changes nothing — the plan
    // is already fully netted (idempotence up to ordering).
    // ===================================================================
    #[test]
    fn simplification_is_idempotent(entries in arb_entries()) {
        let plan = simplify_debts(&entries);
        let replanned = simplify_debts(&plan);

        let total: Decimal = plan.iter().map(|e| e.amount).sum();
        let retotal: Decimal = replanned.iter().map(|e| e.amount).sum();
        prop_assert_eq!(total, retotal);
        prop_assert_eq!(plan.len(), replanned.len());
    }

    // ===================================================================
    // INVARIANT 7: Mirrored debts vanish. Appending the exact reverse of
    // every entry always produces an empty plan.
    // ===================================================================
    #[test]
    fn mirrored_debts_cancel(entries in arb_entries()) {
        let mut mirrored = entries.clone();
        for entry in &entries {
            mirrored.push(BalanceEntry::new(
                entry.to.clone(),
                entry.from.clone(),
                entry.amount,
                "USD",
            ));
        }
        prop_assert!(simplify_debts(&mirrored).is_empty());
    }
}
