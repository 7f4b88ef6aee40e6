use crate::aggregate::provider::{DataProvider, ProviderError};
use crate::convert::converter::CurrencyConverter;
use crate::core::balance::{BalanceEntry, BalanceResult};
use crate::core::currency::{CurrencyCode, ManualRate};
use crate::core::expense::ExpenseContribution;
use crate::core::person::{PersonKey, PersonRef};
use crate::core::settlement::{Settlement, SettlementKind};
use crate::simplify::simplify_debts;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

/// Parameters of one balance computation.
#[derive(Debug, Clone)]
pub struct BalanceOptions {
    /// Run the debt simplifier over the aggregated balances.
    pub simplified: bool,
    /// Currency every output amount is expressed in.
    pub target_currency: CurrencyCode,
}

impl BalanceOptions {
    pub fn direct(target_currency: impl Into<CurrencyCode>) -> Self {
        Self {
            simplified: false,
            target_currency: target_currency.into(),
        }
    }

    pub fn simplified(target_currency: impl Into<CurrencyCode>) -> Self {
        Self {
            simplified: true,
            target_currency: target_currency.into(),
        }
    }
}

/// One raw debt edge: a split owed to the payer of a single expense,
/// later offset by settlements and collapsed into pair balances.
struct RawEdge {
    from: PersonRef,
    to: PersonRef,
    from_key: PersonKey,
    to_key: PersonKey,
    amount: Decimal,
    currency: CurrencyCode,
    contribution: Option<ExpenseContribution>,
    manual_rate: Option<ManualRate>,
}

/// Turns expense, split, and settlement records into pairwise balances.
///
/// Collaborators are injected rather than reached through globals so a
/// computation is a deterministic function of its inputs: a [`DataProvider`]
/// supplies the working set and a [`CurrencyConverter`] handles any
/// cross-currency edges. Results are immutable snapshots; callers recompute
/// on demand (typically when a settlement is created or deleted) and
/// replace the prior result wholesale.
#[derive(Clone)]
pub struct BalanceAggregator {
    provider: Arc<dyn DataProvider>,
    converter: CurrencyConverter,
}

impl BalanceAggregator {
    pub fn new(provider: Arc<dyn DataProvider>, converter: CurrencyConverter) -> Self {
        Self {
            provider,
            converter,
        }
    }

    /// Compute who owes whom, in `options.target_currency`.
    ///
    /// Provider failures propagate unmodified — no retry, no partial
    /// result. Conversion failures never surface; the converter always
    /// resolves to a numeric rate.
    pub async fn calculate_balances(
        &self,
        options: &BalanceOptions,
    ) -> Result<BalanceResult, ProviderError> {
        let expenses = self.provider.expenses().await?;
        let settlements = self.provider.settlements().await?;

        let mut edges: Vec<RawEdge> = Vec::new();
        let mut total_expenses = Decimal::ZERO;

        for expense in expenses.iter().filter(|e| !e.is_deleted) {
            total_expenses += self
                .converter
                .convert_amount(
                    expense.amount,
                    &expense.currency,
                    &options.target_currency,
                    expense.manual_exchange_rate.as_ref(),
                )
                .await;

            let payer_key = match expense.paid_by.key() {
                Some(key) => key,
                None => {
                    log::debug!("expense {} has unresolvable payer, skipping", expense.id);
                    continue;
                }
            };

            for split in &expense.splits {
                if split.party.same_party(&expense.paid_by) {
                    continue;
                }
                let ower_key = match split.party.key() {
                    Some(key) => key,
                    None => {
                        log::debug!(
                            "expense {} split has unresolvable party, skipping",
                            expense.id
                        );
                        continue;
                    }
                };
                edges.push(RawEdge {
                    from: split.party.clone(),
                    to: expense.paid_by.clone(),
                    from_key: ower_key,
                    to_key: payer_key.clone(),
                    amount: split.amount,
                    currency: expense.currency.clone(),
                    contribution: Some(expense.contribution(split.amount)),
                    manual_rate: expense.manual_exchange_rate.clone(),
                });
            }
        }

        for settlement in &settlements {
            apply_settlement(&mut edges, settlement);
        }

        // Convert surviving edges one by one; a slow fetch delays the whole
        // computation but never the host process.
        for edge in &mut edges {
            if edge.currency != options.target_currency {
                edge.amount = self
                    .converter
                    .convert_amount(
                        edge.amount,
                        &edge.currency,
                        &options.target_currency,
                        edge.manual_rate.as_ref(),
                    )
                    .await;
                edge.currency = options.target_currency.clone();
            }
        }

        let entries = collapse_pairs(edges, &options.target_currency, !options.simplified);

        let balances = if options.simplified {
            simplify_debts(&entries)
        } else {
            entries
        };

        log::debug!(
            "computed {} balance entr{} over {} expense(s)",
            balances.len(),
            if balances.len() == 1 { "y" } else { "ies" },
            expenses.len(),
        );

        Ok(BalanceResult {
            balances,
            total_expenses,
            currency: options.target_currency.clone(),
        })
    }
}

/// Net one settlement against the raw edges, in the settlement's currency.
///
/// A global settlement offsets the pair's outstanding balance toward zero
/// in either direction: the recorded direction is consumed first, then the
/// reverse, and anything beyond both is dropped. A partial settlement
/// offsets only the recorded direction; an overshoot flips into a residual
/// edge in the opposite direction. Tag settlements never apply here.
fn apply_settlement(edges: &mut Vec<RawEdge>, settlement: &Settlement) {
    if settlement.kind == SettlementKind::Tag {
        return;
    }
    let (from_key, to_key) = match (settlement.from.key(), settlement.to.key()) {
        (Some(f), Some(t)) => (f, t),
        _ => {
            log::debug!(
                "settlement {} has unresolvable party, skipping",
                settlement.id
            );
            return;
        }
    };

    let mut remaining = settlement.amount;
    consume_direction(edges, &settlement.currency, &from_key, &to_key, &mut remaining);

    match settlement.kind {
        SettlementKind::Global => {
            consume_direction(edges, &settlement.currency, &to_key, &from_key, &mut remaining);
        }
        SettlementKind::Partial => {
            if remaining > Decimal::ZERO {
                // The payment exceeded the recorded direction: direction
                // flips and the residual carries no expense attribution.
                edges.push(RawEdge {
                    from: settlement.to.clone(),
                    to: settlement.from.clone(),
                    from_key: to_key,
                    to_key: from_key,
                    amount: remaining,
                    currency: settlement.currency.clone(),
                    contribution: None,
                    manual_rate: None,
                });
            }
        }
        SettlementKind::Tag => unreachable!("tag settlements filtered above"),
    }
}

fn consume_direction(
    edges: &mut [RawEdge],
    currency: &CurrencyCode,
    from_key: &PersonKey,
    to_key: &PersonKey,
    remaining: &mut Decimal,
) {
    for edge in edges.iter_mut() {
        if *remaining == Decimal::ZERO {
            return;
        }
        if &edge.currency == currency && &edge.from_key == from_key && &edge.to_key == to_key {
            let take = edge.amount.min(*remaining);
            edge.amount -= take;
            *remaining -= take;
        }
    }
}

/// Collapse edges sharing the same unordered party pair into one entry,
/// netting opposing directions. Pairs that net to exactly zero vanish.
fn collapse_pairs(
    edges: Vec<RawEdge>,
    currency: &CurrencyCode,
    keep_contributions: bool,
) -> Vec<BalanceEntry> {
    struct PairState {
        a: PersonRef,
        b: PersonRef,
        /// Signed amount: positive means `a` owes `b`.
        net: Decimal,
        contributions: Vec<ExpenseContribution>,
    }

    let mut pairs: HashMap<(PersonKey, PersonKey), PairState> = HashMap::new();

    for edge in edges {
        if edge.amount == Decimal::ZERO {
            continue;
        }
        let (key, a_owes_b) = if edge.from_key <= edge.to_key {
            ((edge.from_key.clone(), edge.to_key.clone()), true)
        } else {
            ((edge.to_key.clone(), edge.from_key.clone()), false)
        };
        let state = pairs.entry(key).or_insert_with(|| PairState {
            a: if a_owes_b {
                edge.from.clone()
            } else {
                edge.to.clone()
            },
            b: if a_owes_b {
                edge.to.clone()
            } else {
                edge.from.clone()
            },
            net: Decimal::ZERO,
            contributions: Vec::new(),
        });
        if a_owes_b {
            state.net += edge.amount;
        } else {
            state.net -= edge.amount;
        }
        if keep_contributions {
            if let Some(contribution) = edge.contribution {
                state.contributions.push(contribution);
            }
        }
    }

    let mut entries: Vec<BalanceEntry> = pairs
        .into_values()
        .filter(|state| state.net != Decimal::ZERO)
        .map(|state| {
            let (from, to) = if state.net > Decimal::ZERO {
                (state.a, state.b)
            } else {
                (state.b, state.a)
            };
            BalanceEntry::new(from, to, state.net.abs(), currency.clone())
                .with_contributions(state.contributions)
        })
        .collect();

    // Deterministic output order regardless of map iteration.
    entries.sort_by(|x, y| {
        x.from
            .key()
            .cmp(&y.from.key())
            .then_with(|| x.to.key().cmp(&y.to.key()))
    });
    entries
}
