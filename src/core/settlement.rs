use crate::core::currency::CurrencyCode;
use crate::core::person::PersonRef;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scope of a recorded settlement payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementKind {
    /// Offsets the outstanding balance between the pair in either direction.
    Global,
    /// Offsets only the specific recorded `from -> to` direction.
    Partial,
    /// Scoped to a tag-filtered view; never applies to global aggregation.
    Tag,
}

/// A recorded payment that offsets balances between two parties.
///
/// Settlements are input records, not computed output: they state that
/// `from` paid `to` an `amount` outside the expense flow, and the
/// aggregator nets them against the raw expense edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Uuid,
    pub from: PersonRef,
    pub to: PersonRef,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub kind: SettlementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub settlement_date: DateTime<Utc>,
}

impl Settlement {
    pub fn new(
        from: PersonRef,
        to: PersonRef,
        amount: Decimal,
        currency: impl Into<CurrencyCode>,
        kind: SettlementKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            amount,
            currency: currency.into(),
            kind,
            tag: None,
            settlement_date: Utc::now(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Whether this settlement applies to the balance between `a` and `b`
    /// at the global aggregation level.
    ///
    /// A global settlement matches the pair in either orientation; a partial
    /// settlement only in its exact recorded direction; a tag settlement
    /// never matches here (it only applies inside a tag-filtered view).
    pub fn matches_pair(&self, a: &PersonRef, b: &PersonRef) -> bool {
        match self.kind {
            SettlementKind::Global => {
                (self.from.same_party(a) && self.to.same_party(b))
                    || (self.from.same_party(b) && self.to.same_party(a))
            }
            SettlementKind::Partial => self.from.same_party(a) && self.to.same_party(b),
            SettlementKind::Tag => false,
        }
    }
}
