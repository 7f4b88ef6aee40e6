use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a party in the expense network.
///
/// A party is either a registered user (`user_id`) or an ad-hoc participant
/// (`participant_id`) added to a group without an account. At least one of
/// the two ids must be present for the reference to resolve; references with
/// neither are unresolvable and are dropped by the debt simplifier.
///
/// # Examples
///
/// ```
/// use split_engine::core::person::PersonRef;
///
/// let alice = PersonRef::user("user-alice");
/// let guest = PersonRef::participant("guest-7");
/// assert!(alice.key().is_some());
/// assert_ne!(alice.key(), guest.key());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PersonRef {
    /// Reference a registered user.
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            user_id: Some(id.into()),
            participant_id: None,
            name: None,
        }
    }

    /// Reference an ad-hoc participant without an account.
    pub fn participant(id: impl Into<String>) -> Self {
        Self {
            user_id: None,
            participant_id: Some(id.into()),
            name: None,
        }
    }

    /// Attach a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The canonical key identifying this party, or `None` when the
    /// reference carries no id at all. User ids take precedence over
    /// participant ids so a person known both ways keys consistently.
    pub fn key(&self) -> Option<PersonKey> {
        if let Some(id) = &self.user_id {
            return Some(PersonKey(format!("u:{id}")));
        }
        self.participant_id
            .as_ref()
            .map(|id| PersonKey(format!("p:{id}")))
    }

    /// True when the reference resolves to a party.
    pub fn is_resolvable(&self) -> bool {
        self.user_id.is_some() || self.participant_id.is_some()
    }

    /// True when both references identify the same party.
    pub fn same_party(&self, other: &PersonRef) -> bool {
        match (self.key(), other.key()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Canonical identity key for a party, namespaced by id kind so a user id
/// and a participant id can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonKey(String);

impl PersonKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolves a display name for a party reference.
///
/// Aggregation and simplification never format names themselves; callers
/// inject a resolver so a richer implementation (profile lookups, contact
/// books) can be substituted without touching the numeric pipeline.
pub trait NameResolver {
    fn display_name(&self, person: &PersonRef) -> String;
}

/// Default resolver: explicit name, else a truncated form of whichever id
/// is present, else `"Unknown"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncatedIdResolver;

impl NameResolver for TruncatedIdResolver {
    fn display_name(&self, person: &PersonRef) -> String {
        if let Some(name) = &person.name {
            if !name.is_empty() {
                return name.clone();
            }
        }
        let id = person
            .user_id
            .as_deref()
            .or(person.participant_id.as_deref());
        match id {
            Some(id) if id.chars().count() > 8 => {
                let short: String = id.chars().take(8).collect();
                format!("{short}…")
            }
            Some(id) => id.to_string(),
            None => "Unknown".to_string(),
        }
    }
}
