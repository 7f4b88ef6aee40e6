//! Greedy reduction of a multi-party debt graph to pairwise payments.

pub mod greedy;

pub use greedy::{simplify_debts, SETTLED_EPSILON};
