//! Foundational types: parties, currencies, expenses, settlements, balances.

pub mod balance;
pub mod currency;
pub mod expense;
pub mod person;
pub mod settlement;
