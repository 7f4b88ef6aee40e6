//! Currency conversion with a manual-override / cache / live-fetch chain.

pub mod cache;
pub mod converter;
pub mod fetcher;
