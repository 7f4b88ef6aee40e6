//! Synthetic data generation for benchmarks and CLI experiments.

pub mod generator;

pub use generator::{generate_random_network, NetworkConfig};
