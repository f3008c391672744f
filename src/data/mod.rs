//! The order dataset: loading and read-only access.

#[cfg(test)]
pub mod sample;
pub mod store;

pub use store::Dataset;
