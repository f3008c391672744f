//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - order rows as loaded from the sheet (`OrderRecord`)
//! - the filter control state (`FilterSelection`, `Restriction`, `Control`)
//! - calendar month keys for the time series (`Month`)

pub mod types;

pub use types::*;
