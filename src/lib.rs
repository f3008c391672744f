//! `salesdash` library crate.
//!
//! The binary (`salesdash`) is a thin wrapper around this library so that:
//!
//! - the filter/aggregation core is testable without spawning processes
//! - the TUI, the text report and the exporters share one pipeline
//! - code stays easy to navigate as the project grows

pub mod aggregate;
pub mod app;
pub mod charts;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod filter;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod tui;
