//! Plotting helpers.
//!
//! Current implementation is an ASCII renderer for terminal output.

pub mod ascii;
