//! Reporting utilities: selection summary and formatted terminal output.

pub mod format;

pub use format::{format_body, format_figure, format_header};

use crate::data::Dataset;
use crate::domain::{FilterDims, FilterSelection};
use crate::filter::build;

/// Headline figures for the orders the full selection admits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionSummary {
    pub orders: usize,
    pub sales: f64,
    pub profit: f64,
    pub quantity: i64,
}

/// Totals over the records matching every filter of `selection`.
pub fn summarize(dataset: &Dataset, selection: &FilterSelection) -> SelectionSummary {
    let scoped = selection.scoped(FilterDims::ALL);
    dataset
        .filtered(build(&scoped))
        .fold(SelectionSummary::default(), |mut acc, r| {
            acc.orders += 1;
            acc.sales += r.sales;
            acc.profit += r.profit;
            acc.quantity += r.quantity;
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::three_row_dataset;

    #[test]
    fn summary_over_full_range() {
        let ds = three_row_dataset();
        let sel = ds.default_selection().unwrap();
        let s = summarize(&ds, &sel);
        assert_eq!(s.orders, 3);
        assert_eq!(s.sales, 350.0);
        assert_eq!(s.profit, 17.5);
        assert_eq!(s.quantity, 8);
    }

    #[test]
    fn summary_respects_restrictions() {
        let ds = three_row_dataset();
        let sel = ds.default_selection().unwrap().with_regions(["East"]);
        let s = summarize(&ds, &sel);
        assert_eq!(s.orders, 2);
        assert_eq!(s.sales, 150.0);
    }
}
