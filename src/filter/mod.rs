//! Row selection for the current filter controls.
//!
//! Every chart handler goes through `build`, so the date window and the two
//! optional set filters are defined in exactly one place.

use chrono::NaiveDate;

use crate::domain::{FilterSelection, OrderRecord, Restriction};

/// Conjunction of up to three clauses over an order record.
#[derive(Debug, Clone, Copy)]
pub struct Predicate<'s> {
    start: NaiveDate,
    end: NaiveDate,
    regions: &'s Restriction,
    categories: &'s Restriction,
}

impl Predicate<'_> {
    pub fn matches(&self, record: &OrderRecord) -> bool {
        self.in_window(record) && self.regions.admits(&record.region) && self.categories.admits(&record.category)
    }

    /// Inclusive on both ends; empty when `start > end`.
    pub fn in_window(&self, record: &OrderRecord) -> bool {
        self.start <= record.order_date && record.order_date <= self.end
    }

    pub fn matches_nothing(&self) -> bool {
        self.start > self.end
    }
}

/// Build the predicate for a selection.
pub fn build(selection: &FilterSelection) -> Predicate<'_> {
    Predicate {
        start: selection.start,
        end: selection.end,
        regions: &selection.regions,
        categories: &selection.categories,
    }
}
