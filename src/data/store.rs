//! Immutable in-memory dataset of order records.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::{FilterSelection, OrderRecord};
use crate::error::DatasetError;
use crate::filter::Predicate;
use crate::io::ingest::{read_table, records_from_table};

/// The loaded order sheet. Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<OrderRecord>,
    source: Option<PathBuf>,
}

impl Dataset {
    pub fn from_records(records: Vec<OrderRecord>) -> Self {
        Self {
            records,
            source: None,
        }
    }

    /// Load the first sheet (or the CSV) at `path`.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        Self::load_sheet(path, None)
    }

    /// Load a named sheet of a workbook; `sheet` is ignored for CSV input.
    pub fn load_sheet(path: &Path, sheet: Option<&str>) -> Result<Self, DatasetError> {
        let table = read_table(path, sheet)?;
        let records = records_from_table(&table)?;
        tracing::info!(
            path = %path.display(),
            rows = records.len(),
            "loaded order dataset"
        );
        Ok(Self {
            records,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Records matching `predicate`, in source order.
    pub fn filtered<'a>(&'a self, predicate: Predicate<'a>) -> impl Iterator<Item = &'a OrderRecord> {
        let records: &[OrderRecord] = if predicate.matches_nothing() { &[] } else { &self.records };
        records.iter().filter(move |r| predicate.matches(r))
    }

    /// Earliest and latest order date.
    pub fn order_date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.order_date).min()?;
        let max = self.records.iter().map(|r| r.order_date).max()?;
        Some((min, max))
    }

    /// Distinct regions in first-seen order.
    pub fn regions(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.region.as_str()))
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.category.as_str()))
    }

    /// Full date range, no categorical restriction. `None` for an empty dataset.
    pub fn default_selection(&self) -> Option<FilterSelection> {
        let (start, end) = self.order_date_bounds()?;
        Some(FilterSelection::between(start, end))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for v in values {
        if seen.insert(v) {
            out.push(v.to_string());
        }
    }
    out
}
