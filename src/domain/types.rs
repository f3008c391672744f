//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - held in memory for the whole process (the dataset)
//! - rebuilt cheaply on every control change (selections)
//! - exported to JSON/CSV alongside the figures they produce

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

/// One row of the order sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_date: NaiveDate,
    pub ship_date: NaiveDate,
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub segment: String,
    /// Sales amount (currency).
    pub sales: f64,
    /// Profit (signed currency).
    pub profit: f64,
    pub quantity: i64,
}

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months since year 0; handy as a continuous x coordinate.
    pub fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Optional set filter for one categorical dimension.
///
/// `Unrestricted` means "no restriction on this dimension", never "match nothing".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Restriction {
    #[default]
    Unrestricted,
    RestrictedTo(BTreeSet<String>),
}

impl Restriction {
    /// Build a restriction from selected values; an empty selection is `Unrestricted`.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if set.is_empty() {
            Restriction::Unrestricted
        } else {
            Restriction::RestrictedTo(set)
        }
    }

    pub fn admits(&self, value: &str) -> bool {
        match self {
            Restriction::Unrestricted => true,
            Restriction::RestrictedTo(set) => set.contains(value),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Restriction::Unrestricted)
    }

    /// Selected values (empty when unrestricted).
    pub fn values(&self) -> Vec<&str> {
        match self {
            Restriction::Unrestricted => Vec::new(),
            Restriction::RestrictedTo(set) => set.iter().map(String::as_str).collect(),
        }
    }

    /// Toggle one value in or out, collapsing back to `Unrestricted` when empty.
    pub fn toggle(&mut self, value: &str) {
        let mut set = match std::mem::take(self) {
            Restriction::Unrestricted => BTreeSet::new(),
            Restriction::RestrictedTo(set) => set,
        };
        if !set.remove(value) {
            set.insert(value.to_string());
        }
        *self = Restriction::from_values(set);
    }
}

/// Categorical filter dimensions a chart listens to (the date window always applies).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterDims {
    pub region: bool,
    pub category: bool,
}

impl FilterDims {
    pub const ALL: FilterDims = FilterDims {
        region: true,
        category: true,
    };
    pub const REGION_ONLY: FilterDims = FilterDims {
        region: true,
        category: false,
    };
    pub const CATEGORY_ONLY: FilterDims = FilterDims {
        region: false,
        category: true,
    };
}

/// The four user-facing filter controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    StartDate,
    EndDate,
    Regions,
    Categories,
}

impl Control {
    pub const ALL: [Control; 4] = [
        Control::StartDate,
        Control::EndDate,
        Control::Regions,
        Control::Categories,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Control::StartDate => "Start Date",
            Control::EndDate => "End Date",
            Control::Regions => "Region",
            Control::Categories => "Category",
        }
    }
}

/// Current state of the filter controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub regions: Restriction,
    pub categories: Restriction,
}

impl FilterSelection {
    /// Date window only, no categorical restriction.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            regions: Restriction::Unrestricted,
            categories: Restriction::Unrestricted,
        }
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = Restriction::from_values(regions);
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Restriction::from_values(categories);
        self
    }

    /// Relax the dimensions a chart does not listen to.
    pub fn scoped(&self, dims: FilterDims) -> FilterSelection {
        FilterSelection {
            start: self.start,
            end: self.end,
            regions: if dims.region {
                self.regions.clone()
            } else {
                Restriction::Unrestricted
            },
            categories: if dims.category {
                self.categories.clone()
            } else {
                Restriction::Unrestricted
            },
        }
    }

    pub fn is_reversed(&self) -> bool {
        self.start > self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn empty_values_mean_unrestricted() {
        let r = Restriction::from_values(Vec::<String>::new());
        assert!(r.is_unrestricted());
        assert!(r.admits("anything"));
    }

    #[test]
    fn toggle_collapses_back_to_unrestricted() {
        let mut r = Restriction::Unrestricted;
        r.toggle("East");
        assert!(r.admits("East"));
        assert!(!r.admits("West"));
        r.toggle("East");
        assert_eq!(r, Restriction::Unrestricted);
    }

    #[test]
    fn scoped_drops_unlistened_dimensions() {
        let sel = FilterSelection::between(d(2023, 1, 1), d(2023, 12, 31))
            .with_regions(["East"])
            .with_categories(["Furniture"]);

        let region_only = sel.scoped(FilterDims::REGION_ONLY);
        assert_eq!(region_only.regions, sel.regions);
        assert!(region_only.categories.is_unrestricted());

        let category_only = sel.scoped(FilterDims::CATEGORY_ONLY);
        assert!(category_only.regions.is_unrestricted());
        assert_eq!(category_only.categories, sel.categories);
    }

    #[test]
    fn month_orders_and_displays_chronologically() {
        let jan = Month::of(d(2023, 1, 31));
        let dec = Month::of(d(2022, 12, 1));
        assert!(dec < jan);
        assert_eq!(jan.to_string(), "2023-01");
        assert_eq!(jan.ordinal() - dec.ordinal(), 1);
    }
}
