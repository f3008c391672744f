//! The chart aggregation catalog.
//!
//! Each function takes the dataset plus the current selection, scopes the
//! selection to the dimensions its chart listens to, filters through
//! `filter::build`, and summarizes the subset. All functions are pure; an empty
//! subset produces an empty result.
//!
//! Ordering: the monthly trend is chronological. Every other grouping is
//! sorted lexicographically by its key (tuple order for the breakdown), so
//! results do not depend on row order.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::Dataset;
use crate::domain::{FilterDims, FilterSelection, Month, OrderRecord};
use crate::filter::build;

/// Sales summed over one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: Month,
    pub sales: f64,
}

/// Sales summed over one group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub sales: f64,
}

/// A group's sales plus its fraction of the subset total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareSlice {
    pub key: String,
    pub sales: f64,
    /// `sales / total`, or `0.0` when the total is zero.
    pub share: f64,
}

/// Sales for one region / category / sub-category path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownLeaf {
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub sales: f64,
}

/// One order as a point in the sales/profit plane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationPoint {
    pub sales: f64,
    pub profit: f64,
    pub quantity: i64,
}

fn subset<'a>(
    dataset: &'a Dataset,
    selection: &'a FilterSelection,
) -> impl Iterator<Item = &'a OrderRecord> {
    dataset.filtered(build(selection))
}

fn sum_by<'a, F>(rows: impl Iterator<Item = &'a OrderRecord>, key: F) -> Vec<GroupTotal>
where
    F: Fn(&'a OrderRecord) -> &'a str,
{
    let mut totals: BTreeMap<&'a str, f64> = BTreeMap::new();
    for r in rows {
        *totals.entry(key(r)).or_insert(0.0) += r.sales;
    }
    totals
        .into_iter()
        .map(|(key, sales)| GroupTotal {
            key: key.to_string(),
            sales,
        })
        .collect()
}

fn to_shares(groups: Vec<GroupTotal>) -> Vec<ShareSlice> {
    let total: f64 = groups.iter().map(|g| g.sales).sum();
    groups
        .into_iter()
        .map(|g| ShareSlice {
            share: if total != 0.0 { g.sales / total } else { 0.0 },
            key: g.key,
            sales: g.sales,
        })
        .collect()
}

/// Monthly sales, ascending by month. Filters: date, region, category.
pub fn monthly_sales_trend(dataset: &Dataset, selection: &FilterSelection) -> Vec<MonthTotal> {
    let scoped = selection.scoped(FilterDims::ALL);
    let mut totals: BTreeMap<Month, f64> = BTreeMap::new();
    for r in subset(dataset, &scoped) {
        *totals.entry(Month::of(r.order_date)).or_insert(0.0) += r.sales;
    }
    totals
        .into_iter()
        .map(|(month, sales)| MonthTotal { month, sales })
        .collect()
}

/// Sales per category. Filters: date, region.
pub fn sales_by_category(dataset: &Dataset, selection: &FilterSelection) -> Vec<GroupTotal> {
    let scoped = selection.scoped(FilterDims::REGION_ONLY);
    sum_by(subset(dataset, &scoped), |r| r.category.as_str())
}

/// Category share of sales. Filters: date, region.
pub fn category_share(dataset: &Dataset, selection: &FilterSelection) -> Vec<ShareSlice> {
    to_shares(sales_by_category(dataset, selection))
}

/// Sub-category share of sales. Filters: date, region, category.
pub fn sub_category_share(dataset: &Dataset, selection: &FilterSelection) -> Vec<ShareSlice> {
    let scoped = selection.scoped(FilterDims::ALL);
    to_shares(sum_by(subset(dataset, &scoped), |r| r.sub_category.as_str()))
}

/// Region share of sales. Filters: date, category.
pub fn region_share(dataset: &Dataset, selection: &FilterSelection) -> Vec<ShareSlice> {
    let scoped = selection.scoped(FilterDims::CATEGORY_ONLY);
    to_shares(sum_by(subset(dataset, &scoped), |r| r.region.as_str()))
}

/// Segment share of sales. Filters: date, region, category.
pub fn segment_share(dataset: &Dataset, selection: &FilterSelection) -> Vec<ShareSlice> {
    let scoped = selection.scoped(FilterDims::ALL);
    to_shares(sum_by(subset(dataset, &scoped), |r| r.segment.as_str()))
}

/// Sales over the region → category → sub-category hierarchy.
/// Filters: date, region, category.
pub fn sales_breakdown(dataset: &Dataset, selection: &FilterSelection) -> Vec<BreakdownLeaf> {
    let scoped = selection.scoped(FilterDims::ALL);
    let mut totals: BTreeMap<(&str, &str, &str), f64> = BTreeMap::new();
    for r in subset(dataset, &scoped) {
        let key = (r.region.as_str(), r.category.as_str(), r.sub_category.as_str());
        *totals.entry(key).or_insert(0.0) += r.sales;
    }
    totals
        .into_iter()
        .map(|((region, category, sub_category), sales)| BreakdownLeaf {
            region: region.to_string(),
            category: category.to_string(),
            sub_category: sub_category.to_string(),
            sales,
        })
        .collect()
}

/// Per-order (sales, profit, quantity) in source order. Filters: date, region, category.
pub fn sales_profit_relation(dataset: &Dataset, selection: &FilterSelection) -> Vec<RelationPoint> {
    let scoped = selection.scoped(FilterDims::ALL);
    subset(dataset, &scoped)
        .map(|r| RelationPoint {
            sales: r.sales,
            profit: r.profit,
            quantity: r.quantity,
        })
        .collect()
}

/// Parent-level totals of a breakdown, for drawing the upper treemap levels.
pub fn region_subtotals(leaves: &[BreakdownLeaf]) -> Vec<GroupTotal> {
    sum_leaves(leaves, |l| l.region.clone())
}

/// `(region, category, sales)` subtotals of a breakdown.
pub fn category_subtotals(leaves: &[BreakdownLeaf]) -> Vec<(String, String, f64)> {
    let mut totals: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for l in leaves {
        *totals.entry((l.region.as_str(), l.category.as_str())).or_insert(0.0) += l.sales;
    }
    totals
        .into_iter()
        .map(|((region, category), sales)| (region.to_string(), category.to_string(), sales))
        .collect()
}

fn sum_leaves(leaves: &[BreakdownLeaf], key: impl Fn(&BreakdownLeaf) -> String) -> Vec<GroupTotal> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for l in leaves {
        *totals.entry(key(l)).or_insert(0.0) += l.sales;
    }
    totals
        .into_iter()
        .map(|(key, sales)| GroupTotal { key, sales })
        .collect()
}
