//! Chart handlers: one per dashboard slot.
//!
//! A handler is `render(chart, dataset, selection) -> Figure`. It has no state,
//! so two calls with the same inputs return equal figures and calls may run
//! concurrently over a shared dataset.

use serde::Serialize;

use crate::aggregate::{
    self, BreakdownLeaf, GroupTotal, MonthTotal, RelationPoint, ShareSlice,
};
use crate::data::Dataset;
use crate::domain::{Control, FilterDims, FilterSelection};

/// The eight chart slots, in layout order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartId {
    SalesTrend,
    CategoryBar,
    CategoryShare,
    SubCategoryShare,
    RegionShare,
    SegmentShare,
    Breakdown,
    SalesVsProfit,
}

/// Visual form a renderer should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Donut,
    Treemap,
    Scatter,
}

impl ChartId {
    pub const ALL: [ChartId; 8] = [
        ChartId::SalesTrend,
        ChartId::CategoryBar,
        ChartId::CategoryShare,
        ChartId::SubCategoryShare,
        ChartId::RegionShare,
        ChartId::SegmentShare,
        ChartId::Breakdown,
        ChartId::SalesVsProfit,
    ];

    /// Stable slot identifier.
    pub fn slot(self) -> &'static str {
        match self {
            ChartId::SalesTrend => "line-chart-sales",
            ChartId::CategoryBar => "bar-chart-category",
            ChartId::CategoryShare => "pie-chart-category",
            ChartId::SubCategoryShare => "pie-chart-subcat",
            ChartId::RegionShare => "pie-chart-region",
            ChartId::SegmentShare => "pie-chart-segment",
            ChartId::Breakdown => "treemap-plot",
            ChartId::SalesVsProfit => "relation-chart-svp",
        }
    }

    pub fn from_slot(slot: &str) -> Option<ChartId> {
        ChartId::ALL.into_iter().find(|c| c.slot() == slot)
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartId::SalesTrend => "Sales Performance",
            ChartId::CategoryBar => "Total Sales by Category",
            ChartId::CategoryShare => "Category Wise Sales",
            ChartId::SubCategoryShare => "Sales of Goods",
            ChartId::RegionShare => "Region Wise Sales",
            ChartId::SegmentShare => "Consumer Segmentation",
            ChartId::Breakdown => "Sales Breakdown",
            ChartId::SalesVsProfit => "Relationship between Sales and Profits",
        }
    }

    pub fn kind(self) -> ChartKind {
        match self {
            ChartId::SalesTrend => ChartKind::Line,
            ChartId::CategoryBar => ChartKind::Bar,
            ChartId::CategoryShare
            | ChartId::SubCategoryShare
            | ChartId::RegionShare
            | ChartId::SegmentShare => ChartKind::Donut,
            ChartId::Breakdown => ChartKind::Treemap,
            ChartId::SalesVsProfit => ChartKind::Scatter,
        }
    }

    /// Categorical filters this chart applies on top of the date window.
    pub fn filters(self) -> FilterDims {
        match self {
            ChartId::CategoryBar | ChartId::CategoryShare => FilterDims::REGION_ONLY,
            ChartId::RegionShare => FilterDims::CATEGORY_ONLY,
            _ => FilterDims::ALL,
        }
    }

    /// Whether a change of `control` requires this chart to be recomputed.
    pub fn depends_on(self, control: Control) -> bool {
        let dims = self.filters();
        match control {
            Control::StartDate | Control::EndDate => true,
            Control::Regions => dims.region,
            Control::Categories => dims.category,
        }
    }

    fn axis_labels(self) -> (Option<&'static str>, Option<&'static str>) {
        match self {
            ChartId::SalesTrend => (Some("Month"), Some("Amount")),
            ChartId::CategoryBar => (Some("Category"), Some("Sales")),
            ChartId::SalesVsProfit => (Some("Sales"), Some("Profit")),
            _ => (None, None),
        }
    }
}

/// Charts that listen to `control`, in slot order.
pub fn affected_by(control: Control) -> Vec<ChartId> {
    ChartId::ALL
        .into_iter()
        .filter(|c| c.depends_on(control))
        .collect()
}

/// Aggregated data, tagged by shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", content = "rows", rename_all = "lowercase")]
pub enum FigureData {
    Monthly(Vec<MonthTotal>),
    Grouped(Vec<LabeledTotal>),
    Shares(Vec<ShareSlice>),
    Hierarchy(Vec<BreakdownLeaf>),
    Points(Vec<RelationPoint>),
}

impl FigureData {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        match self {
            FigureData::Monthly(v) => v.len(),
            FigureData::Grouped(v) => v.len(),
            FigureData::Shares(v) => v.len(),
            FigureData::Hierarchy(v) => v.len(),
            FigureData::Points(v) => v.len(),
        }
    }
}

/// A grouped total with its bar label (`$1,234.56`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledTotal {
    pub key: String,
    pub sales: f64,
    pub label: String,
}

impl From<GroupTotal> for LabeledTotal {
    fn from(g: GroupTotal) -> Self {
        LabeledTotal {
            label: format_currency(g.sales),
            key: g.key,
            sales: g.sales,
        }
    }
}

/// Everything a renderer needs to draw one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub chart: ChartId,
    pub slot: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub x_label: Option<&'static str>,
    pub y_label: Option<&'static str>,
    pub data: FigureData,
}

impl Figure {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Compute the figure for one chart slot.
pub fn render(chart: ChartId, dataset: &Dataset, selection: &FilterSelection) -> Figure {
    let data = match chart {
        ChartId::SalesTrend => FigureData::Monthly(aggregate::monthly_sales_trend(dataset, selection)),
        ChartId::CategoryBar => FigureData::Grouped(
            aggregate::sales_by_category(dataset, selection)
                .into_iter()
                .map(LabeledTotal::from)
                .collect(),
        ),
        ChartId::CategoryShare => FigureData::Shares(aggregate::category_share(dataset, selection)),
        ChartId::SubCategoryShare => FigureData::Shares(aggregate::sub_category_share(dataset, selection)),
        ChartId::RegionShare => FigureData::Shares(aggregate::region_share(dataset, selection)),
        ChartId::SegmentShare => FigureData::Shares(aggregate::segment_share(dataset, selection)),
        ChartId::Breakdown => FigureData::Hierarchy(aggregate::sales_breakdown(dataset, selection)),
        ChartId::SalesVsProfit => FigureData::Points(aggregate::sales_profit_relation(dataset, selection)),
    };
    let (x_label, y_label) = chart.axis_labels();
    Figure {
        chart,
        slot: chart.slot(),
        title: chart.title(),
        kind: chart.kind(),
        x_label,
        y_label,
        data,
    }
}

/// Format an amount as `$1,234.56` (negative: `-$1,234.56`).
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}
