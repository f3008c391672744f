//! Formatted terminal output for `salesdash report`.
//!
//! We keep formatting code in one place so:
//! - the filtering/aggregation code stays clean and testable
//! - output changes are localized (the tests below pin the layout)

use crate::aggregate::{BreakdownLeaf, MonthTotal, RelationPoint, ShareSlice, category_subtotals, region_subtotals};
use crate::charts::{Figure, FigureData, LabeledTotal, format_currency};
use crate::data::Dataset;
use crate::domain::{FilterSelection, Restriction};
use crate::plot::ascii::{render_bars, render_line_plot, render_scatter_plot};

use super::summarize;

const EMPTY: &str = "(no data for the current filters)";

/// Dataset and selection summary printed above the figures.
pub fn format_header(dataset: &Dataset, selection: &FilterSelection) -> String {
    let mut out = String::new();

    out.push_str("=== salesdash - Retail Sales Dashboard ===\n");
    if let Some(path) = dataset.source() {
        out.push_str(&format!("Source: {}\n", path.display()));
    }
    match dataset.order_date_bounds() {
        Some((min, max)) => out.push_str(&format!(
            "Orders: n={} | dates=[{min}, {max}]\n",
            dataset.len()
        )),
        None => out.push_str("Orders: n=0\n"),
    }

    out.push_str(&format!("Window: {} .. {}", selection.start, selection.end));
    if selection.is_reversed() {
        out.push_str(" (start after end: every chart is empty)");
    }
    out.push('\n');
    out.push_str(&format!("Regions: {}\n", fmt_restriction(&selection.regions)));
    out.push_str(&format!("Categories: {}\n", fmt_restriction(&selection.categories)));

    let s = summarize(dataset, selection);
    out.push_str(&format!(
        "Selected: orders={} | sales={} | profit={} | qty={}\n",
        s.orders,
        format_currency(s.sales),
        format_currency(s.profit),
        s.quantity
    ));

    out
}

/// One figure as a titled text block.
///
/// `width`/`height` size the plots; bar widths use half the width.
pub fn format_figure(figure: &Figure, width: usize, height: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("--- {} [{}] ---\n", figure.title, figure.slot));

    out.push_str(&format_body(figure, width, height));
    out
}

/// The figure's text without the title line.
pub fn format_body(figure: &Figure, width: usize, height: usize) -> String {
    if figure.is_empty() {
        return format!("{EMPTY}\n");
    }
    match &figure.data {
        FigureData::Monthly(rows) => format_monthly(rows, width, height),
        FigureData::Grouped(rows) => format_grouped(rows, width / 2),
        FigureData::Shares(rows) => format_shares(rows, width / 2),
        FigureData::Hierarchy(leaves) => format_hierarchy(leaves),
        FigureData::Points(points) => format_points(points, width, height),
    }
}

fn format_monthly(rows: &[MonthTotal], width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = rows
        .iter()
        .map(|r| (r.month.ordinal() as f64, r.sales))
        .collect();

    let mut out = render_line_plot(&points, width, height);
    out.push_str(&format!("{:<8} {:>16}\n", "month", "sales"));
    out.push_str(&format!("{:-<8} {:-<16}\n", "", ""));
    for r in rows {
        out.push_str(&format!("{:<8} {:>16}\n", r.month.to_string(), format_currency(r.sales)));
    }
    out
}

fn format_grouped(rows: &[LabeledTotal], bar_width: usize) -> String {
    let bars: Vec<(String, f64, String)> = rows
        .iter()
        .map(|r| (r.key.clone(), r.sales, r.label.clone()))
        .collect();
    render_bars(&bars, bar_width)
}

fn format_shares(rows: &[ShareSlice], bar_width: usize) -> String {
    let bars: Vec<(String, f64, String)> = rows
        .iter()
        .map(|r| {
            (
                r.key.clone(),
                r.share,
                format!("{:>5.1}%  {}", r.share * 100.0, format_currency(r.sales)),
            )
        })
        .collect();
    render_bars(&bars, bar_width)
}

/// Indented region > category > sub-category tree with subtotals.
fn format_hierarchy(leaves: &[BreakdownLeaf]) -> String {
    let categories = category_subtotals(leaves);
    let mut out = String::new();

    for region in region_subtotals(leaves) {
        out.push_str(&format!("{:<30} {:>16}\n", region.key, format_currency(region.sales)));
        for (_, category, sales) in categories.iter().filter(|(r, _, _)| *r == region.key) {
            out.push_str(&format!("  {:<28} {:>16}\n", category, format_currency(*sales)));
            for leaf in leaves
                .iter()
                .filter(|l| l.region == region.key && l.category == *category)
            {
                out.push_str(&format!(
                    "    {:<26} {:>16}\n",
                    truncate(&leaf.sub_category, 26),
                    format_currency(leaf.sales)
                ));
            }
        }
    }
    out
}

fn format_points(points: &[RelationPoint], width: usize, height: usize) -> String {
    let xy: Vec<(f64, f64)> = points.iter().map(|p| (p.sales, p.profit)).collect();
    let mut out = render_scatter_plot(&xy, width, height);

    let losses = points.iter().filter(|p| p.profit < 0.0).count();
    let profit: f64 = points.iter().map(|p| p.profit).sum();
    out.push_str(&format!(
        "n={} | loss-making={} | total profit={}\n",
        points.len(),
        losses,
        format_currency(profit)
    ));
    out
}

fn fmt_restriction(r: &Restriction) -> String {
    match r {
        Restriction::Unrestricted => "(all)".to_string(),
        Restriction::RestrictedTo(_) => r.values().join(", "),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartId, render};
    use crate::data::sample::three_row_dataset;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_lists_window_restrictions_and_totals() {
        let ds = three_row_dataset();
        let sel = ds.default_selection().unwrap().with_categories(["Tech", "Furniture"]);
        let txt = format_header(&ds, &sel);
        assert!(txt.contains("Orders: n=3 | dates=[2023-01-05, 2023-02-20]"));
        assert!(txt.contains("Window: 2023-01-05 .. 2023-02-20\n"));
        assert!(txt.contains("Regions: (all)"));
        assert!(txt.contains("Categories: Furniture, Tech"));
        assert!(txt.contains("Selected: orders=3 | sales=$350.00 | profit=$17.50 | qty=8"));
    }

    #[test]
    fn reversed_window_is_called_out() {
        let ds = three_row_dataset();
        let sel = FilterSelection::between(
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        );
        let txt = format_header(&ds, &sel);
        assert!(txt.contains("start after end"));
        assert!(txt.contains("orders=0"));
    }

    #[test]
    fn trend_prints_plot_and_month_table() {
        let ds = three_row_dataset();
        let sel = ds.default_selection().unwrap();
        let txt = format_figure(&render(ChartId::SalesTrend, &ds, &sel), 40, 8);
        assert!(txt.starts_with("--- Sales Performance [line-chart-sales] ---\n"));
        assert!(txt.contains("Plot: "));
        let rows: Vec<_> = txt.lines().filter(|l| l.starts_with("2023-")).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].ends_with("$100.00"));
        assert!(rows[1].ends_with("$250.00"));
    }

    #[test]
    fn shares_show_percentages() {
        let ds = three_row_dataset();
        let sel = ds.default_selection().unwrap();
        let txt = format_figure(&render(ChartId::RegionShare, &ds, &sel), 40, 8);
        let east = txt.lines().find(|l| l.starts_with("East")).unwrap();
        assert!(east.contains("42.9%"), "{east}");
        assert!(east.ends_with("$150.00"));
        let west = txt.lines().find(|l| l.starts_with("West")).unwrap();
        assert!(west.contains("57.1%"), "{west}");
    }

    #[test]
    fn breakdown_is_an_indented_tree() {
        let ds = three_row_dataset();
        let sel = ds.default_selection().unwrap();
        let txt = format_figure(&render(ChartId::Breakdown, &ds, &sel), 40, 8);
        let lines: Vec<_> = txt.lines().skip(1).map(str::trim_end).collect();
        let keys: Vec<_> = lines
            .iter()
            .map(|l| l.split("  $").next().unwrap_or("").trim_end())
            .collect();
        assert_eq!(
            keys,
            vec![
                "East",
                "  Furniture",
                "    Chairs",
                "  Tech",
                "    Phones",
                "West",
                "  Furniture",
                "    Tables",
            ]
        );
    }

    #[test]
    fn scatter_summarizes_losses() {
        let ds = three_row_dataset();
        let sel = ds.default_selection().unwrap();
        let txt = format_figure(&render(ChartId::SalesVsProfit, &ds, &sel), 40, 8);
        assert!(txt.contains("n=3 | loss-making=1 | total profit=$17.50"));
    }

    #[test]
    fn empty_figures_say_so() {
        let ds = three_row_dataset();
        let sel = ds.default_selection().unwrap().with_regions(["North"]);
        let txt = format_figure(&render(ChartId::CategoryBar, &ds, &sel), 40, 8);
        assert_eq!(
            txt,
            "--- Total Sales by Category [bar-chart-category] ---\n(no data for the current filters)\n"
        );
    }
}
