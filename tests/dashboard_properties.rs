//! Property tests for the filter/aggregation pipeline over generated order sheets.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use salesdash::aggregate;
use salesdash::charts::{ChartId, FigureData, render};
use salesdash::data::Dataset;
use salesdash::domain::{FilterSelection, OrderRecord, Restriction};
use salesdash::filter::build;

const REGIONS: [&str; 4] = ["Central", "East", "South", "West"];
const CATEGORIES: [&str; 3] = ["Furniture", "Office Supplies", "Technology"];
const SEGMENTS: [&str; 3] = ["Consumer", "Corporate", "Home Office"];

fn day(offset: u32) -> NaiveDate {
    let base = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    base.checked_add_days(Days::new(u64::from(offset))).unwrap()
}

fn record_strategy() -> impl Strategy<Value = OrderRecord> {
    (
        0u32..365,
        0usize..REGIONS.len(),
        0usize..CATEGORIES.len(),
        0usize..3,
        0usize..SEGMENTS.len(),
        0u32..5_000,
        -500i32..500,
        1i64..10,
    )
        .prop_map(|(offset, r, c, sub, s, sales, profit, quantity)| OrderRecord {
            order_date: day(offset),
            ship_date: day(offset + 3),
            region: REGIONS[r].to_string(),
            category: CATEGORIES[c].to_string(),
            sub_category: format!("{} {sub}", CATEGORIES[c]),
            segment: SEGMENTS[s].to_string(),
            // Whole amounts keep every sum exact.
            sales: f64::from(sales),
            profit: f64::from(profit),
            quantity,
        })
}

fn dataset_strategy() -> impl Strategy<Value = Dataset> {
    proptest::collection::vec(record_strategy(), 0..60).prop_map(Dataset::from_records)
}

fn pick<'a>(pool: &[&'a str], mask: &[bool]) -> Vec<&'a str> {
    pool.iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(v, _)| *v)
        .collect()
}

fn selection_strategy() -> impl Strategy<Value = FilterSelection> {
    (
        0u32..380,
        0u32..380,
        proptest::collection::vec(any::<bool>(), REGIONS.len()),
        proptest::collection::vec(any::<bool>(), CATEGORIES.len()),
    )
        .prop_map(|(a, b, regions, categories)| {
            FilterSelection::between(day(a), day(b))
                .with_regions(pick(&REGIONS, &regions))
                .with_categories(pick(&CATEGORIES, &categories))
        })
}

fn admitted(r: &OrderRecord, sel: &FilterSelection) -> bool {
    sel.start <= r.order_date
        && r.order_date <= sel.end
        && sel.regions.admits(&r.region)
        && sel.categories.admits(&r.category)
}

proptest! {
    #[test]
    fn filter_is_sound_and_complete(ds in dataset_strategy(), sel in selection_strategy()) {
        let hits: Vec<&OrderRecord> = ds.filtered(build(&sel)).collect();
        let expected: Vec<&OrderRecord> = ds.records().iter().filter(|r| admitted(r, &sel)).collect();
        prop_assert_eq!(hits, expected);
    }

    #[test]
    fn handlers_are_idempotent(ds in dataset_strategy(), sel in selection_strategy()) {
        for chart in ChartId::ALL {
            prop_assert_eq!(render(chart, &ds, &sel), render(chart, &ds, &sel));
        }
    }

    #[test]
    fn widening_the_window_never_drops_rows(
        ds in dataset_strategy(),
        sel in selection_strategy(),
        widen_by in 0u64..60,
    ) {
        let mut wide = sel.clone();
        wide.start = sel.start.checked_sub_days(Days::new(widen_by)).unwrap();
        wide.end = sel.end.checked_add_days(Days::new(widen_by)).unwrap();

        let narrow_rows = aggregate::sales_profit_relation(&ds, &sel);
        let wide_rows = aggregate::sales_profit_relation(&ds, &wide);
        prop_assert!(wide_rows.len() >= narrow_rows.len());

        let narrow_total: f64 = aggregate::sales_by_category(&ds, &sel).iter().map(|g| g.sales).sum();
        let wide_total: f64 = aggregate::sales_by_category(&ds, &wide).iter().map(|g| g.sales).sum();
        prop_assert!(wide_total >= narrow_total);
    }

    #[test]
    fn selecting_every_value_equals_selecting_none(ds in dataset_strategy(), a in 0u32..380, b in 0u32..380) {
        let none = FilterSelection::between(day(a), day(b));
        let every = none.clone().with_regions(REGIONS).with_categories(CATEGORIES);
        for chart in ChartId::ALL {
            prop_assert_eq!(render(chart, &ds, &none), render(chart, &ds, &every));
        }
    }

    #[test]
    fn shares_sum_to_one_when_there_are_sales(ds in dataset_strategy(), sel in selection_strategy()) {
        for chart in [ChartId::CategoryShare, ChartId::SubCategoryShare, ChartId::RegionShare, ChartId::SegmentShare] {
            let FigureData::Shares(rows) = render(chart, &ds, &sel).data else {
                panic!("share chart without share data");
            };
            let total: f64 = rows.iter().map(|r| r.sales).sum();
            let shares: f64 = rows.iter().map(|r| r.share).sum();
            if total > 0.0 {
                prop_assert!((shares - 1.0).abs() < 1e-9, "{} shares sum to {}", chart.slot(), shares);
            } else {
                prop_assert!(rows.iter().all(|r| r.share == 0.0));
            }
        }
    }

    #[test]
    fn trend_and_breakdown_agree_on_the_total(ds in dataset_strategy(), sel in selection_strategy()) {
        let trend: f64 = aggregate::monthly_sales_trend(&ds, &sel).iter().map(|m| m.sales).sum();
        let leaves: f64 = aggregate::sales_breakdown(&ds, &sel).iter().map(|l| l.sales).sum();
        let points: f64 = aggregate::sales_profit_relation(&ds, &sel).iter().map(|p| p.sales).sum();
        prop_assert_eq!(trend, leaves);
        prop_assert_eq!(trend, points);
    }

    #[test]
    fn reversed_window_empties_every_chart(ds in dataset_strategy(), a in 0u32..380, gap in 1u32..30) {
        let sel = FilterSelection::between(day(a + gap), day(a));
        for chart in ChartId::ALL {
            prop_assert!(render(chart, &ds, &sel).is_empty());
        }
    }

    #[test]
    fn group_keys_are_unique_and_sorted(ds in dataset_strategy(), sel in selection_strategy()) {
        let keys: Vec<String> = aggregate::sales_by_category(&ds, &sel).into_iter().map(|g| g.key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(keys, sorted);

        let months: Vec<_> = aggregate::monthly_sales_trend(&ds, &sel).into_iter().map(|m| m.month).collect();
        prop_assert!(months.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn empty_restriction_is_not_match_nothing() {
    assert!(Restriction::from_values(Vec::<String>::new()).is_unrestricted());
    assert!(Restriction::Unrestricted.admits("anything"));
}
