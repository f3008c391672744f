//! Small hand-built datasets.
//!
//! Deterministic fixtures for the unit tests; nothing here touches the
//! filesystem.

use chrono::NaiveDate;

use crate::data::Dataset;
use crate::domain::OrderRecord;

/// Build a record with the fields the filters and aggregations look at.
///
/// Ship date is the order date; sub-category, segment, profit and quantity get
/// neutral defaults that callers may overwrite.
pub fn record(order_date: NaiveDate, region: &str, category: &str, sales: f64) -> OrderRecord {
    OrderRecord {
        order_date,
        ship_date: order_date,
        region: region.to_string(),
        category: category.to_string(),
        sub_category: format!("{category} (all)"),
        segment: "Consumer".to_string(),
        sales,
        profit: 0.0,
        quantity: 1,
    }
}

/// The three-order dataset used throughout the tests:
///
/// | order date | region | category  | sales |
/// |------------|--------|-----------|-------|
/// | 2023-01-05 | East   | Furniture | 100   |
/// | 2023-02-10 | West   | Furniture | 200   |
/// | 2023-02-20 | East   | Tech      | 50    |
pub fn three_row_dataset() -> Dataset {
    let d = |m, day| NaiveDate::from_ymd_opt(2023, m, day).expect("valid sample date");
    let mut rows = vec![
        record(d(1, 5), "East", "Furniture", 100.0),
        record(d(2, 10), "West", "Furniture", 200.0),
        record(d(2, 20), "East", "Tech", 50.0),
    ];
    rows[0].sub_category = "Chairs".to_string();
    rows[0].segment = "Consumer".to_string();
    rows[0].profit = 20.0;
    rows[0].quantity = 2;

    rows[1].sub_category = "Tables".to_string();
    rows[1].segment = "Corporate".to_string();
    rows[1].profit = -15.0;
    rows[1].quantity = 1;

    rows[2].sub_category = "Phones".to_string();
    rows[2].segment = "Consumer".to_string();
    rows[2].profit = 12.5;
    rows[2].quantity = 5;

    Dataset::from_records(rows)
}
