//! Order sheet ingest and normalization.
//!
//! This module is responsible for turning a CSV file or a spreadsheet into a
//! clean `Vec<OrderRecord>`.
//!
//! Design goals:
//! - **Strict schema** for the nine required columns (clear errors)
//! - **Fail-fast coercion**: the first uncoercible date or number aborts the
//!   load, naming the row and column; nothing is silently skipped
//! - **Deterministic behavior**: records keep source row order
//! - **Separation of concerns**: no filtering or aggregation here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::OrderRecord;
use crate::error::DatasetError;
use crate::io::workbook::{read_workbook, serial_to_date};
use crate::io::{RawCell, RawTable};

pub const COL_ORDER_DATE: &str = "Order Date";
pub const COL_SHIP_DATE: &str = "Ship Date";
pub const COL_REGION: &str = "Region";
pub const COL_CATEGORY: &str = "Category";
pub const COL_SUB_CATEGORY: &str = "Sub-Category";
pub const COL_SEGMENT: &str = "Segment";
pub const COL_SALES: &str = "Sales";
pub const COL_PROFIT: &str = "Profit";
pub const COL_QUANTITY: &str = "Quantity";

pub const REQUIRED_COLUMNS: [&str; 9] = [
    COL_ORDER_DATE,
    COL_SHIP_DATE,
    COL_REGION,
    COL_CATEGORY,
    COL_SUB_CATEGORY,
    COL_SEGMENT,
    COL_SALES,
    COL_PROFIT,
    COL_QUANTITY,
];

/// Source formats understood by `read_table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(SourceFormat::Csv),
            "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => Some(SourceFormat::Workbook),
            _ => None,
        }
    }
}

/// Read the raw table behind `path`, dispatching on the file extension.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::load(path, "file not found"));
    }
    match SourceFormat::from_path(path) {
        Some(SourceFormat::Csv) => read_csv(path),
        Some(SourceFormat::Workbook) => read_workbook(path, sheet),
        None => Err(DatasetError::load(
            path,
            "unsupported file type (expected .csv, .xls, .xlsx, .xlsm, .xlsb or .ods)",
        )),
    }
}

/// Read a CSV file into a raw table (all cells as text).
pub fn read_csv(path: &Path) -> Result<RawTable, DatasetError> {
    let file = File::open(path).map_err(|e| DatasetError::load(path, e.to_string()))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| DatasetError::load(path, format!("failed to read CSV headers: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            // +2: 1-based lines, after the header line.
            DatasetError::load(path, format!("CSV parse error on line {}: {e}", idx + 2))
        })?;
        rows.push(csv_row(&record));
    }

    Ok(RawTable { headers, rows })
}

fn csv_row(record: &StringRecord) -> Vec<RawCell> {
    record
        .iter()
        .map(|field| {
            if field.is_empty() {
                RawCell::Empty
            } else {
                RawCell::Text(field.to_string())
            }
        })
        .collect()
}

/// Validate the schema of a raw table and coerce every row into an `OrderRecord`.
///
/// Fully blank rows (trailing spreadsheet padding) are skipped.
pub fn records_from_table(table: &RawTable) -> Result<Vec<OrderRecord>, DatasetError> {
    let header_map = build_header_map(&table.headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (idx, row) in table.rows.iter().enumerate() {
        if row.iter().all(RawCell::is_empty) {
            continue;
        }
        // +2: 1-based row numbers, after the header row.
        let line = idx + 2;
        let cells = RowCells {
            row,
            header_map: &header_map,
            line,
        };
        records.push(parse_row(&cells)?);
    }
    Ok(records)
}

fn build_header_map(headers: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report a missing `Order Date` column.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), DatasetError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !header_map.contains_key(&normalize_header_name(col)))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    let list = missing
        .iter()
        .map(|c| format!("`{c}`"))
        .collect::<Vec<_>>()
        .join(", ");
    Err(DatasetError::schema(format!("Missing required column(s): {list}")))
}

struct RowCells<'a> {
    row: &'a [RawCell],
    header_map: &'a HashMap<String, usize>,
    line: usize,
}

impl RowCells<'_> {
    fn cell(&self, column: &str) -> &RawCell {
        self.header_map
            .get(&normalize_header_name(column))
            .and_then(|idx| self.row.get(*idx))
            .unwrap_or(&RawCell::Empty)
    }

    fn error(&self, column: &str, message: impl std::fmt::Display) -> DatasetError {
        DatasetError::schema(format!("row {}, column `{column}`: {message}", self.line))
    }

    fn date(&self, column: &str) -> Result<NaiveDate, DatasetError> {
        coerce_date(self.cell(column)).map_err(|e| self.error(column, e))
    }

    fn text(&self, column: &str) -> Result<String, DatasetError> {
        coerce_text(self.cell(column)).map_err(|e| self.error(column, e))
    }

    fn number(&self, column: &str) -> Result<f64, DatasetError> {
        coerce_number(self.cell(column)).map_err(|e| self.error(column, e))
    }

    fn integer(&self, column: &str) -> Result<i64, DatasetError> {
        coerce_integer(self.cell(column)).map_err(|e| self.error(column, e))
    }
}

fn parse_row(cells: &RowCells<'_>) -> Result<OrderRecord, DatasetError> {
    Ok(OrderRecord {
        order_date: cells.date(COL_ORDER_DATE)?,
        ship_date: cells.date(COL_SHIP_DATE)?,
        region: cells.text(COL_REGION)?,
        category: cells.text(COL_CATEGORY)?,
        sub_category: cells.text(COL_SUB_CATEGORY)?,
        segment: cells.text(COL_SEGMENT)?,
        sales: cells.number(COL_SALES)?,
        profit: cells.number(COL_PROFIT)?,
        quantity: cells.integer(COL_QUANTITY)?,
    })
}

/// Coerce a cell to a calendar date.
pub fn coerce_date(cell: &RawCell) -> Result<NaiveDate, String> {
    match cell {
        RawCell::Date(d) => Ok(*d),
        RawCell::Number(n) => serial_to_date(*n).ok_or_else(|| format!("invalid date serial {n}")),
        RawCell::Text(s) => parse_date(s),
        RawCell::Empty => Err("missing date".to_string()),
        RawCell::Error(e) => Err(format!("spreadsheet error value {e}")),
    }
}

/// Parse a date string in one of the accepted layouts.
///
/// Slash dates are month-first (`MM/DD/YYYY`, `M/D/YY`). A trailing time of day
/// is accepted and dropped.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();

    const DATE_FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m-%d-%Y"];
    const DATETIME_FMTS: [&str; 6] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
    ];

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    if let Some(d) = parse_slash_date(s) {
        return Ok(d);
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    Err(format!(
        "invalid date '{s}'. Expected one of: YYYY-MM-DD, MM/DD/YYYY, M/D/YY, YYYY/MM/DD, MM-DD-YYYY."
    ))
}

fn parse_slash_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    // Two-digit years need `%y`; `%Y` would read "23" as the year 23.
    let fmt = if parts[2].len() == 2 { "%m/%d/%y" } else { "%m/%d/%Y" };
    NaiveDate::parse_from_str(s, fmt).ok()
}

fn coerce_text(cell: &RawCell) -> Result<String, String> {
    match cell {
        RawCell::Text(s) => Ok(s.trim().to_string()),
        RawCell::Empty => Ok(String::new()),
        RawCell::Number(n) => Ok(n.to_string()),
        RawCell::Date(d) => Ok(d.to_string()),
        RawCell::Error(e) => Err(format!("spreadsheet error value {e}")),
    }
}

fn coerce_number(cell: &RawCell) -> Result<f64, String> {
    let value = match cell {
        RawCell::Number(n) => *n,
        RawCell::Text(s) => parse_amount(s)?,
        RawCell::Empty => return Err("missing number".to_string()),
        RawCell::Date(d) => return Err(format!("expected a number, found date {d}")),
        RawCell::Error(e) => return Err(format!("spreadsheet error value {e}")),
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err("non-finite number".to_string())
    }
}

fn coerce_integer(cell: &RawCell) -> Result<i64, String> {
    let value = coerce_number(cell)?;
    // `i64::MAX as f64` rounds up to 2^63, which is already out of range.
    if value.fract() != 0.0 || value.abs() >= i64::MAX as f64 {
        return Err(format!("expected a whole number, found {value}"));
    }
    Ok(value as i64)
}

/// Parse currency-ish text: `1234.5`, `1,234.50`, `$1,234.50`, `-$12.00`.
fn parse_amount(s: &str) -> Result<f64, String> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != '$').collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| format!("invalid number '{}'", s.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    fn table(headers: &[&str], rows: Vec<Vec<RawCell>>) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    fn full_row(order_date: RawCell) -> Vec<RawCell> {
        vec![
            order_date,
            text("1/9/2023"),
            text("East"),
            text("Furniture"),
            text("Chairs"),
            text("Consumer"),
            text("100.5"),
            text("-12.25"),
            text("3"),
        ]
    }

    #[test]
    fn parses_accepted_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        for s in [
            "2023-01-05",
            "01/05/2023",
            "1/5/2023",
            "1/5/23",
            "2023/01/05",
            "01-05-2023",
            "2023-01-05 13:45:00",
            "2023-01-05T00:00:00",
            "2023-01-05T08:00:00+02:00",
        ] {
            assert_eq!(parse_date(s), Ok(expected), "layout {s}");
        }
        assert!(parse_date("05.01.2023").is_err());
        assert!(parse_date("13/45/2023").is_err());
    }

    #[test]
    fn coerces_a_full_row() {
        let t = table(&REQUIRED_COLUMNS, vec![full_row(text("2023-01-05"))]);
        let records = records_from_table(&t).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.order_date, NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
        assert_eq!(r.ship_date, NaiveDate::from_ymd_opt(2023, 1, 9).unwrap());
        assert_eq!(r.region, "East");
        assert_eq!(r.sub_category, "Chairs");
        assert_eq!(r.sales, 100.5);
        assert_eq!(r.profit, -12.25);
        assert_eq!(r.quantity, 3);
    }

    #[test]
    fn spreadsheet_date_cells_and_serials_are_accepted() {
        let mut row = full_row(RawCell::Date(NaiveDate::from_ymd_opt(2023, 1, 5).unwrap()));
        row[1] = RawCell::Number(44935.0);
        let t = table(&REQUIRED_COLUMNS, vec![row]);
        let records = records_from_table(&t).unwrap();
        assert_eq!(records[0].ship_date, NaiveDate::from_ymd_opt(2023, 1, 9).unwrap());
    }

    #[test]
    fn headers_match_case_insensitively_with_bom_and_extra_columns() {
        let mut headers: Vec<&str> = vec![
            "\u{feff}order date",
            "SHIP DATE",
            " region ",
            "category",
            "sub-category",
            "segment",
            "sales",
            "profit",
            "quantity",
        ];
        headers.push("Row ID");
        let mut row = full_row(text("2023-01-05"));
        row.push(text("1"));
        let records = records_from_table(&table(&headers, vec![row])).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn missing_columns_are_a_schema_error() {
        let headers = &REQUIRED_COLUMNS[..7];
        let err = records_from_table(&table(headers, Vec::new())).unwrap_err();
        match err {
            DatasetError::Schema(msg) => {
                assert!(msg.contains("`Profit`"));
                assert!(msg.contains("`Quantity`"));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn one_bad_date_aborts_the_whole_load() {
        let t = table(
            &REQUIRED_COLUMNS,
            vec![full_row(text("2023-01-05")), full_row(text("not a date"))],
        );
        let err = records_from_table(&t).unwrap_err();
        match err {
            DatasetError::Schema(msg) => {
                assert!(msg.contains("row 3"), "{msg}");
                assert!(msg.contains("Order Date"), "{msg}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn blank_rows_are_skipped() {
        let blank = vec![RawCell::Empty; REQUIRED_COLUMNS.len()];
        let t = table(&REQUIRED_COLUMNS, vec![full_row(text("2023-01-05")), blank]);
        assert_eq!(records_from_table(&t).unwrap().len(), 1);
    }

    #[test]
    fn amounts_accept_currency_text_and_quantity_must_be_whole() {
        assert_eq!(parse_amount("$1,234.50"), Ok(1234.5));
        assert_eq!(parse_amount("-$12"), Ok(-12.0));
        assert_eq!(coerce_integer(&RawCell::Number(4.0)), Ok(4));
        assert!(coerce_integer(&text("2.5")).is_err());
    }

    #[test]
    fn quantity_beyond_i64_is_rejected() {
        assert!(coerce_integer(&RawCell::Number(9_223_372_036_854_775_808.0)).is_err());
        assert!(coerce_integer(&RawCell::Number(-9_223_372_036_854_775_808.0)).is_err());
        assert_eq!(coerce_integer(&RawCell::Number(9_007_199_254_740_992.0)), Ok(1 << 53));
    }

    #[test]
    fn out_of_range_date_serial_is_a_schema_error() {
        let t = table(&REQUIRED_COLUMNS, vec![full_row(RawCell::Number(1e18))]);
        let err = records_from_table(&t).unwrap_err();
        match err {
            DatasetError::Schema(msg) => {
                assert!(msg.contains("Order Date"), "{msg}");
                assert!(msg.contains("invalid date serial"), "{msg}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_extension_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.parquet");
        std::fs::write(&path, b"").unwrap();
        let err = read_table(&path, None).unwrap_err();
        assert!(matches!(err, DatasetError::Load { .. }));
    }
}
