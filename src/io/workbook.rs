//! Spreadsheet workbook reader (`.xls`, `.xlsx`, `.xlsm`, `.xlsb`, `.ods`).
//!
//! The first row of the chosen sheet is the header row. Spreadsheet date cells
//! arrive as serial numbers and are converted here so that the schema layer
//! sees a real date.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDate, TimeDelta};

use crate::error::DatasetError;
use crate::io::{RawCell, RawTable};

/// Read one sheet of a workbook. `sheet = None` reads the first sheet.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<RawTable, DatasetError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| DatasetError::load(path, e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| {
                DatasetError::load(
                    path,
                    format!("sheet `{name}` not found (available: {})", sheet_names.join(", ")),
                )
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| DatasetError::load(path, "workbook has no sheets"))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| DatasetError::load(path, format!("failed to read sheet `{sheet_name}`: {e}")))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .ok_or_else(|| DatasetError::load(path, format!("sheet `{sheet_name}` is empty")))?
        .iter()
        .map(header_text)
        .collect();

    let rows = rows.map(|row| row.iter().map(convert_cell).collect()).collect();

    tracing::debug!(sheet = %sheet_name, "read workbook sheet");
    Ok(RawTable { headers, rows })
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Int(v) => RawCell::Number(*v as f64),
        Data::Float(v) => RawCell::Number(*v),
        Data::Bool(v) => RawCell::Text(v.to_string()),
        Data::DateTime(v) => match serial_to_date(v.as_f64()) {
            Some(date) => RawCell::Date(date),
            None => RawCell::Number(v.as_f64()),
        },
        Data::DateTimeIso(s) => RawCell::Text(s.clone()),
        Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(e) => RawCell::Error(format!("{e:?}")),
    }
}

/// Convert a spreadsheet serial day number (1900 date system) to a date.
///
/// Uses the 1899-12-30 epoch, which is exact for serials after 1900-03-01.
/// The time-of-day fraction is dropped. Serials past the calendar range
/// chrono can represent yield `None`.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = TimeDelta::try_days(serial.floor() as i64)?;
    epoch.checked_add_signed(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    #[test]
    fn serial_dates_use_1900_system() {
        assert_eq!(serial_to_date(44931.0), NaiveDate::from_ymd_opt(2023, 1, 5));
        // Time-of-day fraction is ignored.
        assert_eq!(serial_to_date(44931.75), NaiveDate::from_ymd_opt(2023, 1, 5));
        assert_eq!(serial_to_date(0.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
    }

    #[test]
    fn out_of_range_serials_are_rejected() {
        assert_eq!(serial_to_date(1e18), None);
        assert_eq!(serial_to_date(1e300), None);
        assert_eq!(serial_to_date(f64::INFINITY), None);
        // 9999-12-31 is the last day a spreadsheet can hold.
        assert_eq!(serial_to_date(2_958_465.0), NaiveDate::from_ymd_opt(9999, 12, 31));
    }

    #[test]
    fn huge_date_time_cell_stays_a_number() {
        let cell = Data::DateTime(ExcelDateTime::new(1e18, ExcelDateTimeType::DateTime, false));
        assert_eq!(convert_cell(&cell), RawCell::Number(1e18));
    }

    #[test]
    fn missing_workbook_is_a_load_error() {
        let err = read_workbook(Path::new("no/such/Superstore.xls"), None).unwrap_err();
        assert!(matches!(err, DatasetError::Load { .. }));
    }
}
