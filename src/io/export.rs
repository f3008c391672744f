//! Export figures to JSON or CSV.
//!
//! JSON is the full figure specification (title, kind, labels, data) for every
//! slot. CSV writes one `<slot>.csv` per figure with just the data rows, meant
//! to be easy to consume in spreadsheets or downstream scripts.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use crate::charts::{Figure, FigureData};
use crate::error::AppError;

/// Write all figures as one pretty-printed JSON array.
pub fn write_figures_json(path: &Path, figures: &[Figure]) -> Result<(), AppError> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(dir)
            .map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", dir.display())))?;
    }
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create figure JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, figures)
        .map_err(|e| AppError::new(4, format!("Failed to write figure JSON: {e}")))?;

    Ok(())
}

/// Write `<slot>.csv` for every figure into `dir`; returns the paths written.
pub fn write_figures_csv(dir: &Path, figures: &[Figure]) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::new(4, format!("Failed to create export dir '{}': {e}", dir.display())))?;

    let mut written = Vec::with_capacity(figures.len());
    for figure in figures {
        let path = dir.join(format!("{}.csv", figure.slot));
        write_figure_csv(&path, figure)?;
        written.push(path);
    }
    Ok(written)
}

fn write_figure_csv(path: &Path, figure: &Figure) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let row_err = |e: csv::Error| AppError::new(4, format!("Failed to write export CSV row: {e}"));

    match &figure.data {
        FigureData::Monthly(rows) => {
            writer.write_record(["month", "sales"]).map_err(row_err)?;
            for r in rows {
                writer
                    .write_record([r.month.to_string(), fmt_amount(r.sales)])
                    .map_err(row_err)?;
            }
        }
        FigureData::Grouped(rows) => {
            writer.write_record(["key", "sales", "label"]).map_err(row_err)?;
            for r in rows {
                writer
                    .write_record([r.key.clone(), fmt_amount(r.sales), r.label.clone()])
                    .map_err(row_err)?;
            }
        }
        FigureData::Shares(rows) => {
            writer.write_record(["key", "sales", "share"]).map_err(row_err)?;
            for r in rows {
                writer
                    .write_record([r.key.clone(), fmt_amount(r.sales), format!("{:.6}", r.share)])
                    .map_err(row_err)?;
            }
        }
        FigureData::Hierarchy(rows) => {
            writer
                .write_record(["region", "category", "sub_category", "sales"])
                .map_err(row_err)?;
            for r in rows {
                writer
                    .write_record([
                        r.region.clone(),
                        r.category.clone(),
                        r.sub_category.clone(),
                        fmt_amount(r.sales),
                    ])
                    .map_err(row_err)?;
            }
        }
        FigureData::Points(rows) => {
            writer.write_record(["sales", "profit", "quantity"]).map_err(row_err)?;
            for r in rows {
                writer
                    .write_record([fmt_amount(r.sales), fmt_amount(r.profit), r.quantity.to_string()])
                    .map_err(row_err)?;
            }
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV '{}': {e}", path.display())))?;
    Ok(())
}

fn fmt_amount(v: f64) -> String {
    format!("{v:.4}")
}
