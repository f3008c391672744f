//! Shared dashboard pipeline used by the TUI, `report` and `export`.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load dataset -> derive control options -> scope selection -> filter -> aggregate -> figure
//!
//! The front-ends can then focus on presentation (widgets vs text vs files).

use std::sync::Arc;

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::charts::{self, ChartId, Figure};
use crate::config::DataConfig;
use crate::data::Dataset;
use crate::domain::{FilterSelection, Restriction};
use crate::error::AppError;

/// What the filter controls can offer for the loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlOptions {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    /// Distinct regions in first-seen order.
    pub regions: Vec<String>,
    /// Distinct categories in first-seen order.
    pub categories: Vec<String>,
}

impl ControlOptions {
    /// Clamp a date into the pickable range.
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.min_date, self.max_date)
    }
}

/// Read-only dashboard over one loaded dataset.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Arc<Dataset>,
    options: ControlOptions,
}

impl Dashboard {
    /// Wrap a dataset. Fails on an empty dataset: the date controls need bounds.
    pub fn new(dataset: Arc<Dataset>) -> Result<Self, AppError> {
        let (min_date, max_date) = dataset
            .order_date_bounds()
            .ok_or_else(|| AppError::new(3, "Dataset contains no order rows."))?;
        let options = ControlOptions {
            min_date,
            max_date,
            regions: dataset.regions(),
            categories: dataset.categories(),
        };
        Ok(Self { dataset, options })
    }

    /// Load the configured data file and build the dashboard.
    pub fn load(data: &DataConfig) -> Result<Self, AppError> {
        let dataset = Dataset::load_sheet(&data.path, data.sheet.as_deref())?;
        Self::new(Arc::new(dataset))
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn options(&self) -> &ControlOptions {
        &self.options
    }

    /// Full date range, nothing selected in the multi-selects.
    pub fn default_selection(&self) -> FilterSelection {
        FilterSelection::between(self.options.min_date, self.options.max_date)
    }

    /// Build a selection from optional user inputs, defaulting to the dataset bounds.
    pub fn selection_from(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        regions: &[String],
        categories: &[String],
    ) -> FilterSelection {
        FilterSelection {
            start: start.unwrap_or(self.options.min_date),
            end: end.unwrap_or(self.options.max_date),
            regions: Restriction::from_values(regions.iter().cloned()),
            categories: Restriction::from_values(categories.iter().cloned()),
        }
    }

    pub fn render(&self, chart: ChartId, selection: &FilterSelection) -> Figure {
        charts::render(chart, &self.dataset, selection)
    }

    /// Render several charts as independent invocations; output follows `charts` order.
    pub fn render_many(&self, charts: &[ChartId], selection: &FilterSelection) -> Vec<Figure> {
        tracing::debug!(
            charts = charts.len(),
            start = %selection.start,
            end = %selection.end,
            "rendering figures"
        );
        charts
            .par_iter()
            .map(|&chart| self.render(chart, selection))
            .collect()
    }

    /// All eight slots, in layout order.
    pub fn render_all(&self, selection: &FilterSelection) -> Vec<Figure> {
        self.render_many(&ChartId::ALL, selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::three_row_dataset;

    fn dashboard() -> Dashboard {
        Dashboard::new(Arc::new(three_row_dataset())).unwrap()
    }

    #[test]
    fn options_come_from_the_dataset() {
        let dash = dashboard();
        let opts = dash.options();
        assert_eq!(opts.min_date, NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
        assert_eq!(opts.max_date, NaiveDate::from_ymd_opt(2023, 2, 20).unwrap());
        assert_eq!(opts.regions, vec!["East", "West"]);
        assert_eq!(
            opts.clamp(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
            opts.min_date
        );
    }

    #[test]
    fn empty_dataset_is_refused() {
        let err = Dashboard::new(Arc::new(Dataset::default())).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn render_all_keeps_slot_order_and_matches_single_renders() {
        let dash = dashboard();
        let sel = dash.default_selection();
        let all = dash.render_all(&sel);
        let slots: Vec<_> = all.iter().map(|f| f.chart).collect();
        assert_eq!(slots, ChartId::ALL.to_vec());
        for fig in &all {
            assert_eq!(fig, &dash.render(fig.chart, &sel));
        }
    }

    #[test]
    fn selection_defaults_to_dataset_bounds() {
        let dash = dashboard();
        let sel = dash.selection_from(None, None, &[], &["Tech".to_string()]);
        assert_eq!(sel.start, dash.options().min_date);
        assert_eq!(sel.end, dash.options().max_date);
        assert!(sel.regions.is_unrestricted());
        assert!(sel.categories.admits("Tech"));
        assert!(!sel.categories.admits("Furniture"));
    }
}
