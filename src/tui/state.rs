//! Control state and per-slot figures behind the TUI.
//!
//! Every mutation goes through one of the control setters, which updates the
//! selection and then recomputes only the charts that listen to that control.
//! Kept free of terminal types so it can be tested directly.

use chrono::{Days, NaiveDate};

use crate::app::pipeline::{ControlOptions, Dashboard};
use crate::charts::{ChartId, Figure, affected_by};
use crate::domain::{Control, FilterSelection};

pub struct DashboardState {
    dashboard: Dashboard,
    selection: FilterSelection,
    /// One figure per slot, indexed by `ChartId as usize`.
    figures: Vec<Figure>,
}

impl DashboardState {
    /// Start at the default selection with every slot rendered.
    pub fn new(dashboard: Dashboard) -> Self {
        let selection = dashboard.default_selection();
        let figures = dashboard.render_all(&selection);
        Self {
            dashboard,
            selection,
            figures,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn options(&self) -> &ControlOptions {
        self.dashboard.options()
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn figure(&self, chart: ChartId) -> &Figure {
        &self.figures[chart as usize]
    }

    /// Set the start date (clamped). Returns the charts that were recomputed.
    pub fn set_start(&mut self, date: NaiveDate) -> Vec<ChartId> {
        let date = self.options().clamp(date);
        if date == self.selection.start {
            return Vec::new();
        }
        self.selection.start = date;
        self.refresh(Control::StartDate)
    }

    /// Set the end date (clamped). Returns the charts that were recomputed.
    pub fn set_end(&mut self, date: NaiveDate) -> Vec<ChartId> {
        let date = self.options().clamp(date);
        if date == self.selection.end {
            return Vec::new();
        }
        self.selection.end = date;
        self.refresh(Control::EndDate)
    }

    /// Move a date control by `days` (negative moves back).
    pub fn shift_date(&mut self, control: Control, days: i64) -> Vec<ChartId> {
        match control {
            Control::StartDate => self.set_start(shift(self.selection.start, days)),
            Control::EndDate => self.set_end(shift(self.selection.end, days)),
            Control::Regions | Control::Categories => Vec::new(),
        }
    }

    /// Toggle one value of a multi-select control.
    pub fn toggle(&mut self, control: Control, value: &str) -> Vec<ChartId> {
        match control {
            Control::Regions => self.selection.regions.toggle(value),
            Control::Categories => self.selection.categories.toggle(value),
            Control::StartDate | Control::EndDate => return Vec::new(),
        }
        self.refresh(control)
    }

    /// Return one control to its default (date bound or nothing selected).
    pub fn clear(&mut self, control: Control) -> Vec<ChartId> {
        match control {
            Control::StartDate => self.set_start(self.options().min_date),
            Control::EndDate => self.set_end(self.options().max_date),
            Control::Regions if !self.selection.regions.is_unrestricted() => {
                self.selection.regions = Default::default();
                self.refresh(control)
            }
            Control::Categories if !self.selection.categories.is_unrestricted() => {
                self.selection.categories = Default::default();
                self.refresh(control)
            }
            Control::Regions | Control::Categories => Vec::new(),
        }
    }

    /// Return every control to its default and re-render all slots.
    pub fn reset(&mut self) -> Vec<ChartId> {
        self.selection = self.dashboard.default_selection();
        self.figures = self.dashboard.render_all(&self.selection);
        ChartId::ALL.to_vec()
    }

    fn refresh(&mut self, control: Control) -> Vec<ChartId> {
        let charts = affected_by(control);
        tracing::debug!(control = control.label(), charts = charts.len(), "control changed");
        for figure in self.dashboard.render_many(&charts, &self.selection) {
            let slot = figure.chart as usize;
            self.figures[slot] = figure;
        }
        charts
    }
}

fn shift(date: NaiveDate, days: i64) -> NaiveDate {
    let moved = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    moved.unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::charts::{FigureData, render};
    use crate::data::sample::three_row_dataset;

    fn state() -> DashboardState {
        DashboardState::new(Dashboard::new(Arc::new(three_row_dataset())).unwrap())
    }

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, day).unwrap()
    }

    #[test]
    fn starts_with_every_slot_rendered_at_defaults() {
        let s = state();
        assert_eq!(s.selection().start, d(1, 5));
        assert_eq!(s.selection().end, d(2, 20));
        for chart in ChartId::ALL {
            assert_eq!(s.figure(chart).chart, chart);
            assert!(!s.figure(chart).is_empty());
        }
    }

    #[test]
    fn category_toggle_leaves_category_charts_alone() {
        let mut s = state();
        let before = s.figure(ChartId::CategoryBar).clone();

        let refreshed = s.toggle(Control::Categories, "Tech");
        assert!(!refreshed.contains(&ChartId::CategoryBar));
        assert!(!refreshed.contains(&ChartId::CategoryShare));
        assert!(refreshed.contains(&ChartId::RegionShare));
        assert_eq!(s.figure(ChartId::CategoryBar), &before);

        match &s.figure(ChartId::RegionShare).data {
            FigureData::Shares(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].key, "East");
                assert_eq!(rows[0].sales, 50.0);
            }
            other => panic!("unexpected data {other:?}"),
        }
    }

    #[test]
    fn figures_always_match_a_fresh_render() {
        let mut s = state();
        s.toggle(Control::Regions, "East");
        s.shift_date(Control::StartDate, 30);
        s.toggle(Control::Categories, "Furniture");
        let ds = s.dashboard().dataset().clone();
        for chart in ChartId::ALL {
            assert_eq!(s.figure(chart), &render(chart, &ds, s.selection()));
        }
    }

    #[test]
    fn dates_are_clamped_to_the_dataset_range() {
        let mut s = state();
        assert!(s.shift_date(Control::StartDate, -30).is_empty());
        assert_eq!(s.selection().start, d(1, 5));

        let refreshed = s.shift_date(Control::EndDate, -30);
        assert_eq!(refreshed.len(), 8);
        assert_eq!(s.selection().end, d(1, 21));

        s.set_end(d(12, 31));
        assert_eq!(s.selection().end, d(2, 20));
    }

    #[test]
    fn clear_and_reset_restore_defaults() {
        let mut s = state();
        s.toggle(Control::Regions, "West");
        assert!(!s.selection().regions.is_unrestricted());
        assert_eq!(s.clear(Control::Regions).len(), 7);
        assert!(s.selection().regions.is_unrestricted());
        assert!(s.clear(Control::Regions).is_empty());

        s.set_start(d(2, 1));
        s.toggle(Control::Categories, "Tech");
        s.reset();
        assert_eq!(s.selection(), &s.dashboard().default_selection());
    }

    #[test]
    fn reversed_window_empties_every_slot() {
        let mut s = state();
        s.set_start(d(2, 15));
        s.set_end(d(2, 1));
        for chart in ChartId::ALL {
            assert!(s.figure(chart).is_empty(), "{}", chart.slot());
        }
    }
}
