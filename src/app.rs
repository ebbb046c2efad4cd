//! Application state and navigation logic.

use anyhow::Result;
use chrono::Utc;

use crate::data::{FleetStats, HealthHistory};
use crate::source::{PlantSnapshot, TelemetrySource};
use crate::ui::alerts::PredictionSortColumn;
use crate::ui::fleet::SortColumn;
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Equipment detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Overview of all equipment with health status.
    Fleet,
    /// Live alert feed and active failure predictions.
    Alerts,
    /// Maintenance work orders, upcoming first.
    Schedule,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Fleet => View::Alerts,
            View::Alerts => View::Schedule,
            View::Schedule => View::Fleet,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Fleet => View::Schedule,
            View::Alerts => View::Fleet,
            View::Schedule => View::Alerts,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Fleet => "Fleet",
            View::Alerts => "Alerts",
            View::Schedule => "Schedule",
        }
    }
}

/// Saved state for returning to a previous view.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub view: View,
    pub selected_index: usize,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Telemetry source and the latest published snapshot
    source: Box<dyn TelemetrySource>,
    pub snapshot: Option<PlantSnapshot>,
    pub history: HealthHistory,
    pub load_error: Option<String>,

    // Navigation state
    pub selected_index: usize,
    pub view_stack: Vec<ViewState>,

    // Sorting
    pub sort_column: SortColumn,
    pub sort_ascending: bool,
    pub prediction_sort_column: PredictionSortColumn,
    pub prediction_sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    /// Create a new App with the given telemetry source.
    pub fn new(source: Box<dyn TelemetrySource>) -> Self {
        Self {
            running: true,
            current_view: View::Fleet,
            show_help: false,
            show_detail_overlay: false,
            source,
            snapshot: None,
            history: HealthHistory::new(),
            load_error: None,
            selected_index: 0,
            view_stack: Vec::new(),
            sort_column: SortColumn::default(),
            sort_ascending: true,
            prediction_sort_column: PredictionSortColumn::default(),
            prediction_sort_ascending: false, // Default descending (riskiest first)
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Returns a description of the current telemetry source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Fleet statistics for the current snapshot.
    ///
    /// Recomputed from scratch on every call so the header can never show
    /// counts that are stale against the rows below it.
    pub fn fleet_stats(&self) -> Option<FleetStats> {
        self.snapshot.as_ref().map(|s| FleetStats::compute(&s.equipment))
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Pop the view stack and restore previous state.
    pub fn pop_view(&mut self) -> bool {
        if let Some(state) = self.view_stack.pop() {
            self.current_view = state.view;
            self.selected_index = state.selected_index;
            true
        } else {
            false
        }
    }

    /// Get breadcrumb trail for current navigation.
    pub fn breadcrumb(&self) -> String {
        let mut parts: Vec<&str> = self.view_stack.iter().map(|s| s.view.label()).collect();
        parts.push(self.current_view.label());
        parts.join(" > ")
    }

    /// Poll the telemetry source for new data.
    ///
    /// Returns Ok(true) if a new snapshot was received, Ok(false) if no
    /// new data. Source errors surface through `load_error`; the poll
    /// always runs first so a source that has recovered (e.g. a snapshot
    /// file rewritten after a bad parse) is picked up on the next reload.
    pub fn reload_data(&mut self) -> Result<bool> {
        if let Some(snapshot) = self.source.poll() {
            // Record history before updating
            self.history.record(&snapshot);
            self.snapshot = Some(snapshot);
            self.load_error = None;

            let count = self.current_item_count();
            if self.selected_index >= count {
                self.selected_index = count.saturating_sub(1);
            }
            Ok(true)
        } else {
            self.load_error = self.source.error().map(str::to_string);
            Ok(false)
        }
    }

    /// Toggle the live simulation pause state.
    pub fn toggle_streaming(&mut self) {
        let streaming = !self.source.is_streaming();
        self.source.set_streaming(streaming);
        self.set_status_message(
            if streaming { "Streaming resumed" } else { "Streaming paused" }.to_string(),
        );
    }

    /// Whether the source is currently generating live data.
    pub fn is_streaming(&self) -> bool {
        self.source.is_streaming()
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
        self.selected_index = 0;
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
        self.selected_index = 0;
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.selected_index = 0;
    }

    /// Number of selectable items in the current view after filtering.
    pub fn current_item_count(&self) -> usize {
        let Some(ref snapshot) = self.snapshot else {
            return 0;
        };
        match self.current_view {
            View::Fleet => {
                snapshot.equipment.iter().filter(|eq| self.matches_filter(&eq.name)).count()
            }
            View::Alerts => snapshot
                .predictions
                .iter()
                .filter(|p| self.matches_filter(snapshot.equipment_name(&p.equipment_id)))
                .count(),
            View::Schedule => snapshot
                .maintenance
                .iter()
                .filter(|m| self.matches_filter(snapshot.equipment_name(&m.equipment_id)))
                .count(),
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.current_item_count().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_index = self.current_item_count().saturating_sub(1);
    }

    /// Get the equipment id behind the current visual selection.
    ///
    /// The fleet view applies sorting and filtering, so the visual row
    /// index differs from the underlying data index; the alert and
    /// schedule views resolve through their referenced equipment.
    pub fn selected_equipment_id(&self) -> Option<String> {
        let snapshot = self.snapshot.as_ref()?;

        match self.current_view {
            View::Fleet => {
                let mut rows: Vec<&crate::data::Equipment> = snapshot
                    .equipment
                    .iter()
                    .filter(|eq| self.matches_filter(&eq.name))
                    .collect();
                crate::ui::fleet::sort_equipment_by(
                    &mut rows,
                    self.sort_column,
                    self.sort_ascending,
                );
                rows.get(self.selected_index).map(|eq| eq.id.clone())
            }
            View::Alerts => {
                let mut rows: Vec<&crate::data::FailurePrediction> = snapshot
                    .predictions
                    .iter()
                    .filter(|p| self.matches_filter(snapshot.equipment_name(&p.equipment_id)))
                    .collect();
                crate::ui::alerts::sort_predictions_by(
                    &mut rows,
                    self.prediction_sort_column,
                    self.prediction_sort_ascending,
                );
                rows.get(self.selected_index).map(|p| p.equipment_id.clone())
            }
            View::Schedule => {
                let rows = crate::ui::schedule::sorted_work_orders(snapshot, self);
                rows.get(self.selected_index).map(|m| m.equipment_id.clone())
            }
        }
    }

    /// Open the detail overlay for the currently selected equipment.
    pub fn enter_detail(&mut self) {
        if self.selected_equipment_id().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then pop view stack, then go
    /// to the fleet view.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return;
        }
        if !self.pop_view() && self.current_view != View::Fleet {
            self.current_view = View::Fleet;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column for the current view.
    pub fn cycle_sort(&mut self) {
        match self.current_view {
            View::Fleet => self.sort_column = self.sort_column.next(),
            View::Alerts => self.prediction_sort_column = self.prediction_sort_column.next(),
            View::Schedule => {}
        }
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        match self.current_view {
            View::Fleet => self.sort_ascending = !self.sort_ascending,
            View::Alerts => self.prediction_sort_ascending = !self.prediction_sort_ascending,
            View::Schedule => {}
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a name matches the current filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export a dashboard summary to a JSON file.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        use std::io::Write;

        let Some(ref snapshot) = self.snapshot else {
            anyhow::bail!("No data to export");
        };

        let json = serde_json::to_string_pretty(&build_export(snapshot))?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}

/// Build the export document: fleet summary plus per-equipment rows and
/// the active predictions.
pub fn build_export(snapshot: &PlantSnapshot) -> serde_json::Value {
    use crate::data::format::{days_until, format_percentage};
    use crate::data::{classify, PredictionStatus};

    let stats = FleetStats::compute(&snapshot.equipment);
    let now = Utc::now();

    let equipment: Vec<serde_json::Value> = snapshot
        .equipment
        .iter()
        .map(|eq| {
            serde_json::json!({
                "id": eq.id,
                "code": eq.code,
                "name": eq.name,
                "kind": eq.kind.label(),
                "status": eq.status.label(),
                "health": format_percentage(eq.health_score),
                "health_category": classify(eq.health_score).label(),
                "criticality": format_percentage(eq.criticality),
                "next_maintenance_in_days": days_until(eq.next_maintenance, now),
            })
        })
        .collect();

    let predictions: Vec<serde_json::Value> = snapshot
        .predictions
        .iter()
        .filter(|p| p.status == PredictionStatus::Active)
        .map(|p| {
            serde_json::json!({
                "equipment": snapshot.equipment_name(&p.equipment_id),
                "probability": format_percentage(p.failure_probability),
                "confidence": format_percentage(p.confidence),
                "mode": p.expected_failure_mode.label(),
                "expected_in_days": days_until(p.expected_failure_date, now),
            })
        })
        .collect();

    serde_json::json!({
        "summary": {
            "total": stats.total,
            "healthy": stats.healthy,
            "warning": stats.warning,
            "critical": stats.critical,
            "avg_health": format_percentage(stats.avg_health),
            "connected": snapshot.connected,
        },
        "equipment": equipment,
        "predictions": predictions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::sim::{SimSettings, SimulatedPlant};

    fn test_app(fleet_size: usize) -> App {
        let sim = SimulatedPlant::new(SimSettings {
            fleet_size,
            seed: Some(3),
            ..SimSettings::default()
        });
        let mut app = App::new(Box::new(sim));
        app.reload_data().unwrap();
        app
    }

    #[test]
    fn test_reload_populates_snapshot() {
        let app = test_app(4);
        let snapshot = app.snapshot.as_ref().unwrap();
        assert_eq!(snapshot.equipment.len(), 4);
        assert_eq!(app.fleet_stats().unwrap().total, 4);
    }

    #[test]
    fn test_stats_counts_sum() {
        let app = test_app(9);
        let stats = app.fleet_stats().unwrap();
        assert_eq!(stats.healthy + stats.warning + stats.critical, stats.total);
    }

    #[test]
    fn test_view_cycle_round_trips() {
        let mut app = test_app(2);
        assert_eq!(app.current_view, View::Fleet);
        app.next_view();
        app.next_view();
        app.next_view();
        assert_eq!(app.current_view, View::Fleet);
        app.prev_view();
        assert_eq!(app.current_view, View::Schedule);
    }

    #[test]
    fn test_selection_clamped_to_item_count() {
        let mut app = test_app(3);
        app.select_next_n(100);
        assert_eq!(app.selected_index, 2);
        app.select_prev_n(100);
        assert_eq!(app.selected_index, 0);
        app.select_last();
        assert_eq!(app.selected_index, 2);
    }

    #[test]
    fn test_filter_matching() {
        let mut app = test_app(2);
        assert!(app.matches_filter("Hydraulic Pump A1"));
        app.filter_text = "pump".to_string();
        assert!(app.matches_filter("Hydraulic Pump A1"));
        assert!(!app.matches_filter("Mixer B2"));
    }

    #[test]
    fn test_selected_equipment_resolves() {
        let app = test_app(5);
        let id = app.selected_equipment_id().unwrap();
        assert!(app.snapshot.as_ref().unwrap().equipment_by_id(&id).is_some());
    }

    #[test]
    fn test_export_summary_shape() {
        let app = test_app(6);
        let doc = build_export(app.snapshot.as_ref().unwrap());
        assert_eq!(doc["summary"]["total"], 6);
        assert_eq!(doc["equipment"].as_array().unwrap().len(), 6);
        assert!(doc["summary"]["avg_health"].as_str().unwrap().ends_with('%'));
    }

    #[test]
    fn test_reload_recovers_after_file_error() {
        use crate::source::FileSource;
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut app = App::new(Box::new(FileSource::new(file.path())));
        assert!(!app.reload_data().unwrap());
        assert!(app.load_error.as_deref().unwrap().contains("Parse error"));

        // The file is rewritten with a valid snapshot; the next reload
        // must pick it up rather than staying wedged on the old error.
        let sim = SimulatedPlant::new(SimSettings {
            fleet_size: 2,
            seed: Some(5),
            ..SimSettings::default()
        });
        let json = serde_json::to_string(&sim.snapshot()).unwrap();
        std::fs::write(file.path(), json).unwrap();

        assert!(app.reload_data().unwrap());
        assert!(app.load_error.is_none());
        assert_eq!(app.snapshot.as_ref().unwrap().equipment.len(), 2);
    }

    #[test]
    fn test_toggle_streaming() {
        let mut app = test_app(2);
        assert!(app.is_streaming());
        app.toggle_streaming();
        assert!(!app.is_streaming());
        app.toggle_streaming();
        assert!(app.is_streaming());
    }
}
