//! Alerts view rendering.
//!
//! Splits the area into a live alert feed on top and the failure
//! prediction table below.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::format::{format_currency, format_date, format_percentage, relative_time, DateStyle};
use crate::data::FailurePrediction;

/// Column to sort the prediction table by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PredictionSortColumn {
    /// Sort by failure probability.
    #[default]
    Probability,
    /// Sort by model confidence.
    Confidence,
    /// Sort by expected failure date.
    ExpectedDate,
    /// Sort by estimated remediation cost.
    Cost,
    /// Sort by equipment name.
    Equipment,
}

impl PredictionSortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            PredictionSortColumn::Probability => PredictionSortColumn::Confidence,
            PredictionSortColumn::Confidence => PredictionSortColumn::ExpectedDate,
            PredictionSortColumn::ExpectedDate => PredictionSortColumn::Cost,
            PredictionSortColumn::Cost => PredictionSortColumn::Equipment,
            PredictionSortColumn::Equipment => PredictionSortColumn::Probability,
        }
    }
}

/// Render the Alerts view: live feed above, predictions below.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Fill(1)])
        .split(area);

    render_alert_feed(frame, app, chunks[0]);
    render_predictions(frame, app, chunks[1]);
}

fn render_alert_feed(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref snapshot) = app.snapshot else {
        return;
    };
    let now = Utc::now();

    // The snapshot stores alerts newest first; stored order is display order.
    let items: Vec<ListItem> = snapshot
        .alerts
        .iter()
        .map(|alert| {
            let sev_style = app.theme.severity_style(alert.severity);
            let line = Line::from(vec![
                Span::styled(format!("{:<8}", alert.severity.label()), sev_style),
                Span::styled(
                    format!("{:<22}", snapshot.equipment_name(&alert.equipment_id)),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(alert.message.clone()),
                Span::styled(
                    format!("  ({})", relative_time(alert.timestamp, now)),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let title = format!(" Live Alerts ({}) ", snapshot.alerts.len());
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(list, area);
}

fn render_predictions(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref snapshot) = app.snapshot else {
        return;
    };

    let mut rows_data: Vec<&FailurePrediction> = snapshot
        .predictions
        .iter()
        .filter(|p| app.matches_filter(snapshot.equipment_name(&p.equipment_id)))
        .collect();
    sort_predictions_by(&mut rows_data, app.prediction_sort_column, app.prediction_sort_ascending);

    let header = Row::new(vec![
        Cell::from(header_label("Equipment", PredictionSortColumn::Equipment, app)),
        Cell::from(header_label("Prob", PredictionSortColumn::Probability, app)),
        Cell::from(header_label("Conf", PredictionSortColumn::Confidence, app)),
        Cell::from("Failure Mode"),
        Cell::from(header_label("Expected", PredictionSortColumn::ExpectedDate, app)),
        Cell::from(header_label("Est. Cost", PredictionSortColumn::Cost, app)),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = rows_data
        .iter()
        .map(|p| {
            let prob_style = if p.failure_probability >= 0.7 {
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD)
            } else if p.failure_probability >= 0.4 {
                Style::default().fg(app.theme.warning)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(snapshot.equipment_name(&p.equipment_id).to_string()),
                Cell::from(format_percentage(p.failure_probability)).style(prob_style),
                Cell::from(format_percentage(p.confidence)),
                Cell::from(p.expected_failure_mode.label()),
                Cell::from(format_date(p.expected_failure_date, DateStyle::Short)),
                Cell::from(format_currency(p.estimated_cost)),
                Cell::from(p.status.label()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Min(7),
        Constraint::Min(7),
        Constraint::Min(16),
        Constraint::Min(8),
        Constraint::Min(10),
        Constraint::Min(10),
    ];

    let selected_visual_index = app.selected_index.min(rows_data.len().saturating_sub(1));

    let sort_indicator = match app.prediction_sort_column {
        PredictionSortColumn::Probability => "prob",
        PredictionSortColumn::Confidence => "conf",
        PredictionSortColumn::ExpectedDate => "date",
        PredictionSortColumn::Cost => "cost",
        PredictionSortColumn::Equipment => "name",
    };
    let sort_dir = if app.prediction_sort_ascending { "↑" } else { "↓" };

    let title = format!(
        " Failure Predictions ({}) [s:sort {}{}] ",
        rows_data.len(),
        sort_indicator,
        sort_dir
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected_visual_index));

    frame.render_stateful_widget(table, area, &mut state);
}

fn header_label(name: &str, col: PredictionSortColumn, app: &App) -> Span<'static> {
    if app.prediction_sort_column == col {
        let arrow = if app.prediction_sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort predictions by the given column and direction (public for use in app.rs)
pub fn sort_predictions_by(
    rows: &mut [&FailurePrediction],
    column: PredictionSortColumn,
    ascending: bool,
) {
    rows.sort_by(|a, b| {
        let primary = match column {
            PredictionSortColumn::Probability => a
                .failure_probability
                .partial_cmp(&b.failure_probability)
                .unwrap_or(std::cmp::Ordering::Equal),
            PredictionSortColumn::Confidence => {
                a.confidence.partial_cmp(&b.confidence).unwrap_or(std::cmp::Ordering::Equal)
            }
            PredictionSortColumn::ExpectedDate => {
                a.expected_failure_date.cmp(&b.expected_failure_date)
            }
            PredictionSortColumn::Cost => {
                a.estimated_cost.partial_cmp(&b.estimated_cost).unwrap_or(std::cmp::Ordering::Equal)
            }
            PredictionSortColumn::Equipment => a.equipment_id.cmp(&b.equipment_id),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        // Ties fall back to equipment id so ordering stays deterministic
        if primary == std::cmp::Ordering::Equal {
            a.equipment_id.cmp(&b.equipment_id)
        } else {
            primary
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::sim::{SimSettings, SimulatedPlant};

    #[test]
    fn test_sort_by_probability_descending() {
        let sim = SimulatedPlant::new(SimSettings {
            fleet_size: 16,
            seed: Some(7),
            ..SimSettings::default()
        });
        let snapshot = sim.snapshot();
        let mut rows: Vec<&FailurePrediction> = snapshot.predictions.iter().collect();

        sort_predictions_by(&mut rows, PredictionSortColumn::Probability, false);
        for pair in rows.windows(2) {
            assert!(pair[0].failure_probability >= pair[1].failure_probability);
        }
    }

    #[test]
    fn test_sort_by_expected_date() {
        let sim = SimulatedPlant::new(SimSettings {
            fleet_size: 16,
            seed: Some(7),
            ..SimSettings::default()
        });
        let snapshot = sim.snapshot();
        let mut rows: Vec<&FailurePrediction> = snapshot.predictions.iter().collect();

        sort_predictions_by(&mut rows, PredictionSortColumn::ExpectedDate, true);
        for pair in rows.windows(2) {
            assert!(pair[0].expected_failure_date <= pair[1].expected_failure_date);
        }
    }

    #[test]
    fn test_alert_feed_renders_newest_first() {
        let mut sim = SimulatedPlant::new(SimSettings {
            fleet_size: 3,
            seed: Some(7),
            ..SimSettings::default()
        });
        let base = Utc::now();
        for i in 0..12 {
            sim.tick_alerts(base + chrono::Duration::seconds(i));
        }

        // The feed list consumes snapshot.alerts in stored order, so the
        // newest alert must be the first entry and timestamps must only
        // decrease from the top.
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.alerts[0].timestamp, base + chrono::Duration::seconds(11));
        for pair in snapshot.alerts.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }

    #[test]
    fn test_sort_column_cycles_through_all() {
        let mut col = PredictionSortColumn::default();
        for _ in 0..5 {
            col = col.next();
        }
        assert_eq!(col, PredictionSortColumn::default());
    }
}
