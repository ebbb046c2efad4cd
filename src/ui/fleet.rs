//! Fleet view rendering.
//!
//! Displays a table of all equipment with health status, trend
//! sparklines, and upcoming maintenance.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::format::{days_until, format_percentage};
use crate::data::{classify, Equipment};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Column to sort by in the Fleet view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Sort by equipment name alphabetically.
    #[default]
    Name,
    /// Sort by current health score.
    Health,
    /// Sort by criticality score.
    Criticality,
    /// Sort by next scheduled maintenance date.
    Maintenance,
    /// Sort by operating status.
    Status,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Name => SortColumn::Health,
            SortColumn::Health => SortColumn::Criticality,
            SortColumn::Criticality => SortColumn::Maintenance,
            SortColumn::Maintenance => SortColumn::Status,
            SortColumn::Status => SortColumn::Name,
        }
    }
}

/// Render the Fleet view showing all equipment in a sortable table.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref snapshot) = app.snapshot else {
        return;
    };

    let now = Utc::now();

    // Get filtered and sorted equipment
    let mut rows_data: Vec<&Equipment> =
        snapshot.equipment.iter().filter(|eq| app.matches_filter(&eq.name)).collect();
    sort_equipment_by(&mut rows_data, app.sort_column, app.sort_ascending);

    let header = Row::new(vec![
        Cell::from(format_header("Equipment", SortColumn::Name, app)),
        Cell::from("Kind"),
        Cell::from("Line"),
        Cell::from(format_header("Health", SortColumn::Health, app)),
        Cell::from("Trend"),
        Cell::from(format_header("Crit", SortColumn::Criticality, app)),
        Cell::from(format_header("Maint", SortColumn::Maintenance, app)),
        Cell::from(format_header("Status", SortColumn::Status, app)),
        Cell::from("State"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = rows_data
        .iter()
        .map(|eq| {
            let health = classify(eq.health_score);
            let health_style = app.theme.status_style(health);

            let sparkline = render_sparkline(&app.history.sparkline(&eq.id));
            let trend = match app.history.trend(&eq.id) {
                Some(d) if d > 0.001 => "↑",
                Some(d) if d < -0.001 => "↓",
                Some(_) => "→",
                None => "-",
            };

            let maint_days = days_until(eq.next_maintenance, now);
            let maint_label = if maint_days < 0 {
                format!("{}d over", -maint_days)
            } else {
                format!("in {}d", maint_days)
            };
            let maint_style = if maint_days < 0 {
                app.theme.status_style(crate::data::HealthStatus::Critical)
            } else if maint_days <= 7 {
                app.theme.status_style(crate::data::HealthStatus::Warning)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(eq.name.clone()),
                Cell::from(eq.kind.label()),
                Cell::from(eq.production_line.clone()),
                Cell::from(format_percentage(eq.health_score)).style(health_style),
                Cell::from(format!("{} {}", sparkline, trend)),
                Cell::from(format_percentage(eq.criticality)),
                Cell::from(maint_label).style(maint_style),
                Cell::from(health.symbol()).style(health_style),
                Cell::from(eq.status.label()).style(app.theme.equipment_status_style(eq.status)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),    // Equipment - gets 3x share (largest)
        Constraint::Min(10),    // Kind
        Constraint::Min(7),     // Line
        Constraint::Min(7),     // Health
        Constraint::Min(10),    // Trend sparkline
        Constraint::Min(6),     // Criticality
        Constraint::Min(8),     // Maintenance
        Constraint::Min(6),     // Status
        Constraint::Min(11),    // State
    ];

    let selected_visual_index = app.selected_index.min(rows_data.len().saturating_sub(1));

    let sort_indicator = match app.sort_column {
        SortColumn::Name => "name",
        SortColumn::Health => "health",
        SortColumn::Criticality => "crit",
        SortColumn::Maintenance => "maint",
        SortColumn::Status => "status",
    };
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !rows_data.is_empty() {
        format!(" [{}/{}]", selected_visual_index + 1, rows_data.len())
    } else {
        String::new()
    };

    let title = format!(
        " Equipment ({}/{}) [s:sort {}{}]{}{} ",
        rows_data.len(),
        snapshot.equipment.len(),
        sort_indicator,
        sort_dir,
        filter_info,
        position_info
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

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort equipment by the given column and direction (public for use in app.rs)
pub fn sort_equipment_by(rows: &mut [&Equipment], column: SortColumn, ascending: bool) {
    rows.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Name => a.name.cmp(&b.name),
            SortColumn::Health => a
                .health_score
                .partial_cmp(&b.health_score)
                .unwrap_or(std::cmp::Ordering::Equal),
            SortColumn::Criticality => {
                a.criticality.partial_cmp(&b.criticality).unwrap_or(std::cmp::Ordering::Equal)
            }
            SortColumn::Maintenance => a.next_maintenance.cmp(&b.next_maintenance),
            SortColumn::Status => classify(a.health_score).cmp(&classify(b.health_score)),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        // Use secondary sort by name for stability when primary values are equal
        if primary == std::cmp::Ordering::Equal {
            a.name.cmp(&b.name)
        } else {
            primary
        }
    });
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "        ".to_string(); // 8 spaces placeholder
    }

    // Take last 8 values
    let values: Vec<u8> = data.iter().rev().take(8).rev().copied().collect();

    values.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::sim::{SimSettings, SimulatedPlant};

    #[test]
    fn test_sort_by_health() {
        let sim = SimulatedPlant::new(SimSettings {
            fleet_size: 8,
            seed: Some(17),
            ..SimSettings::default()
        });
        let snapshot = sim.snapshot();
        let mut rows: Vec<&Equipment> = snapshot.equipment.iter().collect();

        sort_equipment_by(&mut rows, SortColumn::Health, true);
        for pair in rows.windows(2) {
            assert!(pair[0].health_score <= pair[1].health_score);
        }

        sort_equipment_by(&mut rows, SortColumn::Health, false);
        for pair in rows.windows(2) {
            assert!(pair[0].health_score >= pair[1].health_score);
        }
    }

    #[test]
    fn test_sort_by_name_is_stable_default() {
        let sim = SimulatedPlant::new(SimSettings {
            fleet_size: 5,
            seed: Some(17),
            ..SimSettings::default()
        });
        let snapshot = sim.snapshot();
        let mut rows: Vec<&Equipment> = snapshot.equipment.iter().collect();
        sort_equipment_by(&mut rows, SortColumn::Name, true);
        for pair in rows.windows(2) {
            assert!(pair[0].name <= pair[1].name);
        }
    }

    #[test]
    fn test_render_sparkline_levels() {
        assert_eq!(render_sparkline(&[0, 7]), "▁█");
        assert_eq!(render_sparkline(&[]), "        ");
        // Longer histories keep only the last 8 values
        let long: Vec<u8> = (0..20).map(|i| (i % 8) as u8).collect();
        assert_eq!(render_sparkline(&long).chars().count(), 8);
    }
}
