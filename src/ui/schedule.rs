//! Schedule view rendering.
//!
//! Maintenance work orders ordered by start time, upcoming work first.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::format::{days_until, format_currency, format_date, DateStyle};
use crate::data::{MaintenanceRecord, WorkOrderStatus};
use crate::source::PlantSnapshot;

/// Work orders for display, filtered and ordered by start time.
pub fn sorted_work_orders<'a>(snapshot: &'a PlantSnapshot, app: &App) -> Vec<&'a MaintenanceRecord> {
    let mut rows: Vec<&MaintenanceRecord> = snapshot
        .maintenance
        .iter()
        .filter(|m| app.matches_filter(snapshot.equipment_name(&m.equipment_id)))
        .collect();
    rows.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
    rows
}

/// Render the Schedule view showing maintenance work orders.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref snapshot) = app.snapshot else {
        return;
    };
    let now = Utc::now();

    let rows_data = sorted_work_orders(snapshot, app);

    let header = Row::new(vec![
        Cell::from("Equipment"),
        Cell::from("Type"),
        Cell::from("Status"),
        Cell::from("Start"),
        Cell::from("Due"),
        Cell::from("Technician"),
        Cell::from("Cost"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = rows_data
        .iter()
        .map(|m| {
            let status_style = match m.status {
                WorkOrderStatus::Scheduled => Style::default().fg(app.theme.highlight),
                WorkOrderStatus::InProgress => {
                    Style::default().fg(app.theme.warning).add_modifier(Modifier::BOLD)
                }
                WorkOrderStatus::Completed => Style::default().fg(app.theme.healthy),
                WorkOrderStatus::Cancelled => Style::default().add_modifier(Modifier::DIM),
            };

            let due = match m.status {
                WorkOrderStatus::Completed | WorkOrderStatus::Cancelled => "-".to_string(),
                _ => {
                    let days = days_until(m.start_time, now);
                    if days < 0 {
                        format!("{}d overdue", -days)
                    } else if days == 0 {
                        "today".to_string()
                    } else {
                        format!("in {}d", days)
                    }
                }
            };

            Row::new(vec![
                Cell::from(snapshot.equipment_name(&m.equipment_id).to_string()),
                Cell::from(m.maintenance_type.label()),
                Cell::from(m.status.label()).style(status_style),
                Cell::from(format_date(m.start_time, DateStyle::Full)),
                Cell::from(due),
                Cell::from(m.technician.clone()),
                Cell::from(format_currency(m.cost)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Min(11),
        Constraint::Min(12),
        Constraint::Min(20),
        Constraint::Min(11),
        Constraint::Min(14),
        Constraint::Min(9),
    ];

    let selected_visual_index = app.selected_index.min(rows_data.len().saturating_sub(1));

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let title = format!(
        " Maintenance Schedule ({}/{}){} ",
        rows_data.len(),
        snapshot.maintenance.len(),
        filter_info
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::sim::{SimSettings, SimulatedPlant};

    fn test_app(fleet: usize) -> App {
        let sim = SimulatedPlant::new(SimSettings {
            fleet_size: fleet,
            seed: Some(9),
            ..SimSettings::default()
        });
        let mut app = App::new(Box::new(sim));
        app.reload_data().unwrap();
        app
    }

    #[test]
    fn test_work_orders_sorted_by_start_time() {
        let app = test_app(6);
        let snapshot = app.snapshot.as_ref().unwrap();
        let rows = sorted_work_orders(snapshot, &app);
        assert!(!rows.is_empty());
        for pair in rows.windows(2) {
            assert!(pair[0].start_time <= pair[1].start_time);
        }
    }

    #[test]
    fn test_work_orders_respect_filter() {
        let mut app = test_app(6);
        let snapshot = app.snapshot.clone().unwrap();
        let all = sorted_work_orders(&snapshot, &app).len();

        // Pick the equipment name of the first work order and filter on it
        let name = snapshot.equipment_name(&snapshot.maintenance[0].equipment_id).to_string();
        app.filter_text = name.clone();
        let filtered = sorted_work_orders(&snapshot, &app);
        assert!(filtered.len() < all);
        for m in filtered {
            assert_eq!(snapshot.equipment_name(&m.equipment_id), name);
        }
    }
}
