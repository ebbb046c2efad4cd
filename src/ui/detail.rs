//! Detail overlay rendering.
//!
//! Displays a modal overlay with detailed information about a selected
//! piece of equipment.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::format::{days_until, format_date, format_percentage, DateStyle};
use crate::data::{classify, PredictionStatus};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Display thresholds for flagging sensor readings. These match the
/// visual ranges on the gauges, not the anomaly detector.
const TEMP_WARN_C: f64 = 85.0;
const VIBRATION_WARN_MMS: f64 = 5.0;
const PRESSURE_WARN_PSI: f64 = 115.0;
const POWER_WARN_KW: f64 = 75.0;

const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the equipment detail as a modal overlay.
///
/// Shows identity and lifecycle facts, the latest sensor readings with
/// out-of-range highlighting, the health history sparkline, and any
/// active failure predictions for the unit.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(ref snapshot) = app.snapshot else {
        return;
    };
    let Some(id) = app.selected_equipment_id() else {
        return;
    };
    let Some(eq) = snapshot.equipment_by_id(&id) else {
        return;
    };

    let now = Utc::now();

    // Overlay covers most of the screen, clamped to sane bounds
    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 100);
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 50);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(8), // Identity and lifecycle
        Constraint::Min(8),    // Sensor readings
        Constraint::Length(6), // Predictions
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // ===== HEADER SECTION =====
    let health = classify(eq.health_score);
    let health_style = app.theme.status_style(health);

    let sparkline: String = app
        .history
        .sparkline(&eq.id)
        .iter()
        .map(|&v| SPARKLINE_CHARS[v.min(7) as usize])
        .collect();

    let readings = snapshot.readings_for(&eq.id);
    let anomalies = readings.iter().filter(|r| r.is_anomaly).count();

    let maint_days = days_until(eq.next_maintenance, now);

    let header_lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", eq.name), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("[{}]", eq.code), Style::default().add_modifier(Modifier::DIM)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Kind: "),
            Span::styled(eq.kind.label(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("    Make: "),
            Span::raw(format!("{} {}", eq.manufacturer, eq.model)),
            Span::raw("    Zone: "),
            Span::raw(format!("{} / {}", eq.location.zone, eq.production_line)),
        ]),
        Line::from(vec![
            Span::raw(" Installed: "),
            Span::raw(format_date(eq.installation_date, DateStyle::Short)),
            Span::raw("    Last maint: "),
            Span::raw(format_date(eq.last_maintenance, DateStyle::Short)),
            Span::raw("    Next maint: "),
            Span::raw(if maint_days < 0 {
                format!("{}d overdue", -maint_days)
            } else {
                format!("in {}d", maint_days)
            }),
        ]),
        Line::from(vec![
            Span::raw(" Health: "),
            Span::styled(
                format!("{} {} ({})", health.symbol(), format_percentage(eq.health_score), health.label()),
                health_style.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    Trend: "),
            Span::raw(sparkline),
            Span::raw("    Anomalies in window: "),
            Span::styled(
                format!("{}", anomalies),
                if anomalies > 0 {
                    Style::default().fg(app.theme.warning)
                } else {
                    Style::default()
                },
            ),
        ]),
        Line::from(vec![
            Span::raw(" Status: "),
            Span::styled(eq.status.label(), app.theme.equipment_status_style(eq.status)),
            Span::raw("    Criticality: "),
            Span::raw(format_percentage(eq.criticality)),
            Span::raw("    Degradation: "),
            Span::raw(format!("{:.2}%/day", eq.degradation_rate * 100.0)),
        ]),
    ];

    let header_block = Block::default()
        .title(" Equipment Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(header_lines).block(header_block), chunks[0]);

    // ===== SENSOR READINGS =====
    if let Some(latest) = readings.last() {
        let flag = |value: f64, limit: f64| {
            if value > limit {
                Style::default().fg(app.theme.warning).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            }
        };

        let sensor_header = Row::new(vec![
            Cell::from("Sensor"),
            Cell::from("Latest"),
            Cell::from("Limit"),
        ])
        .height(1)
        .style(app.theme.header);

        let sensor_rows = vec![
            Row::new(vec![
                Cell::from("Temperature"),
                Cell::from(format!("{:.1} °C", latest.temperature))
                    .style(flag(latest.temperature, TEMP_WARN_C)),
                Cell::from(format!("{:.0} °C", TEMP_WARN_C)),
            ]),
            Row::new(vec![
                Cell::from("Vibration"),
                Cell::from(format!("{:.2} mm/s", latest.vibration))
                    .style(flag(latest.vibration, VIBRATION_WARN_MMS)),
                Cell::from(format!("{:.0} mm/s", VIBRATION_WARN_MMS)),
            ]),
            Row::new(vec![
                Cell::from("Pressure"),
                Cell::from(format!("{:.1} PSI", latest.pressure))
                    .style(flag(latest.pressure, PRESSURE_WARN_PSI)),
                Cell::from(format!("{:.0} PSI", PRESSURE_WARN_PSI)),
            ]),
            Row::new(vec![
                Cell::from("Humidity"),
                Cell::from(format!("{:.1} %", latest.humidity)),
                Cell::from("-"),
            ]),
            Row::new(vec![
                Cell::from("Power"),
                Cell::from(format!("{:.1} kW", latest.power))
                    .style(flag(latest.power, POWER_WARN_KW)),
                Cell::from(format!("{:.0} kW", POWER_WARN_KW)),
            ]),
            Row::new(vec![
                Cell::from("Throughput"),
                Cell::from(format!("{:.1} %", latest.throughput)),
                Cell::from("-"),
            ]),
        ];

        let sensor_widths = [
            Constraint::Fill(2),
            Constraint::Length(14),
            Constraint::Length(12),
        ];

        let sensor_table = Table::new(sensor_rows, sensor_widths).header(sensor_header).block(
            Block::default()
                .title(format!(" Sensors ({} readings in window) ", readings.len()))
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        );

        frame.render_widget(sensor_table, chunks[1]);
    } else {
        let empty_block = Block::default()
            .title(" Sensors (0) ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No sensor readings yet",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(empty_block);
        frame.render_widget(empty, chunks[1]);
    }

    // ===== PREDICTIONS =====
    let active: Vec<_> = snapshot
        .predictions
        .iter()
        .filter(|p| p.equipment_id == eq.id && p.status == PredictionStatus::Active)
        .collect();

    let pred_block = Block::default()
        .title(format!(" Active Predictions ({}) ", active.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if active.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No active failure predictions",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(pred_block);
        frame.render_widget(empty, chunks[2]);
    } else {
        let lines: Vec<Line> = active
            .iter()
            .map(|p| {
                let factors: Vec<&str> = p
                    .contributing_factors
                    .iter()
                    .take(2)
                    .map(|f| f.factor.as_str())
                    .collect();
                Line::from(vec![
                    Span::styled(
                        format!(" {} ", format_percentage(p.failure_probability)),
                        Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!(
                        "{} expected {} ({})",
                        p.expected_failure_mode.label(),
                        format_date(p.expected_failure_date, DateStyle::Short),
                        factors.join(", "),
                    )),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(pred_block), chunks[2]);
    }

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " Press Esc to close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[3]);
}
