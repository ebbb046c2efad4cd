// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};

mod app;
mod data;
mod events;
mod source;
mod ui;

use app::{App, View};
use source::{FileSource, SimSettings, SimulatedPlant, TelemetrySource};

#[derive(Parser, Debug)]
#[command(name = "plantwatch")]
#[command(about = "Predictive-maintenance TUI for monitoring industrial equipment fleets")]
struct Args {
    /// Path to a plant snapshot JSON file (instead of the simulator)
    #[arg(short, long, conflicts_with_all = ["config", "seed", "fleet_size"])]
    file: Option<PathBuf>,

    /// Path to a simulator settings file (TOML/JSON/YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the simulator RNG (deterministic runs)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of equipment units to simulate
    #[arg(long)]
    fleet_size: Option<usize>,

    /// Refresh interval in milliseconds (only used with --file)
    #[arg(short, long, default_value = "1000")]
    refresh: u64,

    /// Export current state to JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return export_to_file(&args, export_path);
    }

    // File-based mode
    if let Some(ref path) = args.file {
        let source = Box::new(FileSource::new(path));
        return run_tui(source, Duration::from_millis(args.refresh));
    }

    // Default: built-in simulator
    let source = Box::new(SimulatedPlant::new(sim_settings(&args)?));
    run_tui(source, Duration::from_millis(100))
}

/// Simulator settings from the config file (if any) with CLI overrides.
fn sim_settings(args: &Args) -> Result<SimSettings> {
    let mut settings = match args.config {
        Some(ref path) => SimSettings::load(path)?,
        None => SimSettings::default(),
    };
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if let Some(fleet_size) = args.fleet_size {
        settings.fleet_size = fleet_size;
    }
    Ok(settings)
}

/// Run the TUI with the given telemetry source
fn run_tui(source: Box<dyn TelemetrySource>, refresh_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    // Create app and load initial data
    let mut app = App::new(source);
    let _ = app.reload_data();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                frame.render_widget(paragraph, undersize_message_area(area));
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            // Render header with fleet health
            ui::common::render_header(frame, app, chunks[0]);

            // Render tabs
            ui::common::render_tabs(frame, app, chunks[1]);

            // Render current view
            match app.current_view {
                View::Fleet => ui::fleet::render(frame, app, chunks[2]),
                View::Alerts => ui::alerts::render(frame, app, chunks[2]),
                View::Schedule => ui::schedule::render(frame, app, chunks[2]),
            }

            // Render status bar
            ui::common::render_status_bar(frame, app, chunks[3]);

            // Render detail overlay if active
            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            // Render help overlay if active
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Content starts after header (1) + tabs (1) + table header (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Auto-refresh data periodically
        if last_refresh.elapsed() >= refresh_interval {
            let _ = app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Vertically centered strip for the too-small-terminal message.
///
/// Stays inside `area` even when the terminal is only a few rows tall.
fn undersize_message_area(area: ratatui::layout::Rect) -> ratatui::layout::Rect {
    let y = (area.height / 2).saturating_sub(2);
    let height = area.height.saturating_sub(y).min(5);
    ratatui::layout::Rect::new(area.x, area.y + y, area.width, height)
}

/// Export current plant state to a JSON file without starting the TUI
fn export_to_file(args: &Args, export_path: &std::path::Path) -> Result<()> {
    use std::io::Write;

    let snapshot = match args.file {
        Some(ref path) => {
            let mut source = FileSource::new(path);
            match source.poll() {
                Some(snapshot) => snapshot,
                None => {
                    let err = source.error().unwrap_or("no data available").to_string();
                    anyhow::bail!("failed to load {}: {}", path.display(), err);
                }
            }
        }
        None => SimulatedPlant::new(sim_settings(args)?).snapshot(),
    };

    let export = app::build_export(&snapshot);
    let json = serde_json::to_string_pretty(&export)?;
    let mut file = std::fs::File::create(export_path)?;
    file.write_all(json.as_bytes())?;

    println!("Exported plant state to: {}", export_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    #[test]
    fn test_undersize_message_area_fits_tiny_terminals() {
        for height in 0..8 {
            let area = Rect::new(0, 0, 40, height);
            let msg = undersize_message_area(area);
            assert!(msg.y >= area.y);
            assert!(msg.bottom() <= area.bottom());
        }
    }
}
