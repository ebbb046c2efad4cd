// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # plantwatch
//!
//! A predictive-maintenance TUI and library for monitoring industrial
//! equipment fleets.
//!
//! This crate tracks the health of pumps, motors, compressors, and other
//! plant equipment. It receives plant snapshots from various sources (the
//! built-in simulator, snapshot files, in-memory channels) and displays
//! them in an interactive terminal UI with failure predictions and
//! maintenance schedules.
//!
//! ## Architecture
//!
//! The crate is organized into four main modules:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(processing)   │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── SimulatedPlant | FileSource | ChannelSource│
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction logic
//! - **[`source`]**: Telemetry source abstraction ([`TelemetrySource`] trait) with
//!   the built-in plant simulator, file polling, and channel-based input
//! - **[`data`]**: Data models and processing - equipment records, health
//!   classification, fleet statistics, display formatting, and health history
//!   for sparklines
//! - **[`ui`]**: Terminal rendering using ratatui - fleet tables, alert feeds,
//!   maintenance schedules, and theme support
//!
//! ## Features
//!
//! - **Fleet view**: Overview of all equipment with health status and trends
//! - **Alerts view**: Live alert feed plus ranked failure predictions
//! - **Schedule view**: Maintenance work orders ordered by start time
//! - **Historical tracking**: Health sparklines per equipment unit
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Run against the built-in simulator (default)
//! plantwatch
//!
//! # Deterministic simulation for demos
//! plantwatch --seed 42
//!
//! # Monitor a JSON snapshot file
//! plantwatch --file plant.json
//! ```
//!
//! ### As a library with the simulator
//!
//! ```
//! use plantwatch::{App, SimSettings, SimulatedPlant};
//!
//! let sim = SimulatedPlant::new(SimSettings::default());
//! let app = App::new(Box::new(sim));
//! ```
//!
//! ### As a library with a file source
//!
//! ```
//! use plantwatch::{App, FileSource};
//!
//! let source = Box::new(FileSource::new("plant.json"));
//! let app = App::new(source);
//! ```
//!
//! ### As a library with a channel source (for pipeline integration)
//!
//! ```
//! use plantwatch::{App, ChannelSource};
//!
//! // Create a channel for receiving snapshots
//! let (tx, source) = ChannelSource::create("mqtt://broker:1883");
//!
//! // Create the app
//! let app = App::new(Box::new(source));
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use data::{
    classify, AlertEvent, Equipment, FailurePrediction, FleetStats, HealthHistory, HealthStatus,
    MaintenanceRecord, SensorReading,
};
pub use source::{
    ChannelSource, FileSource, PlantSnapshot, SimSettings, SimulatedPlant, TelemetrySource,
};
