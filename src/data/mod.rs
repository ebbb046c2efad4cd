//! Data model, derivation, and formatting for plant snapshots.
//!
//! This is the logic-bearing layer of the dashboard: everything here is a
//! pure transformation over snapshot data handed out by a telemetry
//! source.
//!
//! ## Submodules
//!
//! - [`model`]: Equipment, sensor, prediction, and maintenance records
//! - [`health`]: Health classification ([`classify`]) and fleet
//!   aggregation ([`FleetStats`])
//! - [`format`]: Display formatters (currency, percentage, dates,
//!   day counts)
//! - [`history`]: Bounded per-equipment health history for sparklines
//!
//! ## Data Flow
//!
//! ```text
//! PlantSnapshot (from a TelemetrySource)
//!        │
//!        ├──▶ FleetStats::compute()   (header counts, recomputed per frame)
//!        │
//!        ├──▶ classify() / format_*() (per-row display values)
//!        │
//!        └──▶ HealthHistory::record() (sparklines and trend arrows)
//! ```

pub mod format;
pub mod health;
pub mod history;
pub mod model;

pub use health::{classify, FleetStats, HealthStatus};
pub use history::HealthHistory;
pub use model::{
    AlertEvent, AlertSeverity, Equipment, EquipmentKind, EquipmentStatus, FactorContribution,
    FailureMode, FailurePrediction, Location, MaintenanceRecord, MaintenanceType, PredictionStatus,
    SensorReading, WorkOrderStatus,
};
