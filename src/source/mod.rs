//! Telemetry source abstraction for receiving plant snapshots.
//!
//! The aggregator and formatters never talk to a data source directly;
//! they consume immutable [`PlantSnapshot`] values. A source publishes a
//! snapshot only after fully computing it, so consumers never observe a
//! partially updated collection. Swapping the built-in simulator for a
//! real feed means implementing [`TelemetrySource`] and nothing else.

pub mod channel;
pub mod file;
pub mod sim;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use sim::{SimSettings, SimulatedPlant};

use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{AlertEvent, Equipment, FailurePrediction, MaintenanceRecord, SensorReading};

/// A complete, self-consistent view of the plant at one instant.
///
/// Sensor readings are a bounded trailing window per equipment id, most
/// recent last. Predictions, maintenance records, and alerts reference
/// equipment by id; a dangling reference is displayable (consumers fall
/// back to the raw id), never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantSnapshot {
    pub generated_at: DateTime<Utc>,
    pub equipment: Vec<Equipment>,
    /// Trailing reading windows keyed by equipment id.
    pub readings: BTreeMap<String, Vec<SensorReading>>,
    pub predictions: Vec<FailurePrediction>,
    pub maintenance: Vec<MaintenanceRecord>,
    /// Most recent alerts, newest first.
    pub alerts: Vec<AlertEvent>,
    /// Whether the upstream feed considers itself connected.
    pub connected: bool,
}

impl Default for PlantSnapshot {
    fn default() -> Self {
        Self {
            generated_at: Utc::now(),
            equipment: Vec::new(),
            readings: BTreeMap::new(),
            predictions: Vec::new(),
            maintenance: Vec::new(),
            alerts: Vec::new(),
            connected: true,
        }
    }
}

impl PlantSnapshot {
    /// Look up equipment by id.
    pub fn equipment_by_id(&self, id: &str) -> Option<&Equipment> {
        self.equipment.iter().find(|eq| eq.id == id)
    }

    /// Display name for an equipment id, falling back to the raw id when
    /// the reference is unknown.
    pub fn equipment_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.equipment_by_id(id).map(|eq| eq.name.as_str()).unwrap_or(id)
    }

    /// The trailing reading window for an equipment id (oldest first).
    pub fn readings_for(&self, id: &str) -> &[SensorReading] {
        self.readings.get(id).map(|r| r.as_slice()).unwrap_or(&[])
    }
}

/// Trait for receiving plant snapshots from various backends.
///
/// Implementations provide snapshots from the built-in simulator, a
/// snapshot file, or an in-memory channel fed by a real telemetry
/// pipeline.
pub trait TelemetrySource: Send + Debug {
    /// Poll for the latest snapshot.
    ///
    /// Returns `Some(snapshot)` if new data is available, `None`
    /// otherwise. Must be non-blocking.
    fn poll(&mut self) -> Option<PlantSnapshot>;

    /// Human-readable description of the source, for the status bar.
    fn description(&self) -> &str;

    /// Error message from the last poll, if any.
    fn error(&self) -> Option<&str>;

    /// Pause or resume the live simulation, where the source supports it.
    ///
    /// Pausing suspends sensor and alert generation only; sources that
    /// have no live component ignore this.
    fn set_streaming(&mut self, _streaming: bool) {}

    /// Whether the source is currently generating live data.
    fn is_streaming(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equipment_name_falls_back_to_raw_id() {
        let snapshot = PlantSnapshot::default();
        assert_eq!(snapshot.equipment_name("eq-404"), "eq-404");
    }

    #[test]
    fn test_equipment_name_resolves_known_id() {
        let sim = sim::SimulatedPlant::new(sim::SimSettings {
            fleet_size: 2,
            seed: Some(13),
            ..sim::SimSettings::default()
        });
        let snapshot = sim.snapshot();
        // The id borrow may be shorter-lived than the snapshot.
        let id = snapshot.equipment[0].id.clone();
        assert_eq!(snapshot.equipment_name(&id), snapshot.equipment[0].name);
    }

    #[test]
    fn test_readings_for_unknown_id_is_empty() {
        let snapshot = PlantSnapshot::default();
        assert!(snapshot.readings_for("eq-404").is_empty());
    }
}
