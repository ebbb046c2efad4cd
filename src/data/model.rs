//! Core equipment data model.
//!
//! These types form the in-process data-exchange contract between the
//! telemetry source and the dashboard. Health and criticality scores are
//! clamped to [0, 1] on construction and on deserialization; violating
//! inputs are never propagated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Clamp a score to [0, 1]. NaN maps to 0.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn de_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_score(raw))
}

/// Operating status of a piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    Operational,
    Maintenance,
    Failed,
    Idle,
    Degraded,
}

impl EquipmentStatus {
    /// Returns the display label for this status.
    pub fn label(&self) -> &'static str {
        match self {
            EquipmentStatus::Operational => "Operational",
            EquipmentStatus::Maintenance => "Maintenance",
            EquipmentStatus::Failed => "Failed",
            EquipmentStatus::Idle => "Idle",
            EquipmentStatus::Degraded => "Degraded",
        }
    }
}

/// Kind of industrial equipment being monitored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    Pump,
    Motor,
    Compressor,
    Conveyor,
    Mixer,
    Reactor,
    Separator,
}

impl EquipmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            EquipmentKind::Pump => "Pump",
            EquipmentKind::Motor => "Motor",
            EquipmentKind::Compressor => "Compressor",
            EquipmentKind::Conveyor => "Conveyor",
            EquipmentKind::Mixer => "Mixer",
            EquipmentKind::Reactor => "Reactor",
            EquipmentKind::Separator => "Separator",
        }
    }

    /// All kinds, in a fixed order (used by the fleet seeder).
    pub fn all() -> &'static [EquipmentKind] {
        &[
            EquipmentKind::Pump,
            EquipmentKind::Motor,
            EquipmentKind::Compressor,
            EquipmentKind::Conveyor,
            EquipmentKind::Mixer,
            EquipmentKind::Reactor,
            EquipmentKind::Separator,
        ]
    }
}

/// Physical placement of equipment on the factory floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub zone: String,
}

/// A monitored piece of equipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,
    /// Human-assigned equipment code (e.g. "PMP-A-012").
    pub code: String,
    pub name: String,
    pub kind: EquipmentKind,
    pub manufacturer: String,
    pub model: String,
    pub factory_id: String,
    pub production_line: String,
    pub location: Location,
    pub installation_date: DateTime<Utc>,
    pub last_maintenance: DateTime<Utc>,
    pub next_maintenance: DateTime<Utc>,
    pub status: EquipmentStatus,
    /// Current condition, 0 (failed) to 1 (perfect). Always in [0, 1].
    #[serde(deserialize_with = "de_score")]
    pub health_score: f64,
    /// Business importance, independent of condition. Always in [0, 1].
    #[serde(deserialize_with = "de_score")]
    pub criticality: f64,
    /// Expected health loss per day under normal operation.
    pub degradation_rate: f64,
}

impl Equipment {
    /// Set the health score, clamping to [0, 1].
    pub fn set_health(&mut self, score: f64) {
        self.health_score = clamp_score(score);
    }
}

/// A single timestamped sensor measurement tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub equipment_id: String,
    pub timestamp: DateTime<Utc>,
    /// Degrees Celsius.
    pub temperature: f64,
    /// mm/s RMS.
    pub vibration: f64,
    /// PSI.
    pub pressure: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// kW.
    pub power: f64,
    /// Units per hour, percent of rated.
    pub throughput: f64,
    /// Set probabilistically by the simulated feed, not derived from the
    /// measurement values.
    pub is_anomaly: bool,
    #[serde(deserialize_with = "de_score")]
    pub anomaly_score: f64,
}

/// Predicted failure mode for a piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    BearingFailure,
    MotorFailure,
    SealFailure,
    ElectricalFailure,
    SensorFailure,
    HydraulicFailure,
    Unknown,
}

impl FailureMode {
    pub fn label(&self) -> &'static str {
        match self {
            FailureMode::BearingFailure => "Bearing failure",
            FailureMode::MotorFailure => "Motor failure",
            FailureMode::SealFailure => "Seal failure",
            FailureMode::ElectricalFailure => "Electrical failure",
            FailureMode::SensorFailure => "Sensor failure",
            FailureMode::HydraulicFailure => "Hydraulic failure",
            FailureMode::Unknown => "Unknown",
        }
    }
}

/// Lifecycle status of a failure prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Active,
    Resolved,
    Expired,
    FalseAlarm,
}

impl PredictionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PredictionStatus::Active => "Active",
            PredictionStatus::Resolved => "Resolved",
            PredictionStatus::Expired => "Expired",
            PredictionStatus::FalseAlarm => "False alarm",
        }
    }
}

/// A named factor contributing to a failure prediction, with its weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorContribution {
    pub factor: String,
    /// Relative importance weight in [0, 1].
    #[serde(deserialize_with = "de_score")]
    pub importance: f64,
}

/// A forecast that a given piece of equipment will fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailurePrediction {
    pub id: String,
    pub equipment_id: String,
    pub predicted_at: DateTime<Utc>,
    #[serde(deserialize_with = "de_score")]
    pub failure_probability: f64,
    #[serde(deserialize_with = "de_score")]
    pub confidence: f64,
    pub expected_failure_mode: FailureMode,
    pub expected_failure_date: DateTime<Utc>,
    /// Estimated remediation cost in whole dollars.
    pub estimated_cost: f64,
    /// Ranked, highest importance first.
    pub contributing_factors: Vec<FactorContribution>,
    pub status: PredictionStatus,
    pub acknowledged: bool,
}

/// Category of maintenance work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceType {
    Preventive,
    Corrective,
    Predictive,
    Emergency,
}

impl MaintenanceType {
    pub fn label(&self) -> &'static str {
        match self {
            MaintenanceType::Preventive => "Preventive",
            MaintenanceType::Corrective => "Corrective",
            MaintenanceType::Predictive => "Predictive",
            MaintenanceType::Emergency => "Emergency",
        }
    }
}

/// Lifecycle status of a maintenance work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl WorkOrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            WorkOrderStatus::Scheduled => "Scheduled",
            WorkOrderStatus::InProgress => "In progress",
            WorkOrderStatus::Completed => "Completed",
            WorkOrderStatus::Cancelled => "Cancelled",
        }
    }
}

/// A tracked maintenance task against one piece of equipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: String,
    pub equipment_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub maintenance_type: MaintenanceType,
    pub description: String,
    pub technician: String,
    pub cost: f64,
    pub status: WorkOrderStatus,
    pub issues_found: Vec<String>,
}

/// Severity tag attached to a live alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
}

impl AlertSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "INFO",
            AlertSeverity::Warning => "WARN",
            AlertSeverity::Error => "ERROR",
        }
    }
}

/// A live alert emitted by the telemetry source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub equipment_id: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_equipment() -> Equipment {
        Equipment {
            id: "eq-001".to_string(),
            code: "PMP-A-001".to_string(),
            name: "Hydraulic Pump A1".to_string(),
            kind: EquipmentKind::Pump,
            manufacturer: "Flowserve".to_string(),
            model: "HPX-6000".to_string(),
            factory_id: "factory-1".to_string(),
            production_line: "Line A".to_string(),
            location: Location {
                x: 12.0,
                y: 4.5,
                zone: "A-North".to_string(),
            },
            installation_date: Utc.with_ymd_and_hms(2019, 3, 12, 0, 0, 0).unwrap(),
            last_maintenance: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
            next_maintenance: Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap(),
            status: EquipmentStatus::Operational,
            health_score: 0.92,
            criticality: 0.7,
            degradation_rate: 0.001,
        }
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(0.5), 0.5);
        assert_eq!(clamp_score(-0.3), 0.0);
        assert_eq!(clamp_score(1.7), 1.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
    }

    #[test]
    fn test_set_health_clamps() {
        let mut eq = sample_equipment();
        eq.set_health(1.4);
        assert_eq!(eq.health_score, 1.0);
        eq.set_health(-0.1);
        assert_eq!(eq.health_score, 0.0);
    }

    #[test]
    fn test_equipment_roundtrip() {
        let eq = sample_equipment();
        let json = serde_json::to_string(&eq).unwrap();
        let back: Equipment = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, eq.id);
        assert_eq!(back.kind, EquipmentKind::Pump);
        assert_eq!(back.status, EquipmentStatus::Operational);
        assert_eq!(back.health_score, eq.health_score);
    }

    #[test]
    fn test_deserialize_clamps_out_of_range_scores() {
        let mut value = serde_json::to_value(sample_equipment()).unwrap();
        value["health_score"] = serde_json::json!(3.5);
        value["criticality"] = serde_json::json!(-2.0);

        let eq: Equipment = serde_json::from_value(value).unwrap();
        assert_eq!(eq.health_score, 1.0);
        assert_eq!(eq.criticality, 0.0);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&WorkOrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let json = serde_json::to_string(&PredictionStatus::FalseAlarm).unwrap();
        assert_eq!(json, "\"false_alarm\"");
    }
}
