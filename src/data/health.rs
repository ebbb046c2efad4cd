//! Health classification and fleet-level aggregation.
//!
//! The classifier maps a continuous health score onto three ordinal
//! categories via fixed thresholds; the aggregator reduces an equipment
//! collection into the summary counts shown in the dashboard header.

use serde::{Deserialize, Serialize};

use super::model::{clamp_score, Equipment};

/// Scores at or above this are healthy.
pub const HEALTHY_MIN: f64 = 0.8;
/// Scores at or above this (but below [`HEALTHY_MIN`]) are in warning.
pub const WARNING_MIN: f64 = 0.6;

/// Health category for a piece of equipment.
///
/// Ordered so that `max()` picks the worst status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }

    /// Returns the display label for this status.
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Warning => "Warning",
            HealthStatus::Critical => "Critical",
        }
    }
}

/// Classify a health score into a category.
///
/// Thresholds: score >= 0.8 is healthy, 0.6 <= score < 0.8 is warning,
/// score < 0.6 is critical. Out-of-range or NaN inputs are clamped first,
/// so this is total over all of `f64`.
pub fn classify(score: f64) -> HealthStatus {
    let score = clamp_score(score);
    if score >= HEALTHY_MIN {
        HealthStatus::Healthy
    } else if score >= WARNING_MIN {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    }
}

/// Summary statistics over an equipment collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FleetStats {
    pub total: usize,
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
    /// Arithmetic mean of health scores; 0 for an empty fleet.
    pub avg_health: f64,
}

impl FleetStats {
    /// Compute summary statistics from scratch.
    ///
    /// Order-independent, and never cached: callers recompute per use so
    /// the summary can't go stale against the snapshot it came from.
    pub fn compute(equipment: &[Equipment]) -> Self {
        let total = equipment.len();
        let mut healthy = 0;
        let mut warning = 0;
        let mut critical = 0;
        let mut health_sum = 0.0;

        for eq in equipment {
            match classify(eq.health_score) {
                HealthStatus::Healthy => healthy += 1,
                HealthStatus::Warning => warning += 1,
                HealthStatus::Critical => critical += 1,
            }
            health_sum += clamp_score(eq.health_score);
        }

        let avg_health = if total == 0 {
            // Documented default for an empty fleet, not an error.
            0.0
        } else {
            health_sum / total as f64
        };

        Self {
            total,
            healthy,
            warning,
            critical,
            avg_health,
        }
    }

    /// The worst category present in the fleet.
    pub fn worst(&self) -> HealthStatus {
        if self.critical > 0 {
            HealthStatus::Critical
        } else if self.warning > 0 {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{EquipmentKind, EquipmentStatus, Location};
    use chrono::{TimeZone, Utc};

    fn equipment_with_health(id: &str, health: f64) -> Equipment {
        Equipment {
            id: id.to_string(),
            code: format!("EQ-{}", id),
            name: format!("Unit {}", id),
            kind: EquipmentKind::Motor,
            manufacturer: "ABB".to_string(),
            model: "M3BP".to_string(),
            factory_id: "factory-1".to_string(),
            production_line: "Line B".to_string(),
            location: Location {
                x: 0.0,
                y: 0.0,
                zone: "B-1".to_string(),
            },
            installation_date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            last_maintenance: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            next_maintenance: Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap(),
            status: EquipmentStatus::Operational,
            health_score: health,
            criticality: 0.5,
            degradation_rate: 0.001,
        }
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(classify(1.0), HealthStatus::Healthy);
        assert_eq!(classify(0.9), HealthStatus::Healthy);
        assert_eq!(classify(0.79), HealthStatus::Warning);
        assert_eq!(classify(0.6), HealthStatus::Warning);
        assert_eq!(classify(0.59), HealthStatus::Critical);
        assert_eq!(classify(0.0), HealthStatus::Critical);
    }

    #[test]
    fn test_classify_boundaries_inclusive_to_higher_category() {
        assert_eq!(classify(0.8), HealthStatus::Healthy);
        assert_eq!(classify(0.6), HealthStatus::Warning);
    }

    #[test]
    fn test_classify_clamps_bad_inputs() {
        assert_eq!(classify(1.5), HealthStatus::Healthy);
        assert_eq!(classify(-0.5), HealthStatus::Critical);
        assert_eq!(classify(f64::NAN), HealthStatus::Critical);
    }

    #[test]
    fn test_ordering_picks_worst() {
        let worst = [HealthStatus::Healthy, HealthStatus::Critical, HealthStatus::Warning]
            .into_iter()
            .max()
            .unwrap();
        assert_eq!(worst, HealthStatus::Critical);
    }

    #[test]
    fn test_stats_empty_fleet() {
        let stats = FleetStats::compute(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.healthy, 0);
        assert_eq!(stats.warning, 0);
        assert_eq!(stats.critical, 0);
        assert_eq!(stats.avg_health, 0.0);
    }

    #[test]
    fn test_stats_counts_sum_to_total() {
        let fleet = vec![
            equipment_with_health("1", 0.95),
            equipment_with_health("2", 0.8),
            equipment_with_health("3", 0.7),
            equipment_with_health("4", 0.59),
            equipment_with_health("5", 0.1),
        ];
        let stats = FleetStats::compute(&fleet);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.healthy, 2);
        assert_eq!(stats.warning, 1);
        assert_eq!(stats.critical, 2);
        assert_eq!(stats.healthy + stats.warning + stats.critical, stats.total);
    }

    #[test]
    fn test_stats_mean_health() {
        let fleet = vec![
            equipment_with_health("1", 0.8),
            equipment_with_health("2", 0.6),
        ];
        let stats = FleetStats::compute(&fleet);
        assert!((stats.avg_health - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_stats_order_independent() {
        let mut fleet = vec![
            equipment_with_health("1", 0.95),
            equipment_with_health("2", 0.65),
            equipment_with_health("3", 0.3),
        ];
        let forward = FleetStats::compute(&fleet);
        fleet.reverse();
        let backward = FleetStats::compute(&fleet);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_worst() {
        let fleet = vec![
            equipment_with_health("1", 0.9),
            equipment_with_health("2", 0.7),
        ];
        assert_eq!(FleetStats::compute(&fleet).worst(), HealthStatus::Warning);

        let fleet = vec![equipment_with_health("1", 0.9)];
        assert_eq!(FleetStats::compute(&fleet).worst(), HealthStatus::Healthy);
    }
}
