//! Historical health tracking for sparklines and trend indicators.

use std::collections::{HashMap, VecDeque};

use crate::source::PlantSnapshot;

/// Maximum number of historical samples to keep per equipment.
const MAX_HISTORY_SIZE: usize = 60;

/// Tracks health scores over time for trend display.
///
/// Records one sample per equipment per snapshot so the fleet view can
/// show a sparkline and a trend arrow beside the current score.
#[derive(Debug, Clone, Default)]
pub struct HealthHistory {
    scores: HashMap<String, VecDeque<f64>>,
}

impl HealthHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record health scores from a snapshot.
    pub fn record(&mut self, snapshot: &PlantSnapshot) {
        for eq in &snapshot.equipment {
            let samples = self.scores.entry(eq.id.clone()).or_default();
            samples.push_back(eq.health_score);
            if samples.len() > MAX_HISTORY_SIZE {
                samples.pop_front();
            }
        }
    }

    /// Sparkline levels (0-7) for an equipment's recent health scores.
    ///
    /// Health is already bounded to [0, 1], so levels map the score
    /// directly rather than normalizing over the window. Returns an empty
    /// Vec when there is no history for the id.
    pub fn sparkline(&self, equipment_id: &str) -> Vec<u8> {
        let Some(samples) = self.scores.get(equipment_id) else {
            return Vec::new();
        };
        samples.iter().map(|&v| ((v * 7.0).round() as u8).min(7)).collect()
    }

    /// Change in health between the last two samples, if available.
    pub fn trend(&self, equipment_id: &str) -> Option<f64> {
        let samples = self.scores.get(equipment_id)?;
        if samples.len() < 2 {
            return None;
        }
        let current = *samples.back()?;
        let previous = *samples.get(samples.len() - 2)?;
        Some(current - previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::sim::{SimSettings, SimulatedPlant};

    fn snapshot_with_health(health: f64) -> PlantSnapshot {
        let settings = SimSettings {
            fleet_size: 1,
            seed: Some(7),
            ..SimSettings::default()
        };
        let mut sim = SimulatedPlant::new(settings);
        sim.set_health_for_test(health);
        sim.snapshot()
    }

    #[test]
    fn test_record_and_trend() {
        let mut history = HealthHistory::new();
        let first = snapshot_with_health(0.8);
        let id = first.equipment[0].id.clone();

        history.record(&first);
        assert!(history.trend(&id).is_none());

        history.record(&snapshot_with_health(0.9));
        let trend = history.trend(&id).unwrap();
        assert!((trend - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_history_bounded() {
        let mut history = HealthHistory::new();
        let snapshot = snapshot_with_health(0.5);
        let id = snapshot.equipment[0].id.clone();

        for _ in 0..(MAX_HISTORY_SIZE + 20) {
            history.record(&snapshot);
        }
        assert_eq!(history.sparkline(&id).len(), MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_sparkline_levels() {
        let mut history = HealthHistory::new();
        let top = snapshot_with_health(1.0);
        let id = top.equipment[0].id.clone();
        history.record(&top);
        assert_eq!(history.sparkline(&id), vec![7]);

        let mut history = HealthHistory::new();
        let bottom = snapshot_with_health(0.0);
        history.record(&bottom);
        assert_eq!(history.sparkline(&id), vec![0]);
    }

    #[test]
    fn test_unknown_equipment_is_empty() {
        let history = HealthHistory::new();
        assert!(history.sparkline("eq-missing").is_empty());
        assert!(history.trend("eq-missing").is_none());
    }
}
