//! Simulated plant telemetry.
//!
//! Stands in for a live feed: seeds a mock fleet, then on independent
//! cadences appends sensor readings, nudges health scores with a small
//! bounded random walk, emits canned alerts, and flickers the connection
//! flag. Anomaly flags are sampled probabilistically, independent of the
//! measurement values; this is a stub, not a detector.
//!
//! Tick logic is exposed as explicit `tick_*` methods driven by `poll`,
//! so tests can advance the simulation without timers.

use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use super::{PlantSnapshot, TelemetrySource};
use crate::data::model::clamp_score;
use crate::data::{
    AlertEvent, AlertSeverity, Equipment, EquipmentKind, EquipmentStatus, FactorContribution,
    FailureMode, FailurePrediction, Location, MaintenanceRecord, MaintenanceType,
    PredictionStatus, SensorReading, WorkOrderStatus,
};

/// Maximum number of alerts retained in the live feed.
const MAX_ALERTS: usize = 10;

/// Number of readings backfilled per equipment at startup.
const BACKFILL_READINGS: usize = 30;

/// Tunable simulation parameters.
///
/// Loadable from a settings file (with `PLANTWATCH_*` environment
/// overrides) via [`SimSettings::load`]; every field has a default so an
/// empty file is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Cadence for appending sensor readings, in milliseconds.
    pub sensor_interval_ms: u64,
    /// Cadence for health-score nudges, in milliseconds.
    pub health_interval_ms: u64,
    /// Cadence for canned alert emission, in milliseconds.
    pub alert_interval_ms: u64,
    /// Cadence for connection-flag sampling, in milliseconds.
    pub connection_interval_ms: u64,
    /// Trailing reading window bound per equipment.
    pub window: usize,
    /// Probability that a generated reading is flagged anomalous.
    pub anomaly_probability: f64,
    /// Probability that a connection sample comes up disconnected.
    pub disconnect_probability: f64,
    /// Number of equipment records to seed.
    pub fleet_size: usize,
    /// RNG seed; omit for entropy-seeded runs.
    pub seed: Option<u64>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            sensor_interval_ms: 2000,
            health_interval_ms: 3000,
            alert_interval_ms: 8000,
            connection_interval_ms: 10_000,
            window: 50,
            anomaly_probability: 0.1,
            disconnect_probability: 0.05,
            fleet_size: 12,
            seed: None,
        }
    }
}

impl SimSettings {
    /// Load settings from a file, layered with environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("PLANTWATCH"))
            .build()
            .with_context(|| format!("reading sim settings from {}", path.display()))?;
        settings.try_deserialize().context("invalid sim settings")
    }

    pub fn sensor_interval(&self) -> Duration {
        Duration::from_millis(self.sensor_interval_ms)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms)
    }

    pub fn alert_interval(&self) -> Duration {
        Duration::from_millis(self.alert_interval_ms)
    }

    pub fn connection_interval(&self) -> Duration {
        Duration::from_millis(self.connection_interval_ms)
    }
}

/// The simulated telemetry source.
///
/// Owns all mutable plant state; consumers only ever receive cloned
/// [`PlantSnapshot`] values built after a full set of ticks completes.
#[derive(Debug)]
pub struct SimulatedPlant {
    settings: SimSettings,
    rng: StdRng,
    description: String,

    equipment: Vec<Equipment>,
    readings: BTreeMap<String, VecDeque<SensorReading>>,
    predictions: Vec<FailurePrediction>,
    maintenance: Vec<MaintenanceRecord>,
    alerts: VecDeque<AlertEvent>,
    connected: bool,

    streaming: bool,
    last_sensor_tick: Instant,
    last_health_tick: Instant,
    last_alert_tick: Instant,
    last_connection_tick: Instant,
    initial_returned: bool,
}

impl SimulatedPlant {
    /// Create a simulator with a freshly seeded fleet.
    pub fn new(settings: SimSettings) -> Self {
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let now = Utc::now();
        let equipment = seed_fleet(&mut rng, settings.fleet_size, now);
        let readings = backfill_readings(
            &mut rng,
            &equipment,
            now,
            settings.sensor_interval(),
            settings.anomaly_probability,
            settings.window,
        );
        let predictions = seed_predictions(&mut rng, &equipment, now);
        let maintenance = seed_maintenance(&mut rng, &equipment);

        let started = Instant::now();
        Self {
            description: format!("simulated plant ({} units)", settings.fleet_size),
            settings,
            rng,
            equipment,
            readings,
            predictions,
            maintenance,
            alerts: VecDeque::new(),
            connected: true,
            streaming: true,
            last_sensor_tick: started,
            last_health_tick: started,
            last_alert_tick: started,
            last_connection_tick: started,
            initial_returned: false,
        }
    }

    /// Build a snapshot of the current state.
    ///
    /// Called only after in-progress ticks have fully completed, so the
    /// result is always self-consistent.
    pub fn snapshot(&self) -> PlantSnapshot {
        PlantSnapshot {
            generated_at: Utc::now(),
            equipment: self.equipment.clone(),
            readings: self
                .readings
                .iter()
                .map(|(id, window)| (id.clone(), window.iter().cloned().collect()))
                .collect(),
            predictions: self.predictions.clone(),
            maintenance: self.maintenance.clone(),
            alerts: self.alerts.iter().cloned().collect(),
            connected: self.connected,
        }
    }

    /// Append one generated reading per equipment, evicting beyond the
    /// window bound.
    pub fn tick_sensors(&mut self, now: DateTime<Utc>) {
        let anomaly_p = self.settings.anomaly_probability;
        let window = self.settings.window;
        for eq in &self.equipment {
            let reading = generate_reading(&mut self.rng, &eq.id, now, anomaly_p);
            let entry = self.readings.entry(eq.id.clone()).or_default();
            entry.push_back(reading);
            while entry.len() > window {
                entry.pop_front();
            }
        }
    }

    /// Nudge each health score by a small bounded zero-mean delta.
    pub fn tick_health(&mut self) {
        for eq in &mut self.equipment {
            let delta = (self.rng.gen::<f64>() - 0.5) * 0.02;
            eq.set_health(eq.health_score + delta);
        }
    }

    /// Emit one canned alert against a random equipment unit.
    pub fn tick_alerts(&mut self, now: DateTime<Utc>) {
        const TEMPLATES: &[(&str, AlertSeverity)] = &[
            ("Temperature threshold exceeded", AlertSeverity::Warning),
            ("Failure probability increased", AlertSeverity::Error),
            ("Health score improved", AlertSeverity::Info),
            ("Vibration trending upward", AlertSeverity::Warning),
        ];

        if self.equipment.is_empty() {
            return;
        }
        let eq = &self.equipment[self.rng.gen_range(0..self.equipment.len())];
        let (message, severity) = TEMPLATES[self.rng.gen_range(0..TEMPLATES.len())];

        self.alerts.push_front(AlertEvent {
            equipment_id: eq.id.clone(),
            message: message.to_string(),
            severity,
            timestamp: now,
        });
        self.alerts.truncate(MAX_ALERTS);
    }

    /// Re-sample the connection flag.
    pub fn tick_connection(&mut self) {
        self.connected = !self.rng.gen_bool(self.settings.disconnect_probability);
    }

    /// Number of buffered readings for an equipment id.
    pub fn window_len(&self, equipment_id: &str) -> usize {
        self.readings.get(equipment_id).map(VecDeque::len).unwrap_or(0)
    }

    /// Borrow the seeded fleet.
    pub fn equipment(&self) -> &[Equipment] {
        &self.equipment
    }

    /// Apply all ticks whose cadence has elapsed. Returns true if any
    /// state changed.
    fn advance(&mut self) -> bool {
        let now = Utc::now();
        let mut changed = false;

        if self.streaming && self.last_sensor_tick.elapsed() >= self.settings.sensor_interval() {
            self.tick_sensors(now);
            self.last_sensor_tick = Instant::now();
            changed = true;
        }
        if self.last_health_tick.elapsed() >= self.settings.health_interval() {
            self.tick_health();
            self.last_health_tick = Instant::now();
            changed = true;
        }
        if self.streaming && self.last_alert_tick.elapsed() >= self.settings.alert_interval() {
            self.tick_alerts(now);
            self.last_alert_tick = Instant::now();
            changed = true;
        }
        if self.last_connection_tick.elapsed() >= self.settings.connection_interval() {
            self.tick_connection();
            self.last_connection_tick = Instant::now();
            changed = true;
        }

        changed
    }

    #[cfg(test)]
    pub(crate) fn set_health_for_test(&mut self, health: f64) {
        for eq in &mut self.equipment {
            eq.set_health(health);
        }
    }
}

impl TelemetrySource for SimulatedPlant {
    fn poll(&mut self) -> Option<PlantSnapshot> {
        let changed = self.advance();
        if changed || !self.initial_returned {
            self.initial_returned = true;
            Some(self.snapshot())
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        None
    }

    fn set_streaming(&mut self, streaming: bool) {
        // Resuming resets the sensor/alert timers so a long pause doesn't
        // fire a burst of catch-up ticks.
        if streaming && !self.streaming {
            self.last_sensor_tick = Instant::now();
            self.last_alert_tick = Instant::now();
        }
        self.streaming = streaming;
    }

    fn is_streaming(&self) -> bool {
        self.streaming
    }
}

/// Generate one sensor reading with measurements in plausible operating
/// ranges. The anomaly flag is sampled independently of the values.
fn generate_reading(
    rng: &mut StdRng,
    equipment_id: &str,
    timestamp: DateTime<Utc>,
    anomaly_probability: f64,
) -> SensorReading {
    SensorReading {
        equipment_id: equipment_id.to_string(),
        timestamp,
        temperature: 65.0 + rng.gen::<f64>() * 30.0,
        vibration: 2.0 + rng.gen::<f64>() * 4.0,
        pressure: 100.0 + rng.gen::<f64>() * 20.0,
        humidity: 40.0 + rng.gen::<f64>() * 20.0,
        power: 50.0 + rng.gen::<f64>() * 30.0,
        throughput: 80.0 + rng.gen::<f64>() * 20.0,
        is_anomaly: rng.gen_bool(anomaly_probability),
        anomaly_score: rng.gen::<f64>() * 0.5,
    }
}

fn seed_fleet(rng: &mut StdRng, count: usize, now: DateTime<Utc>) -> Vec<Equipment> {
    const MANUFACTURERS: &[(&str, &str)] = &[
        ("Flowserve", "HPX-6000"),
        ("ABB", "M3BP-355"),
        ("Atlas Copco", "GA-90"),
        ("Siemens", "SIMOTICS-XP"),
        ("Sulzer", "AHLSTAR-UP"),
    ];
    const ZONES: &[&str] = &["A-North", "A-South", "B-East", "B-West"];
    const LINES: &[&str] = &["Line A", "Line B", "Line C"];

    let kinds = EquipmentKind::all();

    (0..count)
        .map(|i| {
            let kind = kinds[i % kinds.len()];
            let (manufacturer, model) = MANUFACTURERS[rng.gen_range(0..MANUFACTURERS.len())];
            let zone = ZONES[rng.gen_range(0..ZONES.len())];
            let line = LINES[i % LINES.len()];

            let health = clamp_score(0.45 + rng.gen::<f64>() * 0.55);
            let status = if health < 0.3 {
                EquipmentStatus::Failed
            } else if health < 0.5 {
                EquipmentStatus::Degraded
            } else if rng.gen_bool(0.1) {
                EquipmentStatus::Idle
            } else {
                EquipmentStatus::Operational
            };

            let installed_days = rng.gen_range(400..3000);
            let last_maint_days = rng.gen_range(20..120);
            let next_maint_days = rng.gen_range(3..90);

            Equipment {
                id: format!("eq-{:03}", i + 1),
                code: format!("{}-{:03}", kind.label().to_uppercase(), i + 1),
                name: format!("{} {}{}", kind.label(), line.chars().last().unwrap_or('A'), i + 1),
                kind,
                manufacturer: manufacturer.to_string(),
                model: model.to_string(),
                factory_id: format!("factory-{}", (i % 2) + 1),
                production_line: line.to_string(),
                location: Location {
                    x: rng.gen::<f64>() * 100.0,
                    y: rng.gen::<f64>() * 40.0,
                    zone: zone.to_string(),
                },
                installation_date: now - chrono::Duration::days(installed_days),
                last_maintenance: now - chrono::Duration::days(last_maint_days),
                next_maintenance: now + chrono::Duration::days(next_maint_days),
                status,
                health_score: health,
                criticality: clamp_score(rng.gen::<f64>()),
                degradation_rate: rng.gen::<f64>() * 0.003,
            }
        })
        .collect()
}

fn backfill_readings(
    rng: &mut StdRng,
    equipment: &[Equipment],
    now: DateTime<Utc>,
    interval: Duration,
    anomaly_probability: f64,
    window: usize,
) -> BTreeMap<String, VecDeque<SensorReading>> {
    let count = BACKFILL_READINGS.min(window);
    let step = chrono::Duration::from_std(interval).unwrap_or(chrono::Duration::seconds(2));

    equipment
        .iter()
        .map(|eq| {
            let readings = (0..count)
                .map(|i| {
                    let ts = now - step * ((count - i) as i32);
                    generate_reading(rng, &eq.id, ts, anomaly_probability)
                })
                .collect();
            (eq.id.clone(), readings)
        })
        .collect()
}

fn seed_predictions(
    rng: &mut StdRng,
    equipment: &[Equipment],
    now: DateTime<Utc>,
) -> Vec<FailurePrediction> {
    const MODES: &[FailureMode] = &[
        FailureMode::BearingFailure,
        FailureMode::MotorFailure,
        FailureMode::SealFailure,
        FailureMode::ElectricalFailure,
        FailureMode::SensorFailure,
        FailureMode::HydraulicFailure,
    ];
    const FACTORS: &[&str] = &[
        "Vibration RMS",
        "Bearing temperature",
        "Operating hours",
        "Load variance",
        "Ambient humidity",
    ];

    equipment
        .iter()
        .filter(|eq| eq.health_score < 0.75)
        .enumerate()
        .map(|(i, eq)| {
            let probability = clamp_score(1.0 - eq.health_score + rng.gen::<f64>() * 0.1);
            let horizon_days = rng.gen_range(5..45);

            // Two or three ranked factors, importance descending.
            let mut importance = 0.3 + rng.gen::<f64>() * 0.5;
            let factors = (0..rng.gen_range(2..4))
                .map(|j| {
                    let f = FactorContribution {
                        factor: FACTORS[(i + j) % FACTORS.len()].to_string(),
                        importance: clamp_score(importance),
                    };
                    importance *= 0.6;
                    f
                })
                .collect();

            FailurePrediction {
                id: format!("pred-{:03}", i + 1),
                equipment_id: eq.id.clone(),
                predicted_at: now,
                failure_probability: probability,
                confidence: clamp_score(0.6 + rng.gen::<f64>() * 0.35),
                expected_failure_mode: MODES[rng.gen_range(0..MODES.len())],
                expected_failure_date: now + chrono::Duration::days(horizon_days),
                estimated_cost: (rng.gen_range(5..80) * 1000) as f64,
                contributing_factors: factors,
                status: PredictionStatus::Active,
                acknowledged: false,
            }
        })
        .collect()
}

fn seed_maintenance(rng: &mut StdRng, equipment: &[Equipment]) -> Vec<MaintenanceRecord> {
    const TECHNICIANS: &[&str] = &["M. Okafor", "J. Lindqvist", "R. Tanaka", "A. Costa"];
    const ISSUES: &[&str] = &[
        "Worn bearing race",
        "Seal weeping",
        "Loose mounting bolts",
        "Cable insulation wear",
    ];

    let mut records = Vec::new();
    let mut next_id = 1;

    for eq in equipment {
        // Every unit has one completed record from its last service.
        let duration_hours = rng.gen_range(2..10);
        let issues = if rng.gen_bool(0.5) {
            vec![ISSUES[rng.gen_range(0..ISSUES.len())].to_string()]
        } else {
            Vec::new()
        };
        records.push(MaintenanceRecord {
            id: format!("wo-{:03}", next_id),
            equipment_id: eq.id.clone(),
            start_time: eq.last_maintenance,
            end_time: Some(eq.last_maintenance + chrono::Duration::hours(duration_hours)),
            maintenance_type: MaintenanceType::Preventive,
            description: format!("Scheduled service for {}", eq.code),
            technician: TECHNICIANS[rng.gen_range(0..TECHNICIANS.len())].to_string(),
            cost: (rng.gen_range(1..15) * 500) as f64,
            status: WorkOrderStatus::Completed,
            issues_found: issues,
        });
        next_id += 1;

        // Upcoming work order aligned with the next scheduled maintenance.
        let maintenance_type = if eq.health_score < 0.6 {
            MaintenanceType::Predictive
        } else {
            MaintenanceType::Preventive
        };
        records.push(MaintenanceRecord {
            id: format!("wo-{:03}", next_id),
            equipment_id: eq.id.clone(),
            start_time: eq.next_maintenance,
            end_time: None,
            maintenance_type,
            description: format!("Upcoming service for {}", eq.code),
            technician: TECHNICIANS[rng.gen_range(0..TECHNICIANS.len())].to_string(),
            cost: (rng.gen_range(1..10) * 500) as f64,
            status: WorkOrderStatus::Scheduled,
            issues_found: Vec::new(),
        });
        next_id += 1;
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::classify;

    fn seeded(fleet_size: usize) -> SimulatedPlant {
        SimulatedPlant::new(SimSettings {
            fleet_size,
            seed: Some(42),
            ..SimSettings::default()
        })
    }

    #[test]
    fn test_fleet_seeded_with_valid_scores() {
        let sim = seeded(12);
        assert_eq!(sim.equipment().len(), 12);
        for eq in sim.equipment() {
            assert!((0.0..=1.0).contains(&eq.health_score));
            assert!((0.0..=1.0).contains(&eq.criticality));
        }
    }

    #[test]
    fn test_seeded_runs_are_deterministic() {
        let a = seeded(6);
        let b = seeded(6);
        for (x, y) in a.equipment().iter().zip(b.equipment().iter()) {
            assert_eq!(x.name, y.name);
            assert_eq!(x.health_score, y.health_score);
        }
    }

    #[test]
    fn test_window_never_exceeds_bound() {
        let mut sim = SimulatedPlant::new(SimSettings {
            fleet_size: 3,
            window: 50,
            seed: Some(1),
            ..SimSettings::default()
        });

        let now = Utc::now();
        for _ in 0..200 {
            sim.tick_sensors(now);
        }
        for eq_id in ["eq-001", "eq-002", "eq-003"] {
            assert_eq!(sim.window_len(eq_id), 50);
        }
    }

    #[test]
    fn test_health_stays_in_range_over_many_nudges() {
        let mut sim = seeded(8);
        for _ in 0..10_000 {
            sim.tick_health();
        }
        for eq in sim.equipment() {
            assert!((0.0..=1.0).contains(&eq.health_score));
            // classify must stay total over whatever the walk produced
            let _ = classify(eq.health_score);
        }
    }

    #[test]
    fn test_alert_feed_is_bounded_newest_first() {
        let mut sim = seeded(4);
        let now = Utc::now();
        for _ in 0..25 {
            sim.tick_alerts(now);
        }
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.alerts.len(), MAX_ALERTS);
    }

    #[test]
    fn test_alerts_reference_seeded_equipment() {
        let mut sim = seeded(4);
        sim.tick_alerts(Utc::now());
        let snapshot = sim.snapshot();
        let alert = &snapshot.alerts[0];
        assert!(snapshot.equipment_by_id(&alert.equipment_id).is_some());
    }

    #[test]
    fn test_first_poll_returns_initial_snapshot() {
        let mut sim = seeded(5);
        let snapshot = sim.poll().expect("initial snapshot");
        assert_eq!(snapshot.equipment.len(), 5);
        // Backfilled windows are present before any live tick.
        assert_eq!(snapshot.readings_for("eq-001").len(), BACKFILL_READINGS);

        // No cadence has elapsed, so the next poll is quiet.
        assert!(sim.poll().is_none());
    }

    #[test]
    fn test_pause_suspends_sensor_generation() {
        let mut sim = SimulatedPlant::new(SimSettings {
            fleet_size: 2,
            sensor_interval_ms: 0,
            alert_interval_ms: 0,
            // Keep the other cadences out of the way.
            health_interval_ms: 3_600_000,
            connection_interval_ms: 3_600_000,
            seed: Some(9),
            ..SimSettings::default()
        });

        let _ = sim.poll();
        let before = sim.window_len("eq-001");

        sim.set_streaming(false);
        assert!(!sim.is_streaming());
        assert!(sim.poll().is_none());
        assert_eq!(sim.window_len("eq-001"), before);

        sim.set_streaming(true);
        assert!(sim.poll().is_some());
        assert!(sim.window_len("eq-001") > before);
    }

    #[test]
    fn test_predictions_target_unhealthy_equipment() {
        let sim = seeded(20);
        let snapshot = sim.snapshot();
        for pred in &snapshot.predictions {
            let eq = snapshot.equipment_by_id(&pred.equipment_id).expect("known id");
            assert!(eq.health_score < 0.75);
            assert!((0.0..=1.0).contains(&pred.failure_probability));
            assert!((0.0..=1.0).contains(&pred.confidence));
        }
    }

    #[test]
    fn test_maintenance_seeded_per_equipment() {
        let sim = seeded(6);
        let snapshot = sim.snapshot();
        // One completed and one scheduled record per unit.
        assert_eq!(snapshot.maintenance.len(), 12);
        let scheduled =
            snapshot.maintenance.iter().filter(|m| m.status == WorkOrderStatus::Scheduled).count();
        assert_eq!(scheduled, 6);
    }

    #[test]
    fn test_settings_defaults() {
        let settings = SimSettings::default();
        assert_eq!(settings.sensor_interval(), Duration::from_millis(2000));
        assert_eq!(settings.health_interval(), Duration::from_millis(3000));
        assert_eq!(settings.window, 50);
    }
}
