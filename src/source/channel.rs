//! Channel-based telemetry source.
//!
//! Receives plant snapshots via a tokio watch channel. This is the seam
//! for a real telemetry pipeline: a producer pushes fully built snapshots
//! and the dashboard consumes them without knowing where they came from.

use tokio::sync::watch;

use super::{PlantSnapshot, TelemetrySource};

/// A telemetry source fed by a watch channel.
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<PlantSnapshot>,
    description: String,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// `source_description` names where snapshots come from (e.g.
    /// "mqtt://broker:1883") for display in the status bar.
    pub fn new(receiver: watch::Receiver<PlantSnapshot>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
            initial_returned: false,
        }
    }

    /// Create a channel pair for pushing snapshots into the dashboard.
    pub fn create(source_description: &str) -> (watch::Sender<PlantSnapshot>, Self) {
        let (tx, rx) = watch::channel(PlantSnapshot::default());
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl TelemetrySource for ChannelSource {
    fn poll(&mut self) -> Option<PlantSnapshot> {
        // Return the initial value on first poll
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if self.receiver.has_changed().unwrap_or(false) {
            let snapshot = self.receiver.borrow_and_update().clone();
            Some(snapshot)
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        // Connection errors are the producer's concern; the channel
        // itself has none to report.
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::sim::{SimSettings, SimulatedPlant};

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");

        // Initially returns the default (empty) snapshot
        let snapshot = source.poll().expect("initial snapshot");
        assert!(snapshot.equipment.is_empty());

        // No change, so poll returns None
        assert!(source.poll().is_none());

        // Push a real snapshot
        let sim = SimulatedPlant::new(SimSettings {
            fleet_size: 3,
            seed: Some(11),
            ..SimSettings::default()
        });
        tx.send(sim.snapshot()).unwrap();

        let snapshot = source.poll().expect("updated snapshot");
        assert_eq!(snapshot.equipment.len(), 3);
    }

    #[test]
    fn test_channel_source_description() {
        let (_tx, source) = ChannelSource::create("mqtt://broker:1883");
        assert_eq!(source.description(), "channel: mqtt://broker:1883");
    }
}
