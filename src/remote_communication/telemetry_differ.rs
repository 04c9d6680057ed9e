use super::boat_messages::{MotorEntry, MotorFrame, SensorEntry, SensorFrame};
use crate::boat_control::BoatRegistry;
use serde_json::Value;
use std::collections::HashMap;

/// Builds minimal outbound state frames: an entity is included when its
/// observable state differs from the snapshot taken at its last send, or
/// when a full frame is due. Empty frames are never produced.
pub struct TelemetryDiffer {
    motor_snapshots: HashMap<String, Value>,
    sensor_snapshots: HashMap<String, Value>,
    full_countdown: u32,
}

impl Default for TelemetryDiffer {
    fn default() -> Self { Self::new() }
}

impl TelemetryDiffer {
    /// Ticks until the first unconditional full frame; short, so a fresh
    /// observer is not left staring at blank state after startup.
    const FIRST_FULL_DELAY_TICKS: u32 = 4;
    /// Ticks between the periodic full resyncs afterwards.
    const FULL_RESYNC_TICKS: u32 = 50;

    pub fn new() -> Self {
        Self {
            motor_snapshots: HashMap::new(),
            sensor_snapshots: HashMap::new(),
            full_countdown: Self::FIRST_FULL_DELAY_TICKS,
        }
    }

    /// Advances the resync countdown; true on the ticks whose frame must
    /// be a full one.
    pub fn tick_full(&mut self) -> bool {
        let full = self.full_countdown == 0;
        if full {
            self.full_countdown = Self::FULL_RESYNC_TICKS;
        }
        self.full_countdown -= 1;
        full
    }

    /// Walks both registries and builds the outbound batch. Snapshots are
    /// updated for every entity examined, whether or not it qualified.
    pub async fn collect(
        &mut self,
        registry: &BoatRegistry,
        full: bool,
    ) -> (Option<MotorFrame>, Option<SensorFrame>) {
        let mut motor_entries = Vec::new();
        for name in registry.motor_names() {
            let Some(lock) = registry.motor(name) else { continue };
            let state = lock.read().await.state();
            let snapshot = Value::from(state);
            let changed = self.motor_snapshots.get(name) != Some(&snapshot);
            if full || changed {
                motor_entries.push(MotorEntry { name: String::from(name), state });
            }
            self.motor_snapshots.insert(String::from(name), snapshot);
        }

        let mut sensor_entries = Vec::new();
        for name in registry.sensor_names() {
            let Some(lock) = registry.sensor(name) else { continue };
            let meta = lock.read().await.meta();
            let changed = self.sensor_snapshots.get(name) != Some(&meta);
            if full || changed {
                sensor_entries.push(SensorEntry { name: String::from(name), state: meta.clone() });
            }
            self.sensor_snapshots.insert(String::from(name), meta);
        }

        let motor_frame = if motor_entries.is_empty() {
            None
        } else {
            Some(MotorFrame { full, motors: motor_entries })
        };
        let sensor_frame = if sensor_entries.is_empty() {
            None
        } else {
            Some(SensorFrame { full, sensors: sensor_entries })
        };
        (motor_frame, sensor_frame)
    }
}
