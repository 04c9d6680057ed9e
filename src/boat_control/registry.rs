use super::actuator::{Actuator, ActuatorKind};
use super::bus::ActuatorBus;
use super::common::vec2d::Vec2D;
use super::sensor::{
    BandwidthSensor, BnoSensor, GpsSensor, IpSensor, Sensor, SensorKind, ShoreSensor, WindSensor,
    WindVector,
};
use crate::http_handler::http_response::boat_config::BoatConfigResponse;
use crate::warn;
use itertools::Itertools;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::Display;
use tokio::sync::RwLock;

#[derive(Debug, Display)]
pub enum ConfigError {
    UnknownActuatorKind(String),
    DuplicateName(String),
}

impl std::error::Error for ConfigError {}

/// The boat's hardware registries, built once from the backend boat
/// definition. Membership never changes afterwards; individual entries sit
/// behind their own lock, so every task can read concurrently while
/// command handling mutates exactly one entry at a time.
pub struct BoatRegistry {
    motors: HashMap<String, RwLock<Actuator>>,
    motor_types: HashMap<ActuatorKind, String>,
    sensors: HashMap<String, RwLock<Sensor>>,
    sensor_types: HashMap<SensorKind, String>,
}

impl BoatRegistry {
    /// Builds the registries from the declared hardware. Unknown actuator
    /// kinds are a configuration error; unknown sensor kinds are skipped,
    /// every lookup against them then reports "not installed".
    pub fn from_config(
        config: &BoatConfigResponse,
        bus: &Arc<dyn ActuatorBus>,
        simulated: bool,
    ) -> Result<Self, ConfigError> {
        let mut motors = HashMap::new();
        let mut motor_types = HashMap::new();
        let mut sensors = HashMap::new();
        let mut sensor_types = HashMap::new();

        for motor in config.motors() {
            let kind = ActuatorKind::from_str(motor.motor_type())
                .map_err(|_| ConfigError::UnknownActuatorKind(String::from(motor.motor_type())))?;
            let actuator = Actuator::new(
                motor.name(),
                motor.channel(),
                motor.min(),
                motor.max(),
                motor.default(),
                kind,
                Arc::clone(bus),
            );
            if motors.insert(String::from(motor.name()), RwLock::new(actuator)).is_some() {
                return Err(ConfigError::DuplicateName(String::from(motor.name())));
            }
            motor_types.insert(kind, String::from(motor.name()));
        }

        for sensor in config.sensors() {
            let Ok(kind) = SensorKind::from_str(sensor.sensor_type()) else {
                warn!("Skipping sensor {} of unknown type {}", sensor.name(), sensor.sensor_type());
                continue;
            };
            let built = match kind {
                SensorKind::Gps => {
                    Sensor::Gps(GpsSensor::new(sensor.name(), sensor.channel(), simulated))
                }
                SensorKind::Bno => Sensor::Bno(BnoSensor::new(sensor.name(), simulated)),
                SensorKind::Wind => Sensor::Wind(WindSensor::new(sensor.name())),
                SensorKind::Shore => Sensor::Shore(ShoreSensor::new(sensor.name())),
                SensorKind::Bandwidth => Sensor::Bandwidth(BandwidthSensor::new(sensor.name())),
                SensorKind::Ip => Sensor::Ip(IpSensor::new(sensor.name())),
            };
            if sensors.insert(String::from(sensor.name()), RwLock::new(built)).is_some() {
                return Err(ConfigError::DuplicateName(String::from(sensor.name())));
            }
            sensor_types.insert(kind, String::from(sensor.name()));
        }

        Ok(Self { motors, motor_types, sensors, sensor_types })
    }

    pub fn motor(&self, name: &str) -> Option<&RwLock<Actuator>> { self.motors.get(name) }

    pub fn motor_by_kind(&self, kind: ActuatorKind) -> Option<&RwLock<Actuator>> {
        self.motors.get(self.motor_types.get(&kind)?)
    }

    pub fn sensor(&self, name: &str) -> Option<&RwLock<Sensor>> { self.sensors.get(name) }

    pub fn sensor_by_kind(&self, kind: SensorKind) -> Option<&RwLock<Sensor>> {
        self.sensors.get(self.sensor_types.get(&kind)?)
    }

    pub fn motor_count(&self) -> usize { self.motors.len() }

    pub fn sensor_count(&self) -> usize { self.sensors.len() }

    /// Names in a stable order, for deterministic telemetry and logs.
    pub fn motor_names(&self) -> Vec<&str> {
        self.motors.keys().map(String::as_str).sorted().collect()
    }

    /// Names in a stable order, for deterministic telemetry and logs.
    pub fn sensor_names(&self) -> Vec<&str> {
        self.sensors.keys().map(String::as_str).sorted().collect()
    }

    /// Drives every motor to the same value (operator-visible self-test).
    pub async fn set_all_motors(&self, value: f64) {
        for motor in self.motors.values() {
            motor.write().await.set_state(value);
        }
    }

    /// Drives every motor to its neutral position. The failsafe invariant
    /// hangs off this: it completes before the caller yields, so the next
    /// telemetry tick already sees neutral values.
    pub async fn neutralize_all(&self) {
        for motor in self.motors.values() {
            motor.write().await.reset();
        }
    }

    /// Current position fix, or `None` when no position sensor is
    /// installed or it has no fix yet.
    pub async fn position(&self) -> Option<Vec2D<f64>> {
        self.sensor_by_kind(SensorKind::Gps)?.read().await.position()
    }

    /// Current heading, or `None` without an orientation sensor reading.
    pub async fn heading(&self) -> Option<f64> {
        self.sensor_by_kind(SensorKind::Bno)?.read().await.heading()
    }

    /// Last observed ambient wind, or `None` without a wind sensor.
    pub async fn wind(&self) -> Option<WindVector> {
        self.sensor_by_kind(SensorKind::Wind)?.read().await.wind()
    }

    /// Nearest-land distance, or `None` without shore data.
    pub async fn shore_distance(&self) -> Option<f64> {
        self.sensor_by_kind(SensorKind::Shore)?.read().await.shore_distance()
    }
}
