use serde::{Deserialize, Serialize};
use serde_json::Value;

/// First frame on a fresh connection: the boat introduces itself with its
/// bearer token and emblem. The operator service closes the link if either
/// is off.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthHello {
    pub token: String,
    pub boat_emblem: String,
}

/// One inbound operator command, discriminated by its `type` field.
/// Waypoint payloads stay untyped here; validating the sequence shape is
/// the autopilot's call to make.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoatCommand {
    Motor { name: String, value: f64 },
    FullMeta,
    AutopilotStart,
    AutopilotStop,
    AutopilotReset,
    AutopilotWaypoints { waypoints: Value },
    Agps { name: String, lat: f64, lon: f64 },
    Reload,
    Shutdown,
}

/// Actuator state as the operator dashboard expects it.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MotorEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "State")]
    pub state: f64,
}

/// Sensor state as the operator dashboard expects it.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SensorEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "State")]
    pub state: Value,
}

/// Outbound actuator telemetry. Never built with an empty entry list.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MotorFrame {
    pub full: bool,
    pub motors: Vec<MotorEntry>,
}

/// Outbound sensor telemetry. Never built with an empty entry list.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SensorFrame {
    pub full: bool,
    pub sensors: Vec<SensorEntry>,
}
