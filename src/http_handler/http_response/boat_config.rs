use super::response_common::SerdeJSONBodyHTTPResponseType;

/// The boat definition served by the rudder backend: identity plus the
/// declared actuator and sensor hardware. Hardware cannot initialize
/// without it.
#[derive(serde::Deserialize, Debug)]
pub struct BoatConfigResponse {
    #[serde(rename = "BoatEmblem")]
    boat_emblem: String,
    #[serde(rename = "Series")]
    series: String,
    #[serde(rename = "Make")]
    make: String,
    #[serde(rename = "Motors")]
    motors: Vec<MotorConfig>,
    #[serde(rename = "Sensors")]
    sensors: Vec<SensorConfig>,
}

impl SerdeJSONBodyHTTPResponseType for BoatConfigResponse {}

impl BoatConfigResponse {
    pub fn boat_emblem(&self) -> &str { &self.boat_emblem }
    pub fn series(&self) -> &str { &self.series }
    pub fn make(&self) -> &str { &self.make }
    pub fn motors(&self) -> &[MotorConfig] { &self.motors }
    pub fn sensors(&self) -> &[SensorConfig] { &self.sensors }
}

/// One declared actuator: PWM slot plus its value range.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct MotorConfig {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    motor_type: String,
    #[serde(rename = "Channel")]
    channel: u8,
    #[serde(rename = "Min")]
    min: f64,
    #[serde(rename = "Max")]
    max: f64,
    #[serde(rename = "Default")]
    default: f64,
}

impl MotorConfig {
    pub fn name(&self) -> &str { &self.name }
    pub fn motor_type(&self) -> &str { &self.motor_type }
    pub fn channel(&self) -> u8 { self.channel }
    pub fn min(&self) -> f64 { self.min }
    pub fn max(&self) -> f64 { self.max }
    pub fn default(&self) -> f64 { self.default }
}

/// One declared sensor. The channel is free-form (a serial port for the
/// position sensor, unused for purely digital ones).
#[derive(serde::Deserialize, Debug, Clone)]
pub struct SensorConfig {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    sensor_type: String,
    #[serde(rename = "Channel", default)]
    channel: Option<String>,
}

impl SensorConfig {
    pub fn name(&self) -> &str { &self.name }
    pub fn sensor_type(&self) -> &str { &self.sensor_type }
    pub fn channel(&self) -> Option<&str> { self.channel.as_deref() }
}
