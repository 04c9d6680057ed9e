use super::bus::ActuatorBus;
use std::sync::Arc;
use strum_macros::{Display, EnumString};

/// The closed set of actuator roles on board. The backend declares each
/// motor with one of these as its type tag; anything else is a
/// configuration error.
#[derive(Debug, Display, EnumString, PartialEq, Eq, Clone, Copy, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum ActuatorKind {
    Rudder,
    Sail,
    Engine,
}

/// A single controllable output. Holds the declared range and drives the
/// bus on every state change; the commanded value is always clamped into
/// `[min, max]`, and `default` is the neutral position the failsafe falls
/// back to.
pub struct Actuator {
    name: String,
    channel: u8,
    min: f64,
    max: f64,
    default: f64,
    kind: ActuatorKind,
    state: f64,
    prev_sent: Option<f64>,
    bus: Arc<dyn ActuatorBus>,
}

impl Actuator {
    pub fn new(
        name: &str,
        channel: u8,
        min: f64,
        max: f64,
        default: f64,
        kind: ActuatorKind,
        bus: Arc<dyn ActuatorBus>,
    ) -> Self {
        let mut actuator = Self {
            name: String::from(name),
            channel,
            min,
            max,
            default,
            kind,
            state: default,
            prev_sent: None,
            bus,
        };
        actuator.reset();
        actuator
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn kind(&self) -> ActuatorKind { self.kind }

    pub fn channel(&self) -> u8 { self.channel }

    pub fn state(&self) -> f64 { self.state }

    pub fn default(&self) -> f64 { self.default }

    /// Commands the actuator, clamping into the declared range.
    pub fn set_state(&mut self, value: f64) {
        self.state = value.clamp(self.min, self.max);
        self.bus.drive(self.channel, self.state);
    }

    /// Drives the actuator to its neutral position.
    pub fn reset(&mut self) { self.set_state(self.default); }

    pub fn is_neutral(&self) -> bool { (self.state - self.default).abs() < f64::EPSILON }

    /// True exactly once per newly observed state: the first call after a
    /// change reports it, immediate repeats do not.
    pub fn has_changed(&mut self) -> bool {
        let changed = self.prev_sent != Some(self.state);
        self.prev_sent = Some(self.state);
        changed
    }
}
