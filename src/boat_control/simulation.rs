use super::actuator::ActuatorKind;
use super::common::math::{offset_position, signed_angle, wrap_heading};
use super::common::vec2d::Vec2D;
use super::registry::BoatRegistry;
use super::sensor::{Sensor, SensorKind};
use std::sync::Arc;

/// Deterministic physics stand-in for hardware-free operation. Integrates
/// heading, speed and position from the live sail/rudder/engine commands
/// and the ambient wind, then feeds the position and orientation sensors.
///
/// `update(dt)` advances by exactly the supplied step, reads no wall clock
/// and draws no randomness: identical initial state and input sequence
/// give identical trajectories.
pub struct SimulationEngine {
    registry: Arc<BoatRegistry>,
    wind_bearing: f64,
    wind_speed: f64,
    heading: f64,
    speed: f64,
    position: Vec2D<f64>,
}

impl SimulationEngine {
    /// Sail area in m².
    const SAIL_AREA: f64 = 0.366;
    /// Air density in kg/m³.
    const AIR_DENSITY: f64 = 1.229;
    /// Hull mass in kg.
    const HULL_MASS: f64 = 32.0;
    /// Quadratic hull drag coefficient.
    const DRAG: f64 = 0.9;
    /// Engine thrust at full throttle, in Newton.
    const ENGINE_THRUST: f64 = 14.0;
    /// Turn rate at full rudder lock and full flow, in deg/s.
    const RUDDER_TURN_RATE: f64 = 28.0;
    /// Sail elongation from the centerline at fully eased trim, degrees.
    const SAIL_MAX_ELONGATION: f64 = 90.0;
    /// Where a fresh simulation run puts the boat.
    const START_POSITION: (f64, f64) = (51.0545, 13.7363);

    pub fn new(registry: Arc<BoatRegistry>) -> Self {
        Self {
            registry,
            wind_bearing: 0.0,
            wind_speed: 0.0,
            heading: 0.0,
            speed: 0.0,
            position: Vec2D::from(Self::START_POSITION),
        }
    }

    /// Resets all integrator state for a fresh run. Ambient wind is an
    /// input, not an integrator, and survives the reset.
    pub fn start(&mut self) {
        self.heading = 0.0;
        self.speed = 0.0;
        self.position = Vec2D::from(Self::START_POSITION);
    }

    /// Ambient wind feed, from the wind sensor's latest fetch.
    pub fn set_wind(&mut self, bearing: f64, speed: f64) {
        self.wind_bearing = bearing;
        self.wind_speed = speed;
    }

    pub fn heading(&self) -> f64 { self.heading }

    pub fn speed(&self) -> f64 { self.speed }

    pub fn position(&self) -> Vec2D<f64> { self.position }

    /// Advances the model by `dt` seconds and feeds the simulated fix and
    /// heading back into the sensors.
    pub async fn update(&mut self, dt: f64) {
        let sail_state = self.motor_state(ActuatorKind::Sail).await;
        let rudder_state = self.motor_state(ActuatorKind::Rudder).await;
        let engine_state = self.motor_state(ActuatorKind::Engine).await;

        // Density exponent carried over from the tuned model; classical
        // aerodynamics expects the first power. Re-validate against the
        // lake logs before touching it.
        let wind_force =
            Self::SAIL_AREA * Self::AIR_DENSITY.powi(3) * self.wind_speed.powi(2);

        // Apparent wind reduced to its signed equivalent so 350° vs 10°
        // comes out as -20°, not 340°.
        let gamma = signed_angle(self.wind_bearing - self.heading);
        let elongation = (sail_state + 1.0) / 2.0 * Self::SAIL_MAX_ELONGATION;
        let attack = gamma.abs() - elongation;

        // Force on the sail normal, projected onto the boat axis. A
        // luffing sail (attack <= 0) produces nothing.
        let sail_thrust = if attack > 0.0 {
            wind_force * attack.to_radians().sin() * elongation.to_radians().sin()
        } else {
            0.0
        };
        let engine_thrust = engine_state.max(0.0) * Self::ENGINE_THRUST;

        let drag = Self::DRAG * self.speed * self.speed;
        let accel = (sail_thrust + engine_thrust - drag) / Self::HULL_MASS;
        self.speed = (self.speed + accel * dt).max(0.0);

        // Rudder authority grows with flow over the blade.
        let flow = self.speed / (self.speed + 1.0);
        self.heading =
            wrap_heading(self.heading + rudder_state * Self::RUDDER_TURN_RATE * flow * dt);

        self.position = offset_position(&self.position, self.heading, self.speed * dt);

        self.feed_sensors().await;
    }

    async fn motor_state(&self, kind: ActuatorKind) -> f64 {
        match self.registry.motor_by_kind(kind) {
            Some(motor) => motor.read().await.state(),
            None => 0.0,
        }
    }

    async fn feed_sensors(&self) {
        if let Some(lock) = self.registry.sensor_by_kind(SensorKind::Gps) {
            if let Sensor::Gps(gps) = &mut *lock.write().await {
                gps.set_sim_fix(self.position, self.speed);
            }
        }
        if let Some(lock) = self.registry.sensor_by_kind(SensorKind::Bno) {
            if let Sensor::Bno(bno) = &mut *lock.write().await {
                bno.set_sim_heading(self.heading);
            }
        }
    }
}
