use super::actuator::ActuatorKind;
use super::common::math::{bearing_between, get_distance, signed_angle, wrap_heading};
use super::registry::BoatRegistry;
use super::way_point::{NavigationPlan, WayPoint};
use crate::{event, info};
use serde_json::Value;
use std::sync::Arc;
use strum_macros::Display;

/// Autopilot lifecycle. `Stopped` keeps the plan so a later `start` picks
/// it back up; only `reset` discards it.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy)]
pub enum AutopilotState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Display)]
pub enum WayPointError {
    NotASequence,
    MalformedWayPoint,
}

impl std::error::Error for WayPointError {}

/// Closed-loop navigation toward the active waypoint: bearing error to
/// rudder, apparent wind to sail trim (with the no-go zone held off by
/// tacking-aware target selection), engine assist near land or in a calm.
pub struct AutoPilot {
    state: AutopilotState,
    plan: NavigationPlan,
    registry: Arc<BoatRegistry>,
}

impl AutoPilot {
    /// Arrival radius around the active waypoint.
    const ARRIVAL_TOLERANCE: f64 = 8.0;
    /// Bearing error that commands full rudder lock.
    const RUDDER_FULL_LOCK_ERROR: f64 = 45.0;
    /// Below this shore distance the engine is engaged.
    const SHORE_SAFETY_MARGIN: f64 = 40.0;
    /// Below this wind speed the boat counts as becalmed.
    const BECALMED_SPEED: f64 = 1.5;
    /// Engine state commanded while assisting.
    const ENGINE_ASSIST_STATE: f64 = 0.6;

    pub fn new(registry: Arc<BoatRegistry>) -> Self {
        Self { state: AutopilotState::Idle, plan: NavigationPlan::default(), registry }
    }

    pub fn state(&self) -> AutopilotState { self.state }

    pub fn is_running(&self) -> bool { self.state == AutopilotState::Running }

    pub fn plan(&self) -> &NavigationPlan { &self.plan }

    /// Starts executing the current plan. Starting with an empty plan is
    /// accepted; cycles are no-ops until waypoints arrive.
    pub fn start(&mut self) {
        if self.state != AutopilotState::Running {
            info!("Autopilot starting with {} waypoint(s)", self.plan.len());
            self.state = AutopilotState::Running;
        }
    }

    /// Stops executing but keeps the plan. Actuators stay where they are;
    /// neutralizing them is the caller's (or the failsafe's) business.
    pub fn stop(&mut self) {
        if self.state == AutopilotState::Running {
            info!("Autopilot stopped, plan retained at waypoint {}", self.plan.index());
            self.state = AutopilotState::Stopped;
        }
    }

    /// Back to idle with an empty plan, from any state.
    pub fn reset(&mut self) {
        self.state = AutopilotState::Idle;
        self.plan.clear();
        info!("Autopilot reset");
    }

    /// Replaces the plan wholesale from an operator payload. Never starts
    /// execution by itself; a payload that is not a sequence of
    /// `{lat, lng}` is rejected with the plan and state untouched.
    pub fn set_way_points(&mut self, payload: &Value) -> Result<usize, WayPointError> {
        if !payload.is_array() {
            return Err(WayPointError::NotASequence);
        }
        let way_points =
            WayPoint::vec_from_payload(payload).ok_or(WayPointError::MalformedWayPoint)?;
        let count = way_points.len();
        self.plan.replace(way_points);
        info!("Navigation plan replaced: {count} waypoint(s)");
        Ok(count)
    }

    /// One closed-loop step, invoked periodically while `Running`. Missing
    /// sensors or fixes end the cycle early; the loop just tries again.
    pub async fn cycle(&mut self) {
        let Some(pos) = self.registry.position().await else { return };
        let Some(heading) = self.registry.heading().await else { return };
        let Some(wind) = self.registry.wind().await else { return };
        let shore_distance = self.registry.shore_distance().await;

        let Some(way_point) = self.plan.current().copied() else { return };

        let remaining = get_distance(&pos, &way_point.pos());
        if remaining < Self::ARRIVAL_TOLERANCE {
            let exhausted = self.plan.advance();
            event!("Waypoint reached, {remaining:.1}m off, advancing to {}", self.plan.index());
            if exhausted {
                info!("Final waypoint reached, autopilot going idle");
                self.state = AutopilotState::Idle;
                self.neutralize_propulsion().await;
            }
            return;
        }

        let bearing = bearing_between(&pos, &way_point.pos());
        let target = feasible_target(bearing, wind.bearing);
        let rudder = rudder_command(heading, target);
        let apparent = signed_angle(wind.bearing - heading);
        let sail = sail_trim(apparent);
        let assist = needs_engine_assist(shore_distance, wind.speed);

        if let Some(motor) = self.registry.motor_by_kind(ActuatorKind::Rudder) {
            motor.write().await.set_state(rudder);
        }
        if let Some(motor) = self.registry.motor_by_kind(ActuatorKind::Sail) {
            motor.write().await.set_state(sail);
        }
        if let Some(motor) = self.registry.motor_by_kind(ActuatorKind::Engine) {
            let mut engine = motor.write().await;
            if assist {
                engine.set_state(Self::ENGINE_ASSIST_STATE);
            } else {
                engine.reset();
            }
        }
    }

    /// Sail and engine back to neutral; the rudder keeps its last heading.
    async fn neutralize_propulsion(&self) {
        if let Some(motor) = self.registry.motor_by_kind(ActuatorKind::Sail) {
            motor.write().await.reset();
        }
        if let Some(motor) = self.registry.motor_by_kind(ActuatorKind::Engine) {
            motor.write().await.reset();
        }
    }
}

/// Half-angle of the no-go zone around the wind bearing.
const NO_GO_ANGLE: f64 = 35.0;

/// The heading actually steered for. Directly toward the waypoint unless
/// that bearing sits inside the no-go zone; then the closest feasible
/// heading on the same tack is held instead.
pub(crate) fn feasible_target(bearing: f64, wind_bearing: f64) -> f64 {
    let off_wind = signed_angle(bearing - wind_bearing);
    if off_wind.abs() >= NO_GO_ANGLE {
        return bearing;
    }
    let side = if off_wind >= 0.0 { 1.0 } else { -1.0 };
    wrap_heading(wind_bearing + side * NO_GO_ANGLE)
}

/// Proportional rudder command in `[-1, 1]` reducing the bearing error.
pub(crate) fn rudder_command(heading: f64, target: f64) -> f64 {
    (signed_angle(target - heading) / AutoPilot::RUDDER_FULL_LOCK_ERROR).clamp(-1.0, 1.0)
}

/// Sail trim from the apparent wind angle: sheeted in close to the wind,
/// fully eased running downwind.
pub(crate) fn sail_trim(apparent_wind: f64) -> f64 {
    (apparent_wind.abs() / 180.0) * 2.0 - 1.0
}

/// Engine assist when land is close or the wind cannot move the boat.
pub(crate) fn needs_engine_assist(shore_distance: Option<f64>, wind_speed: f64) -> bool {
    shore_distance.is_some_and(|d| d < AutoPilot::SHORE_SAFETY_MARGIN)
        || wind_speed < AutoPilot::BECALMED_SPEED
}
