use super::actuator::{Actuator, ActuatorKind};
use super::autopilot::{AutoPilot, AutopilotState, feasible_target, needs_engine_assist, rudder_command, sail_trim};
use super::bus::{ActuatorBus, NullBus};
use super::registry::BoatRegistry;
use super::sensor::{Sensor, SensorKind};
use super::sensor_cache::wind_fetch_due;
use super::simulation::SimulationEngine;
use crate::http_handler::http_response::boat_config::BoatConfigResponse;
use crate::http_handler::http_response::shore::ShoreDataResponse;
use chrono::{TimeDelta, Utc};
use serde_json::json;
use std::sync::Arc;

use super::common::vec2d::Vec2D;

fn test_config() -> BoatConfigResponse {
    serde_json::from_value(json!({
        "BoatEmblem": "ORION",
        "Series": "Explorer",
        "Make": "CosmicSail",
        "Motors": [
            {"Name": "main_rudder", "Type": "rudder", "Channel": 1, "Min": -1.0, "Max": 1.0, "Default": 0.0},
            {"Name": "main_sail", "Type": "sail", "Channel": 2, "Min": -1.0, "Max": 1.0, "Default": 0.0},
            {"Name": "aux_engine", "Type": "engine", "Channel": 3, "Min": -1.0, "Max": 1.0, "Default": 0.0}
        ],
        "Sensors": [
            {"Name": "gps0", "Type": "gps", "Channel": "/dev/ttyACM0"},
            {"Name": "bno0", "Type": "bno"},
            {"Name": "wind0", "Type": "wind"},
            {"Name": "shore0", "Type": "shore"},
            {"Name": "bandwidth0", "Type": "bandwidth"}
        ]
    }))
    .unwrap()
}

fn test_registry() -> Arc<BoatRegistry> {
    let bus: Arc<dyn ActuatorBus> = Arc::new(NullBus);
    Arc::new(BoatRegistry::from_config(&test_config(), &bus, true).unwrap())
}

async fn seed_fix(registry: &BoatRegistry, lat: f64, lng: f64, heading: f64) {
    if let Some(lock) = registry.sensor_by_kind(SensorKind::Gps) {
        if let Sensor::Gps(gps) = &mut *lock.write().await {
            gps.init_agps(lat, lng);
        }
    }
    if let Some(lock) = registry.sensor_by_kind(SensorKind::Bno) {
        if let Sensor::Bno(bno) = &mut *lock.write().await {
            bno.set_sim_heading(heading);
        }
    }
}

async fn motor_state(registry: &BoatRegistry, kind: ActuatorKind) -> f64 {
    registry.motor_by_kind(kind).unwrap().read().await.state()
}

#[test]
fn test_actuator_clamp_and_change_reporting() {
    let bus: Arc<dyn ActuatorBus> = Arc::new(NullBus);
    let mut rudder = Actuator::new("main_rudder", 1, -1.0, 1.0, 0.0, ActuatorKind::Rudder, bus);

    rudder.set_state(1.0);
    assert!(rudder.has_changed());
    assert!(!rudder.has_changed());
    rudder.set_state(1.0);
    assert!(!rudder.has_changed());

    rudder.set_state(-1.0);
    assert!(rudder.has_changed());
    assert!(!rudder.has_changed());

    rudder.set_state(0.0);
    assert!(rudder.has_changed());
    assert!(!rudder.has_changed());

    rudder.set_state(7.5);
    assert_eq!(rudder.state(), 1.0);
    rudder.set_state(-7.5);
    assert_eq!(rudder.state(), -1.0);
    rudder.reset();
    assert!(rudder.is_neutral());
}

#[test]
fn test_registry_from_config() {
    let registry = test_registry();
    assert_eq!(registry.motor_count(), 3);
    assert_eq!(registry.sensor_count(), 5);
    assert!(registry.motor("main_rudder").is_some());
    assert!(registry.motor("bow_thruster").is_none());
    assert!(registry.motor_by_kind(ActuatorKind::Sail).is_some());
    assert!(registry.sensor_by_kind(SensorKind::Shore).is_some());
    // no ip sensor declared: lookups report not installed
    assert!(registry.sensor_by_kind(SensorKind::Ip).is_none());
    assert_eq!(registry.motor_names(), vec!["aux_engine", "main_rudder", "main_sail"]);
}

#[test]
fn test_registry_rejects_unknown_actuator_kind() {
    let config: BoatConfigResponse = serde_json::from_value(json!({
        "BoatEmblem": "ORION", "Series": "Explorer", "Make": "CosmicSail",
        "Motors": [
            {"Name": "laser", "Type": "laser_cannon", "Channel": 1, "Min": -1.0, "Max": 1.0, "Default": 0.0}
        ],
        "Sensors": []
    }))
    .unwrap();
    let bus: Arc<dyn ActuatorBus> = Arc::new(NullBus);
    assert!(BoatRegistry::from_config(&config, &bus, false).is_err());
}

#[test]
fn test_registry_skips_unknown_sensor_kind() {
    let config: BoatConfigResponse = serde_json::from_value(json!({
        "BoatEmblem": "ORION", "Series": "Explorer", "Make": "CosmicSail",
        "Motors": [],
        "Sensors": [{"Name": "geiger0", "Type": "geiger"}]
    }))
    .unwrap();
    let bus: Arc<dyn ActuatorBus> = Arc::new(NullBus);
    let registry = BoatRegistry::from_config(&config, &bus, false).unwrap();
    assert_eq!(registry.sensor_count(), 0);
}

#[tokio::test]
async fn test_neutralize_all_after_commands() {
    let registry = test_registry();
    registry.set_all_motors(1.0).await;
    assert_eq!(motor_state(&registry, ActuatorKind::Rudder).await, 1.0);
    registry.neutralize_all().await;
    for kind in [ActuatorKind::Rudder, ActuatorKind::Sail, ActuatorKind::Engine] {
        assert_eq!(motor_state(&registry, kind).await, 0.0);
    }
}

#[test]
fn test_autopilot_transitions() {
    let mut autopilot = AutoPilot::new(test_registry());
    assert_eq!(autopilot.state(), AutopilotState::Idle);

    // starting with an empty plan is accepted
    autopilot.start();
    assert_eq!(autopilot.state(), AutopilotState::Running);
    assert!(autopilot.plan().is_empty());

    autopilot.stop();
    assert_eq!(autopilot.state(), AutopilotState::Stopped);

    let payload = json!([{"lat": 51.0, "lng": 13.0}, {"lat": 51.01, "lng": 13.01}]);
    assert_eq!(autopilot.set_way_points(&payload).unwrap(), 2);
    // replacing the plan never starts execution by itself
    assert_eq!(autopilot.state(), AutopilotState::Stopped);
    assert_eq!(autopilot.plan().index(), 0);

    autopilot.start();
    assert_eq!(autopilot.state(), AutopilotState::Running);

    autopilot.stop();
    assert_eq!(autopilot.state(), AutopilotState::Stopped);
    assert_eq!(autopilot.plan().len(), 2);

    autopilot.reset();
    assert_eq!(autopilot.state(), AutopilotState::Idle);
    assert!(autopilot.plan().is_empty());
}

#[test]
fn test_set_way_points_rejects_bad_payloads() {
    let mut autopilot = AutoPilot::new(test_registry());
    let payload = json!([{"lat": 51.0, "lng": 13.0}]);
    autopilot.set_way_points(&payload).unwrap();
    autopilot.start();

    for bad in [
        json!(42),
        json!("north, then west"),
        json!({"lat": 51.0, "lng": 13.0}),
        json!([{"lat": 51.0}]),
        json!([{"lat": 51.0, "lng": "thirteen"}]),
    ] {
        assert!(autopilot.set_way_points(&bad).is_err());
        // plan and running state untouched by the rejection
        assert_eq!(autopilot.plan().len(), 1);
        assert_eq!(autopilot.state(), AutopilotState::Running);
    }
}

#[tokio::test]
async fn test_cycle_advances_on_arrival() {
    let registry = test_registry();
    let mut autopilot = AutoPilot::new(Arc::clone(&registry));
    let payload = json!([{"lat": 51.0, "lng": 13.0}, {"lat": 51.01, "lng": 13.01}]);
    autopilot.set_way_points(&payload).unwrap();
    autopilot.start();

    // sitting right on the first waypoint
    seed_fix(&registry, 51.0, 13.0, 90.0).await;
    autopilot.cycle().await;

    assert_eq!(autopilot.plan().index(), 1);
    assert_eq!(autopilot.state(), AutopilotState::Running);
}

#[tokio::test]
async fn test_cycle_goes_idle_after_last_waypoint() {
    let registry = test_registry();
    let mut autopilot = AutoPilot::new(Arc::clone(&registry));
    autopilot.set_way_points(&json!([{"lat": 51.0, "lng": 13.0}])).unwrap();
    autopilot.start();

    // a previous leg left propulsion engaged and the rudder off-center
    registry.motor_by_kind(ActuatorKind::Rudder).unwrap().write().await.set_state(0.4);
    registry.motor_by_kind(ActuatorKind::Sail).unwrap().write().await.set_state(0.8);
    registry.motor_by_kind(ActuatorKind::Engine).unwrap().write().await.set_state(0.6);

    seed_fix(&registry, 51.0, 13.0, 0.0).await;
    autopilot.cycle().await;

    assert_eq!(autopilot.state(), AutopilotState::Idle);
    // propulsion neutralized, rudder keeps its last heading
    assert_eq!(motor_state(&registry, ActuatorKind::Sail).await, 0.0);
    assert_eq!(motor_state(&registry, ActuatorKind::Engine).await, 0.0);
    assert_eq!(motor_state(&registry, ActuatorKind::Rudder).await, 0.4);
}

#[tokio::test]
async fn test_cycle_without_fix_is_a_no_op() {
    let registry = test_registry();
    let mut autopilot = AutoPilot::new(Arc::clone(&registry));
    autopilot.set_way_points(&json!([{"lat": 51.0, "lng": 13.0}])).unwrap();
    autopilot.start();

    // no fix seeded: nothing to steer by, nothing must move
    autopilot.cycle().await;
    assert_eq!(autopilot.state(), AutopilotState::Running);
    for kind in [ActuatorKind::Rudder, ActuatorKind::Sail, ActuatorKind::Engine] {
        assert_eq!(motor_state(&registry, kind).await, 0.0);
    }
}

#[tokio::test]
async fn test_cycle_steers_toward_waypoint() {
    let registry = test_registry();
    let mut autopilot = AutoPilot::new(Arc::clone(&registry));
    // waypoint due east, wind from the north, heading north
    autopilot.set_way_points(&json!([{"lat": 51.0, "lng": 13.1}])).unwrap();
    autopilot.start();
    seed_fix(&registry, 51.0, 13.0, 0.0).await;
    if let Some(lock) = registry.sensor_by_kind(SensorKind::Wind) {
        if let Sensor::Wind(wind) = &mut *lock.write().await {
            let reading = serde_json::from_value(json!({"deg": 0.0, "speed": 6.0})).unwrap();
            wind.apply_reading(&reading, None);
        }
    }

    autopilot.cycle().await;

    // bearing error +90° → full starboard lock
    assert_eq!(motor_state(&registry, ActuatorKind::Rudder).await, 1.0);
    // still head to wind: sail sheeted hard in
    assert_eq!(motor_state(&registry, ActuatorKind::Sail).await, -1.0);
    // plenty of wind, no shore data: no engine assist
    assert_eq!(motor_state(&registry, ActuatorKind::Engine).await, 0.0);
}

#[test]
fn test_feasible_target_no_go_zone() {
    // direct bearing well off the wind stays untouched
    assert_eq!(feasible_target(90.0, 0.0), 90.0);
    assert_eq!(feasible_target(180.0, 0.0), 180.0);
    // bearing inside the no-go zone is held at its edge, same tack
    assert_eq!(feasible_target(10.0, 0.0), 35.0);
    assert_eq!(feasible_target(350.0, 0.0), 325.0);
    // wraparound: wind from 350°, bearing 5° is 15° off the wind
    assert_eq!(feasible_target(5.0, 350.0), 25.0);
    // dead upwind defaults to the starboard edge
    assert_eq!(feasible_target(0.0, 0.0), 35.0);
}

#[test]
fn test_rudder_command_proportional_and_clamped() {
    assert_eq!(rudder_command(0.0, 0.0), 0.0);
    assert!((rudder_command(0.0, 22.5) - 0.5).abs() < 1e-9);
    assert!((rudder_command(22.5, 0.0) + 0.5).abs() < 1e-9);
    assert_eq!(rudder_command(0.0, 90.0), 1.0);
    assert_eq!(rudder_command(0.0, 270.0), -1.0);
    // wraparound: from 350° to 10° is a starboard turn
    assert!(rudder_command(350.0, 10.0) > 0.0);
}

#[test]
fn test_sail_trim_mapping() {
    assert_eq!(sail_trim(0.0), -1.0);
    assert_eq!(sail_trim(180.0), 1.0);
    assert_eq!(sail_trim(-180.0), 1.0);
    assert!((sail_trim(90.0)).abs() < 1e-9);
    assert!((sail_trim(-90.0)).abs() < 1e-9);
}

#[test]
fn test_needs_engine_assist() {
    assert!(needs_engine_assist(Some(10.0), 5.0), "close to shore");
    assert!(!needs_engine_assist(Some(500.0), 5.0), "open water, good wind");
    assert!(!needs_engine_assist(None, 5.0), "no shore data, good wind");
    assert!(needs_engine_assist(None, 0.5), "becalmed");
}

#[test]
fn test_wind_fetch_throttle() {
    let here = Vec2D::new(51.0, 13.0);
    let nearby = Vec2D::new(51.00005, 13.0); // about 5m away
    let far = Vec2D::new(51.01, 13.0); // about 1.1km away
    let now = Utc::now();
    let fresh = now - TimeDelta::seconds(5);
    let stale = now - TimeDelta::seconds(60);

    // no prior fetch: always due
    assert!(wind_fetch_due(None, &here, now));
    // moved barely: skipped even after the interval cap expires
    assert!(!wind_fetch_due(Some((stale, here)), &nearby, now));
    // moved far, but the interval cap still holds
    assert!(!wind_fetch_due(Some((fresh, here)), &far, now));
    // moved far and the cap expired
    assert!(wind_fetch_due(Some((stale, here)), &far, now));
}

#[tokio::test]
async fn test_shore_distance_recompute() {
    let registry = test_registry();
    let lock = registry.sensor_by_kind(SensorKind::Shore).unwrap();
    let response: ShoreDataResponse = serde_json::from_value(json!({
        "points": [
            {"lat": 51.001, "lng": 13.0},
            {"lat": 51.0, "lng": 13.01}
        ]
    }))
    .unwrap();

    if let Sensor::Shore(shore) = &mut *lock.write().await {
        shore.apply_shoreline(&response);
        // heading north: the northern point is dead ahead
        shore.recompute_distance(&Vec2D::new(51.0, 13.0), 0.0);
    }

    let sensor = lock.read().await;
    let distance = sensor.shore_distance().unwrap();
    assert!((distance - 111.2).abs() < 2.0, "nearest land should be ~111m, got {distance}");
}

#[tokio::test]
async fn test_sensor_has_changed_once_per_state() {
    let registry = test_registry();
    let lock = registry.sensor_by_kind(SensorKind::Gps).unwrap();

    {
        let mut sensor = lock.write().await;
        if let Sensor::Gps(gps) = &mut *sensor {
            gps.init_agps(51.0, 13.0);
        }
        assert!(sensor.has_changed());
        assert!(!sensor.has_changed());
        if let Sensor::Gps(gps) = &mut *sensor {
            gps.init_agps(51.5, 13.5);
        }
        assert!(sensor.has_changed());
        assert!(!sensor.has_changed());
    }
}

#[tokio::test]
async fn test_simulation_deterministic() {
    let run = || async {
        let registry = test_registry();
        registry.motor_by_kind(ActuatorKind::Sail).unwrap().write().await.set_state(1.0);
        registry.motor_by_kind(ActuatorKind::Rudder).unwrap().write().await.set_state(0.3);
        let mut engine = SimulationEngine::new(Arc::clone(&registry));
        engine.start();
        engine.set_wind(180.0, 8.0);
        for _ in 0..300 {
            engine.update(1.0 / 30.0).await;
        }
        (engine.heading(), engine.speed(), engine.position())
    };

    let first = run().await;
    let second = run().await;
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(first.2, second.2);
}

#[tokio::test]
async fn test_simulation_responds_to_inputs() {
    let registry = test_registry();
    let mut engine = SimulationEngine::new(Arc::clone(&registry));
    engine.start();

    // no wind, no engine: the boat stays put
    for _ in 0..30 {
        engine.update(1.0 / 30.0).await;
    }
    assert_eq!(engine.speed(), 0.0);
    assert_eq!(engine.heading(), 0.0);

    // running downwind with the sail eased builds speed
    registry.motor_by_kind(ActuatorKind::Sail).unwrap().write().await.set_state(0.0);
    engine.set_wind(180.0, 8.0);
    for _ in 0..60 {
        engine.update(1.0 / 30.0).await;
    }
    assert!(engine.speed() > 0.0, "wind on the sail must move the boat");
    assert_eq!(engine.heading(), 0.0, "centered rudder must hold course");
    let before = engine.position();

    // rudder lock turns the moving boat
    registry.motor_by_kind(ActuatorKind::Rudder).unwrap().write().await.set_state(1.0);
    for _ in 0..60 {
        engine.update(1.0 / 30.0).await;
    }
    assert!(engine.heading() > 0.0, "starboard rudder must change heading");
    assert!(engine.position() != before, "a moving boat changes position");

    // feeds the simulated fix back into the sensors
    assert!(registry.position().await.is_some());
    assert_eq!(registry.heading().await, Some(engine.heading()));
}

#[tokio::test]
async fn test_simulation_start_resets_integrators() {
    let registry = test_registry();
    registry.motor_by_kind(ActuatorKind::Sail).unwrap().write().await.set_state(0.5);
    let mut engine = SimulationEngine::new(Arc::clone(&registry));
    engine.start();
    engine.set_wind(135.0, 10.0);
    for _ in 0..120 {
        engine.update(1.0 / 30.0).await;
    }
    assert!(engine.speed() > 0.0);

    engine.start();
    assert_eq!(engine.speed(), 0.0);
    assert_eq!(engine.heading(), 0.0);
}
