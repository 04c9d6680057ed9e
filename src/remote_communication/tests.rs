use super::boat_messages::{AuthHello, BoatCommand, MotorEntry, MotorFrame};
use super::remote_link::{ConnectionState, LinkEvent, RemoteLink};
use super::telemetry_differ::TelemetryDiffer;
use crate::boat_control::bus::{ActuatorBus, NullBus};
use crate::boat_control::{ActuatorKind, BoatRegistry};
use crate::http_handler::http_response::boat_config::BoatConfigResponse;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

fn test_registry() -> Arc<BoatRegistry> {
    let config: BoatConfigResponse = serde_json::from_value(json!({
        "BoatEmblem": "ORION", "Series": "Explorer", "Make": "CosmicSail",
        "Motors": [
            {"Name": "main_rudder", "Type": "rudder", "Channel": 1, "Min": -1.0, "Max": 1.0, "Default": 0.0},
            {"Name": "main_sail", "Type": "sail", "Channel": 2, "Min": -1.0, "Max": 1.0, "Default": 0.0}
        ],
        "Sensors": [
            {"Name": "gps0", "Type": "gps"}
        ]
    }))
    .unwrap();
    let bus: Arc<dyn ActuatorBus> = Arc::new(NullBus);
    Arc::new(BoatRegistry::from_config(&config, &bus, true).unwrap())
}

#[test]
fn test_command_parsing() {
    let motor: BoatCommand =
        serde_json::from_value(json!({"type": "motor", "name": "main_rudder", "value": 0.5}))
            .unwrap();
    assert_eq!(motor, BoatCommand::Motor { name: String::from("main_rudder"), value: 0.5 });

    let full_meta: BoatCommand = serde_json::from_value(json!({"type": "full_meta"})).unwrap();
    assert_eq!(full_meta, BoatCommand::FullMeta);

    for (type_tag, expected) in [
        ("autopilot_start", BoatCommand::AutopilotStart),
        ("autopilot_stop", BoatCommand::AutopilotStop),
        ("autopilot_reset", BoatCommand::AutopilotReset),
        ("reload", BoatCommand::Reload),
        ("shutdown", BoatCommand::Shutdown),
    ] {
        let parsed: BoatCommand = serde_json::from_value(json!({"type": type_tag})).unwrap();
        assert_eq!(parsed, expected);
    }

    let agps: BoatCommand = serde_json::from_value(
        json!({"type": "agps", "name": "gps0", "lat": 51.0, "lon": 13.0}),
    )
    .unwrap();
    assert_eq!(agps, BoatCommand::Agps { name: String::from("gps0"), lat: 51.0, lon: 13.0 });

    // waypoint payloads arrive untyped, including malformed ones
    let way_points: BoatCommand = serde_json::from_value(
        json!({"type": "autopilot_waypoints", "waypoints": [{"lat": 51.0, "lng": 13.0}]}),
    )
    .unwrap();
    assert!(matches!(way_points, BoatCommand::AutopilotWaypoints { .. }));

    assert!(serde_json::from_value::<BoatCommand>(json!({"type": "self_destruct"})).is_err());
}

#[test]
fn test_frame_serialization_uses_backend_casing() {
    let frame = MotorFrame {
        full: false,
        motors: vec![MotorEntry {
            name: String::from("main_rudder"),
            state: 0.5,
        }],
    };
    let encoded = serde_json::to_value(&frame).unwrap();
    assert_eq!(
        encoded,
        json!({"full": false, "motors": [{"Name": "main_rudder", "State": 0.5}]})
    );
}

#[tokio::test]
async fn test_differ_emits_nothing_without_changes() {
    let registry = test_registry();
    let mut differ = TelemetryDiffer::new();

    // first pass: everything is new against an empty snapshot
    let (motor_frame, sensor_frame) = differ.collect(&registry, false).await;
    assert!(motor_frame.is_some());
    assert!(sensor_frame.is_some());

    // second pass with no changes: no frames at all, never empty ones
    let (motor_frame, sensor_frame) = differ.collect(&registry, false).await;
    assert!(motor_frame.is_none());
    assert!(sensor_frame.is_none());
}

#[tokio::test]
async fn test_differ_reports_only_changed_entities() {
    let registry = test_registry();
    let mut differ = TelemetryDiffer::new();
    differ.collect(&registry, true).await;

    registry
        .motor_by_kind(ActuatorKind::Rudder)
        .unwrap()
        .write()
        .await
        .set_state(0.7);

    let (motor_frame, sensor_frame) = differ.collect(&registry, false).await;
    let motors = motor_frame.unwrap().motors;
    assert_eq!(motors.len(), 1);
    assert_eq!(motors[0].name, "main_rudder");
    assert_eq!(motors[0].state, 0.7);
    assert!(sensor_frame.is_none());

    // the snapshot was updated: reporting is once per distinct state
    let (motor_frame, _) = differ.collect(&registry, false).await;
    assert!(motor_frame.is_none());
}

#[tokio::test]
async fn test_differ_full_includes_everything() {
    let registry = test_registry();
    let mut differ = TelemetryDiffer::new();
    differ.collect(&registry, true).await;

    // nothing changed, but a full frame lists every entity anyway
    let (motor_frame, sensor_frame) = differ.collect(&registry, true).await;
    let motor_frame = motor_frame.unwrap();
    assert!(motor_frame.full);
    assert_eq!(motor_frame.motors.len(), 2);
    let sensor_frame = sensor_frame.unwrap();
    assert!(sensor_frame.full);
    assert_eq!(sensor_frame.sensors.len(), 1);
}

#[test]
fn test_full_frame_cadence() {
    let mut differ = TelemetryDiffer::new();
    let mut full_ticks = Vec::new();
    for tick in 0..120 {
        if differ.tick_full() {
            full_ticks.push(tick);
        }
    }
    // first full within the first 5 ticks, then every 50
    assert_eq!(full_ticks, vec![4, 54, 104]);
}

#[tokio::test]
async fn test_link_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // auth hello arrives first
        let length = socket.read_u32().await.unwrap();
        let mut buffer = vec![0u8; length as usize];
        socket.read_exact(&mut buffer).await.unwrap();
        let hello: AuthHello = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(hello.token, "secret");
        assert_eq!(hello.boat_emblem, "ORION");

        // push one command down to the boat
        let command = serde_json::to_vec(&json!({
            "type": "motor", "name": "main_rudder", "value": 1.0
        }))
        .unwrap();
        socket.write_u32(command.len() as u32).await.unwrap();
        socket.write_all(&command).await.unwrap();

        // and read one telemetry frame coming back
        let length = socket.read_u32().await.unwrap();
        let mut buffer = vec![0u8; length as usize];
        socket.read_exact(&mut buffer).await.unwrap();
        let frame: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(frame["motors"][0]["Name"], "main_rudder");

        socket
    });

    let cancel = CancellationToken::new();
    let (link, mut events) =
        RemoteLink::connect(&addr.to_string(), "secret", "ORION", cancel.clone())
            .await
            .unwrap();
    assert_eq!(link.state(), ConnectionState::Connected);

    let event = events.recv().await.unwrap();
    match event {
        LinkEvent::Command(BoatCommand::Motor { name, value }) => {
            assert_eq!(name, "main_rudder");
            assert_eq!(value, 1.0);
        }
        other => panic!("expected a motor command, got {other:?}"),
    }

    link.send_frame(&MotorFrame {
        full: true,
        motors: vec![MotorEntry {
            name: String::from("main_rudder"),
            state: 1.0,
        }],
    })
    .await;

    let socket = server.await.unwrap();
    drop(socket);

    // server side gone: the link reports the disconnect
    let event = events.recv().await.unwrap();
    assert!(matches!(event, LinkEvent::Disconnected));
    assert_eq!(link.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_link_rejects_malformed_frames() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let length = socket.read_u32().await.unwrap();
        let mut buffer = vec![0u8; length as usize];
        socket.read_exact(&mut buffer).await.unwrap();

        // garbage first, then a valid command
        let garbage = b"not json at all";
        socket.write_u32(garbage.len() as u32).await.unwrap();
        socket.write_all(garbage).await.unwrap();
        let command = serde_json::to_vec(&json!({"type": "reload"})).unwrap();
        socket.write_u32(command.len() as u32).await.unwrap();
        socket.write_all(&command).await.unwrap();
        socket
    });

    let cancel = CancellationToken::new();
    let (_link, mut events) =
        RemoteLink::connect(&addr.to_string(), "secret", "ORION", cancel.clone())
            .await
            .unwrap();

    // the malformed frame is dropped, the task keeps going and delivers
    // the valid one
    let event = events.recv().await.unwrap();
    assert!(matches!(event, LinkEvent::Command(BoatCommand::Reload)));

    drop(server.await.unwrap());
}

#[tokio::test]
async fn test_connect_refused_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let cancel = CancellationToken::new();
    let result = RemoteLink::connect(&addr.to_string(), "secret", "ORION", cancel).await;
    assert!(result.is_err());
}
