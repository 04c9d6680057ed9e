#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod boat_control;
mod http_handler;
mod keychain;
mod logger;
mod remote_communication;
mod scheduling;

use crate::boat_control::bus::{ActuatorBus, NullBus};
use crate::boat_control::{BoatRegistry, SensorCache};
use crate::http_handler::http_client::HTTPClient;
use crate::http_handler::http_request::boat_config_get::BoatConfigRequest;
use crate::http_handler::http_request::request_common::NoBodyHTTPRequestType;
use crate::keychain::Keychain;
use crate::scheduling::{RunExit, Scheduler};
use std::{env, sync::Arc};

/// Everything the process reads from its environment, gathered once.
struct BoatEnv {
    backend_url: String,
    token: String,
    boat_emblem: String,
    socket_addr: String,
    wind_url: String,
    wind_api_key: String,
    shore_url: String,
    shore_api_key: String,
    simulation: bool,
}

impl BoatEnv {
    fn from_env() -> Self {
        let var_or = |key: &str, default: &str| {
            env::var(key).unwrap_or_else(|_| String::from(default))
        };
        Self {
            backend_url: var_or("BACKEND", "http://localhost:8000"),
            token: var_or("TOKEN", ""),
            boat_emblem: var_or("BOAT_EMBLEM", ""),
            socket_addr: var_or("SOCKET", "127.0.0.1:7001"),
            wind_url: var_or("WEATHER_URL", "http://api.openweathermap.org"),
            wind_api_key: var_or("OPENWEATHERMAP_TOKEN", ""),
            shore_url: var_or("ONWATER_URL", "http://api.onwater.io"),
            shore_api_key: var_or("ONWATER_TOKEN", ""),
            simulation: env::var("SIMULATION")
                .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let boat_env = BoatEnv::from_env();
    let keychain = Arc::new(init(&boat_env).await);

    tokio::select! {
        () = supervise(&keychain, &boat_env) => {}
        _ = tokio::signal::ctrl_c() => {
            keychain.bus().release();
            info!("Operator interrupt, actuator bus released");
        }
    }
}

/// Runs scheduler incarnations until one of them asks for power-off. A
/// reload tears the task set down and builds a fresh one against the same
/// context, in-process.
async fn supervise(keychain: &Arc<Keychain>, boat_env: &BoatEnv) {
    loop {
        let scheduler = Scheduler::new(
            Arc::clone(keychain),
            &boat_env.socket_addr,
            &boat_env.token,
            &boat_env.boat_emblem,
            boat_env.simulation,
        );
        match scheduler.run().await {
            RunExit::Reload => {
                info!("Rebuilding task set after reload");
            }
            RunExit::Shutdown => {
                keychain.registry().neutralize_all().await;
                keychain.bus().release();
                power_off().await;
                break;
            }
        }
    }
}

async fn init(boat_env: &BoatEnv) -> Keychain {
    info!("Retrieving boat definition from rudder service on {}", boat_env.backend_url);
    let client = Arc::new(HTTPClient::with_bearer(&boat_env.backend_url, &boat_env.token));

    let config = match (BoatConfigRequest {}).send_request(&client).await {
        Ok(config) => config,
        Err(e) => fatal!("Boat definition unavailable, hardware cannot initialize: {e}"),
    };

    info!("Boat {} ({}, {})", config.boat_emblem(), config.series(), config.make());
    log!("{} motor(s), {} sensor(s) declared", config.motors().len(), config.sensors().len());
    if boat_env.simulation {
        log!("Simulation mode, physics stand-in active");
    }

    let bus: Arc<dyn ActuatorBus> = Arc::new(NullBus);
    let registry = match BoatRegistry::from_config(&config, &bus, boat_env.simulation) {
        Ok(registry) => Arc::new(registry),
        Err(e) => fatal!("Invalid boat definition: {e}"),
    };

    let cache = SensorCache::new(
        Arc::clone(&registry),
        &boat_env.wind_url,
        &boat_env.wind_api_key,
        &boat_env.shore_url,
        &boat_env.shore_api_key,
    );

    Keychain::new(client, registry, cache, bus)
}

async fn power_off() {
    log!("Requesting OS power-off");
    if let Err(e) = tokio::process::Command::new("shutdown").args(["-h", "now"]).status().await {
        error!("Power-off request failed: {e}");
    }
}
