use crate::boat_control::{BoatRegistry, Sensor, SensorKind};
use crate::http_handler::http_client::HTTPClient;
use crate::http_handler::http_request::health_get::HealthRequest;
use crate::http_handler::http_request::request_common::NoBodyHTTPRequestType;
use crate::{log, warn};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Connectivity watchdog. A boat under remote control must never keep
/// executing a stale command after losing contact with its operator, so
/// the moment a probe times out or cannot connect, every actuator goes to
/// neutral — synchronously, before the next telemetry tick can run.
pub struct FailsafeSupervisor {
    client: Arc<HTTPClient>,
    registry: Arc<BoatRegistry>,
}

impl FailsafeSupervisor {
    /// Time between connectivity probes.
    pub const PROBE_INTERVAL: Duration = Duration::from_secs(3);

    pub fn new(client: Arc<HTTPClient>, registry: Arc<BoatRegistry>) -> Self {
        Self { client, registry }
    }

    /// One probe against the rudder service. Returns false after a
    /// neutralizing loss of contact. Probe failures that are not
    /// connectivity (a 500, a parse problem) are transient: logged, no
    /// neutralization, the loop carries on.
    pub async fn probe_once(&self) -> bool {
        let started = Utc::now();
        match (HealthRequest {}).send_request(&self.client).await {
            Ok(_) => {
                let rtt_ms = (Utc::now() - started).num_milliseconds();
                if let Some(lock) = self.registry.sensor_by_kind(SensorKind::Bandwidth) {
                    if let Sensor::Bandwidth(bandwidth) = &mut *lock.write().await {
                        bandwidth.record_rtt(rtt_ms);
                    }
                }
                true
            }
            Err(e) if e.is_connection_loss() => {
                warn!("Operator contact lost ({e}), neutralizing all actuators");
                self.registry.neutralize_all().await;
                false
            }
            Err(e) => {
                log!("Health probe hiccup, treating as transient: {e}");
                true
            }
        }
    }

    /// Probe loop; runs until the task set is torn down.
    pub async fn run(&self, cancel: CancellationToken) {
        loop {
            self.probe_once().await;
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(Self::PROBE_INTERVAL) => {}
            }
        }
    }
}
