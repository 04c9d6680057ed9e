use crate::boat_control::bus::ActuatorBus;
use crate::boat_control::{AutoPilot, BoatRegistry, SensorCache, SimulationEngine};
use crate::http_handler::http_client::HTTPClient;
use crate::remote_communication::TelemetryDiffer;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The single boat context: every subsystem the scheduler's tasks touch,
/// constructed once at startup and passed around by reference. There is no
/// module-level mutable state anywhere else.
#[derive(Clone)]
pub struct Keychain {
    /// Client for the rudder backend (boat definition, health probes).
    client: Arc<HTTPClient>,
    /// The actuator/sensor registries; membership fixed after startup.
    registry: Arc<BoatRegistry>,
    /// The navigation state machine.
    autopilot: Arc<RwLock<AutoPilot>>,
    /// Throttled access to the external sensor feeds.
    cache: Arc<RwLock<SensorCache>>,
    /// Delta compression for outbound telemetry.
    differ: Arc<RwLock<TelemetryDiffer>>,
    /// Physics stand-in; stepped only in simulation mode.
    simulation: Arc<RwLock<SimulationEngine>>,
    /// The actuator bus handle, held for the final release on exit.
    bus: Arc<dyn ActuatorBus>,
}

impl Keychain {
    pub fn new(
        client: Arc<HTTPClient>,
        registry: Arc<BoatRegistry>,
        cache: SensorCache,
        bus: Arc<dyn ActuatorBus>,
    ) -> Self {
        let autopilot = Arc::new(RwLock::new(AutoPilot::new(Arc::clone(&registry))));
        let simulation = Arc::new(RwLock::new(SimulationEngine::new(Arc::clone(&registry))));
        Self {
            client,
            registry,
            autopilot,
            cache: Arc::new(RwLock::new(cache)),
            differ: Arc::new(RwLock::new(TelemetryDiffer::new())),
            simulation,
            bus,
        }
    }

    pub fn client(&self) -> Arc<HTTPClient> { Arc::clone(&self.client) }

    pub fn registry(&self) -> Arc<BoatRegistry> { Arc::clone(&self.registry) }

    pub fn autopilot(&self) -> Arc<RwLock<AutoPilot>> { Arc::clone(&self.autopilot) }

    pub fn cache(&self) -> Arc<RwLock<SensorCache>> { Arc::clone(&self.cache) }

    pub fn differ(&self) -> Arc<RwLock<TelemetryDiffer>> { Arc::clone(&self.differ) }

    pub fn simulation(&self) -> Arc<RwLock<SimulationEngine>> { Arc::clone(&self.simulation) }

    pub fn bus(&self) -> Arc<dyn ActuatorBus> { Arc::clone(&self.bus) }
}
