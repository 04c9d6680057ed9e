use super::failsafe::FailsafeSupervisor;
use crate::boat_control::Sensor;
use crate::keychain::Keychain;
use crate::remote_communication::boat_messages::BoatCommand;
use crate::remote_communication::{LinkEvent, RemoteLink};
use crate::{info, log, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Why a scheduler run ended; decided by the two process-level operator
/// commands.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RunExit {
    /// Tear everything down, then rebuild the task set and reconnect.
    Reload,
    /// Tear everything down, then request OS power-off.
    Shutdown,
}

enum ConnExit {
    Lost,
    Reload,
    Shutdown,
}

/// Outcome of applying one operator command.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DispatchOutcome {
    Continue,
    SendFullMeta,
    Reload,
    Shutdown,
}

/// Owns the operator connection lifecycle and runs the fixed task set at
/// its periods. One failing task never takes its siblings down; the whole
/// set ends only through reload/shutdown (orderly teardown) or loss of the
/// connection (neutralize, retry).
pub struct Scheduler {
    keychain: Arc<Keychain>,
    socket_addr: String,
    token: String,
    boat_emblem: String,
    simulated: bool,
}

impl Scheduler {
    /// Fixed reconnect delay. Marine connectivity loss is typically
    /// transient; a fast, predictable retry beats exponential backoff out
    /// here.
    const RECONNECT_DELAY: Duration = Duration::from_secs(2);
    /// Hold time per self-test step.
    const SELF_TEST_STEP: Duration = Duration::from_millis(700);
    /// Telemetry period against live hardware.
    const META_INTERVAL: Duration = Duration::from_millis(333);
    /// Telemetry period in simulation mode.
    const META_INTERVAL_SIM: Duration = Duration::from_millis(125);
    /// Autopilot cycle period.
    pub(crate) const AUTOPILOT_INTERVAL: Duration = Duration::from_millis(100);
    /// Shore distance recompute period.
    pub(crate) const SHORE_DIST_INTERVAL: Duration = Duration::from_secs(1);
    /// Shoreline metadata refresh period.
    pub(crate) const SHORE_FETCH_INTERVAL: Duration = Duration::from_secs(5);
    /// Wind refresh period.
    pub(crate) const WIND_FETCH_INTERVAL: Duration = Duration::from_secs(30);
    /// Simulation step period and step width.
    pub(crate) const SIM_STEP: Duration = Duration::from_millis(33);
    pub(crate) const SIM_STEP_SECS: f64 = 1.0 / 30.0;

    pub fn new(
        keychain: Arc<Keychain>,
        socket_addr: &str,
        token: &str,
        boat_emblem: &str,
        simulated: bool,
    ) -> Self {
        Self {
            keychain,
            socket_addr: String::from(socket_addr),
            token: String::from(token),
            boat_emblem: String::from(boat_emblem),
            simulated,
        }
    }

    /// Connect-and-serve loop. Returns only for reload or shutdown; plain
    /// connection loss neutralizes the actuators and retries forever.
    pub async fn run(&self) -> RunExit {
        loop {
            let cancel = CancellationToken::new();
            let connected = RemoteLink::connect(
                &self.socket_addr,
                &self.token,
                &self.boat_emblem,
                cancel.child_token(),
            )
            .await;

            match connected {
                Err(e) => {
                    warn!("Connecting to operator service failed: {e}");
                    self.keychain.registry().neutralize_all().await;
                    tokio::time::sleep(Self::RECONNECT_DELAY).await;
                }
                Ok((link, events)) => {
                    info!("Connected to operator service at {}", self.socket_addr);
                    self.self_test().await;
                    let link = Arc::new(link);
                    match self.run_connected(&link, events, &cancel).await {
                        ConnExit::Lost => {
                            warn!("Operator link lost, neutralizing and reconnecting");
                            self.keychain.registry().neutralize_all().await;
                            tokio::time::sleep(Self::RECONNECT_DELAY).await;
                        }
                        ConnExit::Reload => return RunExit::Reload,
                        ConnExit::Shutdown => return RunExit::Shutdown,
                    }
                }
            }
        }
    }

    /// Operator-facing confidence signal right after connecting: drive
    /// everything to full positive, neutral, full negative, neutral, and
    /// leave the deck at neutral.
    pub(crate) async fn self_test(&self) {
        let registry = self.keychain.registry();
        for value in [1.0, 0.0, -1.0, 0.0] {
            registry.set_all_motors(value).await;
            tokio::time::sleep(Self::SELF_TEST_STEP).await;
        }
        registry.neutralize_all().await;
    }

    async fn run_connected(
        &self,
        link: &Arc<RemoteLink>,
        mut events: broadcast::Receiver<LinkEvent>,
        cancel: &CancellationToken,
    ) -> ConnExit {
        if self.simulated {
            self.keychain.simulation().write().await.start();
        }

        let tasks = self.spawn_task_set(link, cancel);

        let exit = loop {
            match events.recv().await {
                Ok(LinkEvent::Command(command)) => match self.handle_command(command).await {
                    DispatchOutcome::Continue => {}
                    DispatchOutcome::SendFullMeta => {
                        let registry = self.keychain.registry();
                        let (motor_frame, sensor_frame) =
                            self.keychain.differ().write().await.collect(&registry, true).await;
                        if let Some(frame) = motor_frame {
                            link.send_frame(&frame).await;
                        }
                        if let Some(frame) = sensor_frame {
                            link.send_frame(&frame).await;
                        }
                    }
                    DispatchOutcome::Reload => break ConnExit::Reload,
                    DispatchOutcome::Shutdown => break ConnExit::Shutdown,
                },
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("Dropped {missed} operator event(s), catching up");
                }
                Ok(LinkEvent::Disconnected) | Err(broadcast::error::RecvError::Closed) => {
                    break ConnExit::Lost;
                }
            }
        };

        cancel.cancel();
        futures::future::join_all(tasks).await;
        link.shutdown();
        exit
    }

    fn spawn_task_set(
        &self,
        link: &Arc<RemoteLink>,
        cancel: &CancellationToken,
    ) -> Vec<JoinHandle<()>> {
        let mut tasks = Vec::new();

        let failsafe =
            FailsafeSupervisor::new(self.keychain.client(), self.keychain.registry());
        let failsafe_cancel = cancel.child_token();
        tasks.push(tokio::spawn(async move {
            failsafe.run(failsafe_cancel).await;
        }));

        let meta_interval =
            if self.simulated { Self::META_INTERVAL_SIM } else { Self::META_INTERVAL };
        tasks.push(tokio::spawn(telemetry_loop(
            Arc::clone(&self.keychain),
            Arc::clone(link),
            meta_interval,
            cancel.child_token(),
        )));

        tasks.push(tokio::spawn(autopilot_loop(
            Arc::clone(&self.keychain),
            cancel.child_token(),
        )));

        tasks.push(tokio::spawn(shore_distance_loop(
            Arc::clone(&self.keychain),
            cancel.child_token(),
        )));

        tasks.push(tokio::spawn(shore_fetch_loop(
            Arc::clone(&self.keychain),
            cancel.child_token(),
        )));

        tasks.push(tokio::spawn(wind_loop(
            Arc::clone(&self.keychain),
            self.simulated,
            cancel.child_token(),
        )));

        if self.simulated {
            tasks.push(tokio::spawn(simulation_loop(
                Arc::clone(&self.keychain),
                cancel.child_token(),
            )));
        }

        tasks
    }

    /// Applies one operator command against the shared context. Every
    /// mutation validates its target first; unknown names and malformed
    /// payloads are rejected without touching state.
    pub(crate) async fn handle_command(&self, command: BoatCommand) -> DispatchOutcome {
        match command {
            BoatCommand::Motor { name, value } => {
                match self.keychain.registry().motor(&name) {
                    Some(motor) => motor.write().await.set_state(value),
                    None => warn!("Motor command for unknown actuator {name}"),
                }
                DispatchOutcome::Continue
            }
            BoatCommand::FullMeta => DispatchOutcome::SendFullMeta,
            BoatCommand::AutopilotStart => {
                self.keychain.autopilot().write().await.start();
                DispatchOutcome::Continue
            }
            BoatCommand::AutopilotStop => {
                self.keychain.autopilot().write().await.stop();
                DispatchOutcome::Continue
            }
            BoatCommand::AutopilotReset => {
                self.keychain.autopilot().write().await.reset();
                DispatchOutcome::Continue
            }
            BoatCommand::AutopilotWaypoints { waypoints } => {
                if let Err(e) = self.keychain.autopilot().write().await.set_way_points(&waypoints)
                {
                    warn!("Waypoint payload rejected: {e}");
                }
                DispatchOutcome::Continue
            }
            BoatCommand::Agps { name, lat, lon } => {
                match self.keychain.registry().sensor(&name) {
                    Some(lock) => {
                        if let Sensor::Gps(gps) = &mut *lock.write().await {
                            gps.init_agps(lat, lon);
                            log!("Assisted fix seeded for {name}");
                        } else {
                            warn!("AGPS seed for {name}, which is not a position sensor");
                        }
                    }
                    None => warn!("AGPS seed for unknown sensor {name}"),
                }
                DispatchOutcome::Continue
            }
            BoatCommand::Reload => {
                info!("Reload requested, tearing down task set");
                self.keychain.autopilot().write().await.stop();
                DispatchOutcome::Reload
            }
            BoatCommand::Shutdown => {
                info!("Shutdown requested");
                DispatchOutcome::Shutdown
            }
        }
    }
}

/// Emits delta (periodically full) telemetry frames.
async fn telemetry_loop(
    keychain: Arc<Keychain>,
    link: Arc<RemoteLink>,
    interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        let registry = keychain.registry();
        let differ_lock = keychain.differ();
        let mut differ = differ_lock.write().await;
        let full = differ.tick_full();
        let (motor_frame, sensor_frame) = differ.collect(&registry, full).await;
        drop(differ);
        if let Some(frame) = motor_frame {
            link.send_frame(&frame).await;
        }
        if let Some(frame) = sensor_frame {
            link.send_frame(&frame).await;
        }
        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }
}

/// Runs the navigation state machine while it is in its running state.
async fn autopilot_loop(keychain: Arc<Keychain>, cancel: CancellationToken) {
    loop {
        let running = keychain.autopilot().read().await.is_running();
        if running {
            keychain.autopilot().write().await.cycle().await;
        }
        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(Scheduler::AUTOPILOT_INTERVAL) => {}
        }
    }
}

/// Recomputes shore distance from the cached shoreline metadata.
async fn shore_distance_loop(keychain: Arc<Keychain>, cancel: CancellationToken) {
    loop {
        keychain.cache().read().await.recompute_shore_distance().await;
        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(Scheduler::SHORE_DIST_INTERVAL) => {}
        }
    }
}

/// Refreshes shoreline metadata, alternating the provider's parity flag.
async fn shore_fetch_loop(keychain: Arc<Keychain>, cancel: CancellationToken) {
    loop {
        keychain.cache().write().await.refresh_shoreline().await;
        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(Scheduler::SHORE_FETCH_INTERVAL) => {}
        }
    }
}

/// Refreshes the wind reading and forwards it into the simulation.
async fn wind_loop(keychain: Arc<Keychain>, simulated: bool, cancel: CancellationToken) {
    loop {
        let fetched = keychain.cache().write().await.refresh_wind().await;
        if simulated {
            if let Some(wind) = fetched {
                keychain.simulation().write().await.set_wind(wind.bearing, wind.speed);
            }
        }
        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(Scheduler::WIND_FETCH_INTERVAL) => {}
        }
    }
}

/// Steps the physics stand-in at a fixed rate.
async fn simulation_loop(keychain: Arc<Keychain>, cancel: CancellationToken) {
    loop {
        keychain.simulation().write().await.update(Scheduler::SIM_STEP_SECS).await;
        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(Scheduler::SIM_STEP) => {}
        }
    }
}
