//! High-level game manager
//!
//! Owns the device driver and the game session and runs the fixed-rate tick
//! loop: apply connection changes, read every controller, let the session
//! decide, then push feedback and disconnect requests back to the devices.

use crate::backend::DeviceDriver;
use crate::controller::{ControllerId, ControllerReading, DeviceEvent, Feedback, Transport};
use crate::game::config::GameConfig;
use crate::game::session::{Session, TickOutcome};
use crate::pairing::PairingWorker;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Runs one game session against one device driver
pub struct GameManager<D: DeviceDriver> {
    config: GameConfig,
    driver: D,
    session: Session,
    /// Runs the pairing utility for controllers plugged in over USB
    pairing: Option<PairingWorker>,
    /// Consecutive failed reads per controller
    read_failures: HashMap<ControllerId, u32>,
    /// Running flag
    running: Arc<AtomicBool>,
}

impl<D: DeviceDriver> GameManager<D> {
    /// Create a new game manager
    pub fn new(config: GameConfig, driver: D) -> Self {
        Self {
            config,
            driver,
            session: Session::new(),
            pairing: None,
            read_failures: HashMap::new(),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Pair controllers plugged in over USB with this worker
    pub fn with_pairing(mut self, worker: PairingWorker) -> Self {
        self.pairing = Some(worker);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn pairing(&self) -> Option<&PairingWorker> {
        self.pairing.as_ref()
    }

    /// Shared running flag; clearing it stops [`GameManager::run`]
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Check if the manager is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the tick loop after the current tick
    pub fn stop(&self) {
        info!("Stopping game manager...");
        self.running.store(false, Ordering::SeqCst);
    }

    /// Tick until stopped
    pub fn run(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Game manager is already running");
            return;
        }

        let interval = self.config.runtime.tick_interval();
        info!("✓ Game manager started ({} ms ticks)", interval.as_millis());

        while self.running.load(Ordering::SeqCst) {
            self.tick_once(Instant::now());
            thread::sleep(interval);
        }

        self.lights_out();
        info!("✓ Game manager stopped");
    }

    /// Run a single tick at `now`
    pub fn tick_once(&mut self, now: Instant) -> TickOutcome {
        self.apply_device_events();
        let readings = self.read_all();

        let outcome = self.session.tick(now, &readings);

        for (id, feedback) in &outcome.writes {
            if let Err(e) = self.driver.write(id, *feedback) {
                warn!("Write to {} failed: {}", id, e);
            }
        }

        for id in &outcome.disconnect_requests {
            if let Err(e) = self.driver.disconnect_device(id) {
                warn!("Could not disconnect {}: {}", id, e);
            }
        }

        outcome
    }

    /// Apply connection changes queued by the driver since the last tick
    fn apply_device_events(&mut self) {
        for event in self.driver.poll_events() {
            match event {
                DeviceEvent::Connected { id, transport } => {
                    self.read_failures.remove(&id);
                    self.session.on_connect(id.clone(), transport);

                    // Wired ids follow the hidraw node, so a reused id can be
                    // a different controller
                    if transport == Transport::Wired {
                        self.request_pairing(id);
                    }
                }
                DeviceEvent::Disconnected { id } => {
                    self.read_failures.remove(&id);
                    self.session.on_disconnect(&id);
                }
            }
        }
    }

    fn request_pairing(&self, id: ControllerId) {
        match &self.pairing {
            Some(worker) => {
                if let Err(e) = worker.request(id) {
                    warn!("Could not queue pairing: {}", e);
                }
            }
            None => debug!("Pairing disabled, not pairing {}", id),
        }
    }

    /// Read every registered controller; failing ones are left out
    fn read_all(&mut self) -> HashMap<ControllerId, ControllerReading> {
        let max_failures = self.config.runtime.max_read_failures;
        let mut readings = HashMap::new();
        let mut unresponsive = Vec::new();

        for id in self.session.registry().ids() {
            match self.driver.read(&id) {
                Ok(reading) => {
                    self.read_failures.remove(&id);
                    readings.insert(id, reading);
                }
                Err(e) => {
                    let failures = self.read_failures.entry(id.clone()).or_insert(0);
                    *failures += 1;
                    debug!("Read from {} failed ({} in a row): {}", id, failures, e);

                    if *failures >= max_failures {
                        unresponsive.push(id);
                    }
                }
            }
        }

        for id in unresponsive {
            warn!("{} stopped responding, treating it as disconnected", id);
            self.read_failures.remove(&id);
            self.session.on_disconnect(&id);
        }

        readings
    }

    /// Turn off every known controller
    fn lights_out(&self) {
        for id in self.session.registry().ids() {
            if let Err(e) = self.driver.write(&id, Feedback::off()) {
                debug!("Could not turn off {}: {}", id, e);
            }
        }
    }
}

impl<D: DeviceDriver> Drop for GameManager<D> {
    fn drop(&mut self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Shutting down game manager (Drop trait)...");
            self.lights_out();
        }
    }
}
