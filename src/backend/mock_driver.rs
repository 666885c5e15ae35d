//! Mock device driver for testing.
//!
//! Holds scripted readings and records every write instead of talking to
//! hardware. Clones share state, so a test can keep one handle while the
//! manager owns another.

use super::{DeviceDriver, DriverError};
use crate::controller::{ControllerId, ControllerReading, DeviceEvent, Feedback, Transport};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MockState {
    pending: Vec<DeviceEvent>,
    connected: HashSet<ControllerId>,
    readings: HashMap<ControllerId, ControllerReading>,
    failing: HashSet<ControllerId>,
    last_written: HashMap<ControllerId, Feedback>,
    write_count: usize,
    disconnect_requests: Vec<ControllerId>,
}

/// Mock driver that logs calls instead of touching devices.
#[derive(Clone, Debug, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    /// Create a new mock driver with no controllers.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MockState>, DriverError> {
        self.state.lock().map_err(|_| DriverError::LockPoisoned)
    }

    /// Plug in a controller; it shows up on the next `poll_events`.
    pub fn connect(&self, id: &str, transport: Transport) {
        info!("[MOCK DRIVER] Connect: {} ({:?})", id, transport);
        if let Ok(mut state) = self.lock() {
            let id = ControllerId::from(id);
            state.connected.insert(id.clone());
            state.readings.entry(id.clone()).or_default();
            state.pending.push(DeviceEvent::Connected { id, transport });
        }
    }

    /// Unplug a controller; it shows up on the next `poll_events`.
    pub fn disconnect(&self, id: &str) {
        info!("[MOCK DRIVER] Disconnect: {}", id);
        if let Ok(mut state) = self.lock() {
            let id = ControllerId::from(id);
            state.connected.remove(&id);
            state.pending.push(DeviceEvent::Disconnected { id });
        }
    }

    /// Reading returned by every following `read` of this controller.
    pub fn set_reading(&self, id: &str, reading: ControllerReading) {
        if let Ok(mut state) = self.lock() {
            state.readings.insert(ControllerId::from(id), reading);
        }
    }

    /// Make reads of this controller fail (or succeed again).
    pub fn fail_reads(&self, id: &str, failing: bool) {
        if let Ok(mut state) = self.lock() {
            let id = ControllerId::from(id);
            if failing {
                state.failing.insert(id);
            } else {
                state.failing.remove(&id);
            }
        }
    }

    /// Most recent feedback written to a controller.
    pub fn last_written(&self, id: &str) -> Option<Feedback> {
        self.lock()
            .ok()
            .and_then(|state| state.last_written.get(&ControllerId::from(id)).copied())
    }

    /// Total number of successful writes.
    pub fn write_count(&self) -> usize {
        self.lock().map(|state| state.write_count).unwrap_or(0)
    }

    /// Controllers the game asked to disconnect, in order.
    pub fn disconnect_requests(&self) -> Vec<ControllerId> {
        self.lock()
            .map(|state| state.disconnect_requests.clone())
            .unwrap_or_default()
    }
}

impl DeviceDriver for MockDriver {
    fn poll_events(&self) -> Vec<DeviceEvent> {
        self.lock()
            .map(|mut state| std::mem::take(&mut state.pending))
            .unwrap_or_default()
    }

    fn read(&self, id: &ControllerId) -> Result<ControllerReading, DriverError> {
        let state = self.lock()?;
        if !state.connected.contains(id) {
            return Err(DriverError::UnknownDevice(id.clone()));
        }
        if state.failing.contains(id) {
            debug!("[MOCK DRIVER] Read failed: {}", id);
            return Err(DriverError::NoData(id.clone()));
        }

        state
            .readings
            .get(id)
            .copied()
            .ok_or_else(|| DriverError::NoData(id.clone()))
    }

    fn write(&self, id: &ControllerId, feedback: Feedback) -> Result<(), DriverError> {
        let mut state = self.lock()?;
        if !state.connected.contains(id) {
            return Err(DriverError::UnknownDevice(id.clone()));
        }

        debug!(
            "[MOCK DRIVER] Write {}: rgb {:?} rumble {}",
            id,
            feedback.color.to_bytes(),
            feedback.rumble
        );
        state.last_written.insert(id.clone(), feedback);
        state.write_count += 1;
        Ok(())
    }

    fn disconnect_device(&self, id: &ControllerId) -> Result<(), DriverError> {
        info!("[MOCK DRIVER] Disconnect requested: {}", id);
        let mut state = self.lock()?;
        state.disconnect_requests.push(id.clone());
        if state.connected.remove(id) {
            state.pending.push(DeviceEvent::Disconnected { id: id.clone() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Rgb;

    #[test]
    fn mock_driver_works() {
        let driver = MockDriver::new();
        driver.connect("a", Transport::Wireless);

        let events = driver.poll_events();
        assert_eq!(events.len(), 1);
        assert!(driver.poll_events().is_empty());

        let id = ControllerId::from("a");
        assert_eq!(driver.read(&id).unwrap(), ControllerReading::default());
        assert!(driver.write(&id, Feedback::new(Rgb::RED, 0)).is_ok());
        assert_eq!(driver.last_written("a"), Some(Feedback::new(Rgb::RED, 0)));
    }

    #[test]
    fn mock_driver_unknown_and_failing() {
        let driver = MockDriver::new();
        let ghost = ControllerId::from("ghost");
        assert!(matches!(driver.read(&ghost), Err(DriverError::UnknownDevice(_))));
        assert!(driver.write(&ghost, Feedback::off()).is_err());

        driver.connect("a", Transport::Wireless);
        driver.fail_reads("a", true);
        assert!(matches!(driver.read(&ControllerId::from("a")), Err(DriverError::NoData(_))));
        driver.fail_reads("a", false);
        assert!(driver.read(&ControllerId::from("a")).is_ok());
    }

    #[test]
    fn mock_driver_disconnect_request_queues_event() {
        let driver = MockDriver::new();
        driver.connect("a", Transport::Wireless);
        driver.poll_events();

        let id = ControllerId::from("a");
        driver.disconnect_device(&id).unwrap();
        assert_eq!(driver.disconnect_requests(), vec![id.clone()]);
        assert_eq!(driver.poll_events(), vec![DeviceEvent::Disconnected { id }]);
    }
}
