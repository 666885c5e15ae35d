//! Device driver abstraction
//!
//! The game never touches hardware directly. A [`DeviceDriver`] reports
//! connection changes, returns the latest reading for a controller and pushes
//! color/rumble feedback back to it.

pub mod hidraw;
pub mod mock_driver;

pub use hidraw::HidrawDriver;
pub use mock_driver::MockDriver;

use crate::controller::{ControllerId, ControllerReading, DeviceEvent, Feedback};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Unknown controller: {0}")]
    UnknownDevice(ControllerId),

    #[error("No data from controller {0}")]
    NoData(ControllerId),

    #[error("Device I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Driver state lock poisoned")]
    LockPoisoned,
}

/// Unified interface to the controller hardware
pub trait DeviceDriver {
    /// Drain connection changes seen since the last call
    fn poll_events(&self) -> Vec<DeviceEvent>;

    /// Latest reading of a controller
    fn read(&self, id: &ControllerId) -> Result<ControllerReading, DriverError>;

    /// Set the indicator color and rumble of a controller
    fn write(&self, id: &ControllerId, feedback: Feedback) -> Result<(), DriverError>;

    /// Drop the wireless link of a controller
    fn disconnect_device(&self, id: &ControllerId) -> Result<(), DriverError>;
}
