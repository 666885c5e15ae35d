//! Oust: a screenless motion-controller elimination party game
//!
//! Players hold PS Move controllers and try to keep them still while shoving
//! everyone else. Moving too fast knocks you out; the last controller standing
//! wins. The controllers' light spheres and rumble motors are the only
//! interface.

pub mod backend;
pub mod bootstrap;
pub mod controller;
pub mod game;
pub mod manager;
pub mod pairing;

// Re-export commonly used items
pub use backend::{DeviceDriver, DriverError, MockDriver};
pub use controller::{
    Accelerometer, Button, Buttons, ControllerId, ControllerReading, DeviceEvent, Feedback, Rgb,
    Transport,
};
pub use game::{GameConfig, Phase, Session, TickOutcome};
pub use manager::GameManager;
