//! Controller type definitions
//!
//! This module defines the basic data types exchanged with the device layer:
//! sensor readings, button bitsets, indicator colors and actuator feedback.

use std::fmt;

/// Stable device identifier (Bluetooth address when the device reports one)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControllerId(String);

impl ControllerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ControllerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// How a controller is attached to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// USB-tethered; only used for pairing, never plays
    Wired,
    /// Bluetooth-linked; can join games
    Wireless,
}

/// Accelerometer data (linear acceleration in Gs)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accelerometer {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Accelerometer {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// PS Move buttons and their bit in the button bitset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Button {
    Triangle = 1 << 4,
    Circle = 1 << 5,
    Cross = 1 << 6,
    Square = 1 << 7,
    Select = 1 << 8,
    Start = 1 << 11,
    Ps = 1 << 16,
    Move = 1 << 19,
    T = 1 << 20,
}

impl Button {
    pub fn bit(self) -> u32 {
        self as u32
    }
}

/// Button bitset as reported by the device layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons(pub u32);

impl Buttons {
    pub fn is_pressed(&self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    pub fn with(self, button: Button) -> Self {
        Self(self.0 | button.bit())
    }
}

/// One poll of a controller's inputs
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerReading {
    /// Trigger pressure (0.0 to 1.0)
    pub trigger: f32,

    pub buttons: Buttons,

    /// Battery tier (0 to 5, 0xEE/0xEF while charging over USB)
    pub battery: u8,

    pub accelerometer: Accelerometer,
}

/// Indicator color with each channel in 0.0 to 1.0
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);
    pub const GREEN: Rgb = Rgb::new(0.0, 1.0, 0.0);
    pub const YELLOW: Rgb = Rgb::new(1.0, 1.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Normalize an 8-bit triple
    pub fn from_bytes([r, g, b]: [u8; 3]) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Quantize to an 8-bit triple (channels are clamped first)
    pub fn to_bytes(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }
}

/// Maximum actuator intensity
pub const MAX_RUMBLE: u8 = 100;

/// Indicator color plus actuator intensity (0 to 100) pushed to one controller
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Feedback {
    pub color: Rgb,
    pub rumble: u8,
}

impl Feedback {
    pub const fn new(color: Rgb, rumble: u8) -> Self {
        Self { color, rumble }
    }

    /// Indicator off, actuator idle
    pub const fn off() -> Self {
        Self::new(Rgb::OFF, 0)
    }
}

/// Connection change reported by the device layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Connected { id: ControllerId, transport: Transport },
    Disconnected { id: ControllerId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_bits() {
        let buttons = Buttons(Button::Start.bit() | Button::Ps.bit());
        assert!(buttons.is_pressed(Button::Start));
        assert!(buttons.is_pressed(Button::Ps));
        assert!(!buttons.is_pressed(Button::Select));
        assert_eq!(Button::Circle.bit(), 32);
        assert_eq!(Button::Start.bit(), 2048);
    }

    #[test]
    fn test_rgb_quantization() {
        assert_eq!(Rgb::WHITE.to_bytes(), [255, 255, 255]);
        assert_eq!(Rgb::new(2.0, -1.0, 0.5).to_bytes(), [255, 0, 128]);
        assert_eq!(Rgb::from_bytes([255, 0, 0]), Rgb::RED);
    }
}
