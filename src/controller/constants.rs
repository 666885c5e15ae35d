//! PS Move HID protocol constants
//!
//! This module contains the constants needed to talk to a PS Move controller
//! through the Linux hidraw interface:
//! - USB/Bluetooth bus and device identifiers
//! - Report IDs and buffer sizes
//! - Input report byte offsets

// ============================================================================
// Device Discovery Constants
// ============================================================================

/// Sony Corp. USB vendor ID
pub const SONY_VENDOR_ID: u32 = 0x054C;

/// PS Move motion controller (CECH-ZCM1)
pub const PSMOVE_ZCM1_PRODUCT_ID: u32 = 0x03D5;

/// HID bus type for USB devices (from `HID_ID` in the hidraw uevent)
pub const BUS_USB: u32 = 0x0003;

/// HID bus type for Bluetooth devices
pub const BUS_BLUETOOTH: u32 = 0x0005;

/// sysfs directory listing hidraw nodes
pub const HIDRAW_SYSFS_DIR: &str = "/sys/class/hidraw";

/// Device directory holding hidraw character devices
pub const HIDRAW_DEV_DIR: &str = "/dev";

// ============================================================================
// Reports
// ============================================================================

/// Size of every input/output report exchanged with the controller
pub const REPORT_SIZE: usize = 49;

/// Input report carrying buttons, trigger, battery and sensor frames
pub const INPUT_REPORT_ID: u8 = 0x01;

/// Output report setting the sphere LED and rumble motor
pub const SET_LEDS_REPORT_ID: u8 = 0x06;

// ============================================================================
// Input Report Layout
// ============================================================================

pub const BUTTONS1_OFFSET: usize = 1;
pub const BUTTONS2_OFFSET: usize = 2;
pub const BUTTONS3_OFFSET: usize = 3;
pub const BUTTONS4_OFFSET: usize = 4;
pub const TRIGGER_OFFSET: usize = 5;
pub const TRIGGER2_OFFSET: usize = 6;
pub const BATTERY_OFFSET: usize = 12;

/// First accelerometer half-frame (x, y, z little-endian, biased by 0x8000)
pub const ACCEL_FRAME1_OFFSET: usize = 13;

/// Second accelerometer half-frame
pub const ACCEL_FRAME2_OFFSET: usize = 19;

/// Accelerometer counts per G
pub const ACCEL_COUNTS_PER_G: f64 = 4096.0;

// ============================================================================
// Output Report Layout
// ============================================================================

pub const LED_RED_OFFSET: usize = 2;
pub const LED_GREEN_OFFSET: usize = 3;
pub const LED_BLUE_OFFSET: usize = 4;
pub const RUMBLE_OFFSET: usize = 6;
