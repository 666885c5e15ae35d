//! PS Move controller support
//!
//! This module provides the controller-facing data model:
//! - Sensor readings, button bitsets and feedback types
//! - HID protocol constants
//! - Input/output report codec

pub mod constants;
pub mod report;
pub mod types;

// Re-export commonly used items
pub use types::*;
