//! PS Move report codec
//!
//! Decodes input reports into [`ControllerReading`]s and encodes
//! [`Feedback`] into the LED/rumble output report.

use crate::controller::constants::*;
use crate::controller::types::{Accelerometer, Buttons, ControllerReading, Feedback, MAX_RUMBLE};

/// Parse an input report, returning `None` for short or foreign reports
pub fn parse_input_report(data: &[u8]) -> Option<ControllerReading> {
    if data.len() < ACCEL_FRAME2_OFFSET + 6 || data[0] != INPUT_REPORT_ID {
        return None;
    }

    // Bits 0-7 come from buttons2, 8-15 from buttons1, PS lands on bit 16
    // and the upper nibble of buttons4 (MOVE, T) on bits 17-20
    let buttons = (data[BUTTONS2_OFFSET] as u32)
        | ((data[BUTTONS1_OFFSET] as u32) << 8)
        | (((data[BUTTONS3_OFFSET] & 0x01) as u32) << 16)
        | (((data[BUTTONS4_OFFSET] & 0xF0) as u32) << 13);

    // Each report carries two half-frames; average them
    let trigger = (data[TRIGGER_OFFSET] as f32 + data[TRIGGER2_OFFSET] as f32) / 2.0 / 255.0;

    let frame1 = decode_accel_frame(&data[ACCEL_FRAME1_OFFSET..ACCEL_FRAME1_OFFSET + 6]);
    let frame2 = decode_accel_frame(&data[ACCEL_FRAME2_OFFSET..ACCEL_FRAME2_OFFSET + 6]);

    Some(ControllerReading {
        trigger,
        buttons: Buttons(buttons),
        battery: data[BATTERY_OFFSET],
        accelerometer: Accelerometer::new(
            (frame1.x + frame2.x) / 2.0,
            (frame1.y + frame2.y) / 2.0,
            (frame1.z + frame2.z) / 2.0,
        ),
    })
}

fn decode_accel_frame(frame: &[u8]) -> Accelerometer {
    let axis = |lo: u8, hi: u8| {
        let raw = u16::from_le_bytes([lo, hi]) as i32 - 0x8000;
        raw as f64 / ACCEL_COUNTS_PER_G
    };

    Accelerometer::new(
        axis(frame[0], frame[1]),
        axis(frame[2], frame[3]),
        axis(frame[4], frame[5]),
    )
}

/// Build the LED/rumble output report for the given feedback
pub fn build_led_report(feedback: Feedback) -> [u8; REPORT_SIZE] {
    let mut report = [0u8; REPORT_SIZE];
    let [r, g, b] = feedback.color.to_bytes();

    report[0] = SET_LEDS_REPORT_ID;
    report[LED_RED_OFFSET] = r;
    report[LED_GREEN_OFFSET] = g;
    report[LED_BLUE_OFFSET] = b;
    // Actuator intensity is 0-100 on our side, 0-255 on the wire
    let rumble = feedback.rumble.min(MAX_RUMBLE) as u32;
    report[RUMBLE_OFFSET] = ((rumble * 255 + 50) / 100) as u8;

    report
}
