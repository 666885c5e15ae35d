//! Motion-based elimination
//!
//! Every Active tick each alive controller's accelerometer reading is reduced
//! to a single magnitude and compared with the previous tick's magnitude.

use crate::controller::{Accelerometer, Feedback, Rgb, MAX_RUMBLE};

/// Magnitude change that knocks a player out
pub const ELIMINATE_THRESHOLD: f64 = 0.7;

/// Magnitude change that dims the player's light as a warning
pub const WARN_THRESHOLD: f64 = 0.2;

/// Share of the assigned color shown while warning
pub const WARN_DIM_FACTOR: f32 = 0.3;

/// Outcome of one motion evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Eliminate,
    Warn,
    Safe,
}

/// L1 norm of the accelerometer reading
pub fn magnitude(accel: &Accelerometer) -> f64 {
    accel.x.abs() + accel.y.abs() + accel.z.abs()
}

/// Classify the change between two consecutive magnitudes
pub fn judge(previous: f64, current: f64) -> Verdict {
    let delta = (current - previous).abs();

    if delta > ELIMINATE_THRESHOLD {
        Verdict::Eliminate
    } else if delta > WARN_THRESHOLD {
        Verdict::Warn
    } else {
        Verdict::Safe
    }
}

/// Record a new magnitude and judge it against the previous one.
///
/// Returns `None` on the first sample. The stored magnitude is always
/// replaced by `current`.
pub fn track(last_motion: &mut Option<f64>, current: f64) -> Option<Verdict> {
    let verdict = last_motion.map(|previous| judge(previous, current));
    *last_motion = Some(current);
    verdict
}

/// Feedback a verdict produces for a player with the given color
pub fn directive(verdict: Verdict, assigned: Rgb, current: Feedback) -> Feedback {
    match verdict {
        Verdict::Eliminate => Feedback::new(Rgb::OFF, MAX_RUMBLE),
        // Warning leaves the motor as it was
        Verdict::Warn => Feedback::new(assigned.scale(WARN_DIM_FACTOR), current.rumble),
        Verdict::Safe => Feedback::new(assigned, 0),
    }
}
