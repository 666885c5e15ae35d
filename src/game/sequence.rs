//! Timed feedback sequences
//!
//! A [`SequencePlayer`] holds an ordered list of (feedback, duration) steps
//! and is sampled once per tick. It never sleeps: the caller keeps ticking
//! and writing whatever the player returns until it reports completion.

use crate::controller::{Feedback, Rgb, MAX_RUMBLE};
use crate::game::colors;
use std::time::{Duration, Instant};

/// Number of hues in the winner's rainbow
pub const CELEBRATION_FRAMES: usize = 50;

/// Saturation of the winner's rainbow
pub const CELEBRATION_SATURATION: f64 = 0.9;

/// How long each rainbow hue is shown
pub const CELEBRATION_FRAME_TIME: Duration = Duration::from_millis(10);

/// Total length of the winner's celebration
pub const CELEBRATION_DURATION: Duration = Duration::from_secs(3);

/// One step of a sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceStep {
    pub feedback: Feedback,
    pub duration: Duration,
}

impl SequenceStep {
    pub const fn new(color: Rgb, rumble: u8, duration: Duration) -> Self {
        Self {
            feedback: Feedback::new(color, rumble),
            duration,
        }
    }
}

/// Plays a list of steps against the tick clock
#[derive(Debug, Clone)]
pub struct SequencePlayer {
    steps: Vec<SequenceStep>,
    /// Length of one pass over the steps
    cycle: Duration,
    /// Total play time; longer than `cycle` when the steps repeat
    total: Duration,
    started_at: Option<Instant>,
}

impl SequencePlayer {
    /// Play the steps once
    pub fn once(steps: Vec<SequenceStep>) -> Self {
        let cycle: Duration = steps.iter().map(|s| s.duration).sum();
        Self {
            steps,
            cycle,
            total: cycle,
            started_at: None,
        }
    }

    /// Repeat the steps until `total` has elapsed
    pub fn looping(steps: Vec<SequenceStep>, total: Duration) -> Self {
        let cycle: Duration = steps.iter().map(|s| s.duration).sum();
        Self {
            steps,
            cycle,
            total,
            started_at: None,
        }
    }

    /// Feedback to show at `now`, or `None` once the sequence has finished.
    ///
    /// The clock starts on the first call.
    pub fn sample(&mut self, now: Instant) -> Option<Feedback> {
        let started_at = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started_at);

        if elapsed >= self.total || self.cycle.is_zero() {
            return None;
        }

        let cycle_nanos = self.cycle.as_nanos();
        let mut position = elapsed.as_nanos() % cycle_nanos;
        for step in &self.steps {
            let length = step.duration.as_nanos();
            if position < length {
                return Some(step.feedback);
            }
            position -= length;
        }

        None
    }

    pub fn total_duration(&self) -> Duration {
        self.total
    }
}

/// "Ready, get ready, go" shown to every joined player before a game
pub fn countdown() -> SequencePlayer {
    SequencePlayer::once(vec![
        // White
        SequenceStep::new(Rgb::WHITE, 0, Duration::from_millis(500)),
        // White with rumble
        SequenceStep::new(Rgb::WHITE, MAX_RUMBLE, Duration::from_millis(300)),
        // Red
        SequenceStep::new(Rgb::new(0.2, 0.0, 0.0), 0, Duration::from_millis(750)),
        // Yellow
        SequenceStep::new(Rgb::new(0.2, 0.3, 0.0), 0, Duration::from_millis(750)),
        // Green
        SequenceStep::new(Rgb::new(0.0, 0.2, 0.0), 0, Duration::from_millis(750)),
    ])
}

/// Rainbow sweep with continuous rumble for the last player standing
pub fn celebration() -> SequencePlayer {
    let steps = colors::rainbow(CELEBRATION_FRAMES, CELEBRATION_SATURATION)
        .into_iter()
        .map(|color| SequenceStep::new(color, MAX_RUMBLE, CELEBRATION_FRAME_TIME))
        .collect();

    SequencePlayer::looping(steps, CELEBRATION_DURATION)
}
