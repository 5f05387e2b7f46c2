use crate::calendar::DateCursor;
use crate::solarviz_log;
use std::time::Duration;
use tokio::time::Instant;

pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 10;
pub const DEFAULT_SPEED: u8 = 4;

/// Delay between two steps: `1024 / 2^speed` milliseconds.
pub fn step_delay(speed: u8) -> Duration {
    let speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    Duration::from_micros(1_024_000 >> speed)
}

/// Advances the time cursor from the frame callback.
///
/// There is no timer of its own: each `tick` compares the frame time with the
/// last accepted step. While paused no baseline is held, so nothing can
/// advance until `play` is called again.
#[derive(Clone, Debug)]
pub struct Playback {
    speed: u8,
    baseline: Option<Instant>,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            baseline: None,
        }
    }
}

impl Playback {
    pub fn is_playing(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn delay(&self) -> Duration {
        step_delay(self.speed)
    }

    /// Clamps to 1..=10. A running playback measures from `now` again.
    pub fn set_speed(&mut self, speed: u8, now: Instant) {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        if self.baseline.is_some() {
            self.baseline = Some(now);
        }
    }

    pub fn play(&mut self, now: Instant) {
        if self.baseline.is_none() {
            solarviz_log!(debug, "playback", "Play at speed {}", self.speed);
            self.baseline = Some(now);
        }
    }

    pub fn pause(&mut self) {
        if self.baseline.take().is_some() {
            solarviz_log!(debug, "playback", "Pause");
        }
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play(now);
        }
    }

    /// One frame. Returns whether the cursor moved.
    ///
    /// Reaching the last day pauses playback.
    pub fn tick(&mut self, now: Instant, cursor: &mut DateCursor) -> bool {
        let Some(baseline) = self.baseline else {
            return false;
        };
        if now.saturating_duration_since(baseline) < self.delay() {
            return false;
        }
        if !cursor.advance() {
            solarviz_log!(debug, "playback", "End of range reached");
            self.pause();
            return false;
        }
        self.baseline = Some(now);
        true
    }
}
