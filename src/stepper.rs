use std::time::Duration;
use tokio::time::Instant;

/// Wait after a press before the held operation starts repeating.
pub const HOLD_DELAY: Duration = Duration::from_millis(500);
pub const REPEAT_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOp {
    Increment,
    Decrement,
}

#[derive(Clone, Copy, Debug)]
struct Hold {
    op: StepOp,
    next: Instant,
}

/// Bounded numeric control with press-and-hold auto-repeat.
#[derive(Clone, Debug)]
pub struct Stepper {
    value: i64,
    min: i64,
    max: i64,
    step: i64,
    hold: Option<Hold>,
}

impl Stepper {
    pub fn new(value: i64, min: i64, max: i64, step: i64) -> Self {
        let (min, max) = if max < min { (max, min) } else { (min, max) };
        Self {
            value: value.clamp(min, max),
            min,
            max,
            step: step.max(1),
            hold: None,
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn is_held(&self) -> bool {
        self.hold.is_some()
    }

    /// Clamps into range without touching a running hold.
    pub fn set(&mut self, value: i64) {
        self.value = value.clamp(self.min, self.max);
    }

    /// Returns whether another increment could still move the value.
    pub fn increment(&mut self) -> bool {
        self.value = self.value.saturating_add(self.step).min(self.max);
        self.value < self.max
    }

    pub fn decrement(&mut self) -> bool {
        self.value = self.value.saturating_sub(self.step).max(self.min);
        self.value > self.min
    }

    fn apply(&mut self, op: StepOp) -> bool {
        match op {
            StepOp::Increment => self.increment(),
            StepOp::Decrement => self.decrement(),
        }
    }

    /// Applies `op` once and arms the hold unless the bound was hit.
    pub fn press(&mut self, op: StepOp, now: Instant) {
        self.hold = self.apply(op).then_some(Hold {
            op,
            next: now + HOLD_DELAY,
        });
    }

    pub fn release(&mut self) {
        self.hold = None;
    }

    /// Fires every repetition due by `now`. Returns whether the value changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let before = self.value;
        while let Some(hold) = self.hold {
            if now < hold.next {
                break;
            }
            self.hold = self.apply(hold.op).then_some(Hold {
                op: hold.op,
                next: hold.next + REPEAT_INTERVAL,
            });
        }
        self.value != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_01_clamped_steps() {
        let mut stepper = Stepper::new(9, 1, 10, 1);
        assert!(!stepper.increment());
        assert_eq!(10, stepper.value());
        assert!(!stepper.increment());
        assert_eq!(10, stepper.value());
        assert!(stepper.decrement());
        assert_eq!(9, stepper.value());

        let stepper = Stepper::new(42, 10, 1, 0);
        assert_eq!(10, stepper.value());
        assert_eq!(1, stepper.min());
    }

    #[test]
    fn case_02_hold_repeats_after_delay() {
        let mut stepper = Stepper::new(0, 0, 100, 1);
        let start = Instant::now();
        stepper.press(StepOp::Increment, start);
        assert_eq!(1, stepper.value());
        assert!(!stepper.tick(start + Duration::from_millis(499)));
        assert!(stepper.tick(start + Duration::from_millis(500)));
        assert_eq!(2, stepper.value());
        assert!(!stepper.tick(start + Duration::from_millis(549)));
        assert!(stepper.tick(start + Duration::from_millis(650)));
        assert_eq!(5, stepper.value());
        stepper.release();
        assert!(!stepper.tick(start + Duration::from_secs(5)));
        assert_eq!(5, stepper.value());
    }

    #[test]
    fn case_03_hold_stops_at_bound() {
        let mut stepper = Stepper::new(3, 0, 10, 1);
        let start = Instant::now();
        stepper.press(StepOp::Decrement, start);
        stepper.tick(start + Duration::from_secs(10));
        assert_eq!(0, stepper.value());
        assert!(!stepper.is_held());

        stepper.press(StepOp::Decrement, start);
        assert!(!stepper.is_held());
    }
}
