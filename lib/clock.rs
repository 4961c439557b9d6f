//! Simulated time and step bookkeeping for a single propagation run.

/// Step size, step count, elapsed time, and a single backup slot for the
/// elapsed time.
///
/// The backup slot is one level deep: a [`checkpoint`][Self::checkpoint]
/// overwrites any earlier checkpoint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Clock {
    /// Fixed step size.
    pub dt: f64,
    /// Number of completed steps.
    pub step: usize,
    /// Elapsed simulated time.
    pub timer: f64,
    /// Step budget.
    pub max_steps: usize,
    /// Convergence threshold on the energy difference in imaginary time.
    pub state_accuracy: f64,
    timer_copy: f64,
}

impl Clock {
    /// Create a new clock at `step = 0`, `timer = 0`.
    pub fn new(dt: f64, max_steps: usize, state_accuracy: f64) -> Self {
        Self { dt, step: 0, timer: 0.0, max_steps, state_accuracy, timer_copy: 0.0 }
    }

    /// Advance the timer by `dt * fraction`.
    ///
    /// ```
    /// use splitstep::Clock;
    /// let mut clock = Clock::new(0.1, 10, 0.0);
    /// clock.advance(0.5);
    /// clock.advance(0.5);
    /// assert!((clock.timer - 0.1).abs() < 1e-15);
    /// ```
    pub fn advance(&mut self, fraction: f64) { self.timer += self.dt * fraction; }

    /// Copy the timer into the backup slot.
    pub fn checkpoint(&mut self) { self.timer_copy = self.timer; }

    /// Overwrite the timer from the backup slot.
    pub fn rollback(&mut self) { self.timer = self.timer_copy; }

    /// Zero the timer only.
    pub fn reset_timer(&mut self) { self.timer = 0.0; }

    /// Zero both the step count and the timer.
    pub fn reset(&mut self) {
        self.step = 0;
        self.timer = 0.0;
    }

    /// Return the value held in the backup slot.
    pub fn checkpointed(&self) -> f64 { self.timer_copy }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn checkpoint_is_single_slot() {
        let mut clock = Clock::new(1.0, 10, 0.0);
        clock.advance(1.0);
        clock.checkpoint();
        clock.advance(2.0);
        clock.checkpoint();
        clock.advance(4.0);
        clock.rollback();
        assert_eq!(clock.timer, 3.0);
        // a second rollback does not reach the first checkpoint
        clock.rollback();
        assert_eq!(clock.timer, 3.0);
    }

    #[test]
    fn reset_zeroes_step_and_timer() {
        let mut clock = Clock::new(0.25, 10, 1e-6);
        clock.step = 7;
        clock.advance(3.0);
        clock.reset();
        assert_eq!(clock.step, 0);
        assert_eq!(clock.timer, 0.0);
        assert_eq!(clock.dt, 0.25);
        assert_eq!(clock.max_steps, 10);
    }

    #[test]
    fn reset_timer_keeps_step() {
        let mut clock = Clock::new(0.25, 10, 0.0);
        clock.step = 3;
        clock.advance(1.0);
        clock.reset_timer();
        assert_eq!(clock.step, 3);
        assert_eq!(clock.timer, 0.0);
    }

    proptest! {
        #[test]
        fn rollback_restores_checkpoint(
            dt in 1e-4_f64..1.0,
            before in proptest::collection::vec(-2.0_f64..2.0, 0..8),
            after in proptest::collection::vec(-2.0_f64..2.0, 0..8),
        ) {
            let mut clock = Clock::new(dt, 0, 0.0);
            before.iter().for_each(|f| clock.advance(*f));
            let t0 = clock.timer;
            clock.checkpoint();
            after.iter().for_each(|f| clock.advance(*f));
            clock.rollback();
            prop_assert_eq!(clock.timer, t0);
        }
    }
}
