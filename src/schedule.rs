//! Write scheduling: decides from elapsed steps whether a write is due.
//!
//! The clock is an explicit value object owned by the exporter, with clear
//! initialization at construction and no implicit reset. It never reaches a
//! terminal state on its own; the exporter runs for the full simulation
//! lifetime and is torn down only at process shutdown.

use serde::{Deserialize, Serialize};

/// Iteration bookkeeping for one exporter instance.
///
/// `tick()` advances the step counter and reports whether the write
/// pipeline should run; `rearm()` resets the counter after a successful
/// write. An interval of 0 disarms the clock permanently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteClock {
    write_interval: u64,
    steps_since_write: u64,
}

impl WriteClock {
    pub fn new(write_interval: u64) -> Self {
        Self {
            write_interval,
            steps_since_write: 0,
        }
    }

    /// Advance by one simulation step; true when a write is due.
    #[must_use]
    pub fn tick(&mut self) -> bool {
        if self.write_interval == 0 {
            return false;
        }
        self.steps_since_write += 1;
        self.steps_since_write >= self.write_interval
    }

    /// Reset after a completed write.
    pub fn rearm(&mut self) {
        self.steps_since_write = 0;
    }

    pub fn write_interval(&self) -> u64 {
        self.write_interval
    }

    pub fn steps_since_write(&self) -> u64 {
        self.steps_since_write
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_write_every_n_steps() {
        let mut clock = WriteClock::new(3);
        let mut writes = 0;
        for _ in 0..12 {
            if clock.tick() {
                writes += 1;
                clock.rearm();
            }
        }
        assert_eq!(writes, 4);
    }

    #[test]
    fn interval_one_writes_every_step() {
        let mut clock = WriteClock::new(1);
        for _ in 0..5 {
            assert!(clock.tick());
            clock.rearm();
        }
    }

    #[test]
    fn interval_zero_never_triggers() {
        let mut clock = WriteClock::new(0);
        for _ in 0..1000 {
            assert!(!clock.tick());
        }
        assert_eq!(clock.steps_since_write(), 0);
    }

    #[test]
    fn missed_rearm_keeps_the_write_due() {
        let mut clock = WriteClock::new(2);
        assert!(!clock.tick());
        assert!(clock.tick());
        // without rearm the write stays due on the next step
        assert!(clock.tick());
    }
}
