//! Staffing board: wake-ups for course actors waiting on a busy TA
//!
//! A course that finds eligible TAs but none idle blocks here instead of
//! rescanning in a loop. The board is a generation counter: the course
//! reads the generation *before* scanning, and every TA release bumps it.
//! A release that lands between the scan and the wait therefore changes
//! the generation and the wait returns at once.

use parking_lot::{Condvar, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct StaffingBoard {
    generation: Mutex<u64>,
    released: Condvar,
}

impl StaffingBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current release generation
    pub fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Record a TA release and wake every waiting course
    pub fn announce_release(&self) {
        let mut generation = self.generation.lock();
        *generation += 1;
        self.released.notify_all();
    }

    /// Block until the generation moves past `seen` or `timeout` elapses
    ///
    /// Returns true if a release was observed.
    pub fn wait_for_release(&self, seen: u64, timeout: Duration) -> bool {
        let mut generation = self.generation.lock();
        self.released
            .wait_while_for(&mut generation, |g| *g == seen, timeout);
        *generation != seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_before_wait_is_not_lost() {
        let board = StaffingBoard::new();
        let seen = board.generation();
        board.announce_release();
        assert!(board.wait_for_release(seen, Duration::from_secs(5)));
    }

    #[test]
    fn test_wait_times_out_without_release() {
        let board = StaffingBoard::new();
        let seen = board.generation();
        assert!(!board.wait_for_release(seen, Duration::from_millis(2)));
    }
}
