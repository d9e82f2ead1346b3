//! Simulated clock shared by the registration gate and the clock driver
//!
//! The simulation runs in discrete seconds. The clock driver advances the
//! value; students block until it reaches their submission time.
//!
//! Waiters block on a condition variable instead of polling. Every
//! `advance` notifies all waiters, and each waiter re-checks its own
//! deadline under the clock lock, so an advance that happens between the
//! check and the wait cannot be missed.

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Monotonic simulated time, in whole seconds since the simulation started
///
/// # Example
/// ```
/// use course_allocation_core::SimClock;
///
/// let clock = SimClock::new();
/// assert_eq!(clock.now(), 0);
///
/// clock.advance();
/// assert_eq!(clock.now(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SimClock {
    seconds: Mutex<u64>,
    ticked: Condvar,
}

impl SimClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time
    pub fn now(&self) -> u64 {
        *self.seconds.lock()
    }

    /// Advance by one second and wake every waiter
    ///
    /// Returns the new time.
    pub fn advance(&self) -> u64 {
        let mut seconds = self.seconds.lock();
        *seconds += 1;
        self.ticked.notify_all();
        *seconds
    }

    /// Block until the simulated time reaches `deadline`
    ///
    /// Returns immediately if the deadline has already passed.
    pub fn wait_until(&self, deadline: u64) -> u64 {
        let mut seconds = self.seconds.lock();
        self.ticked.wait_while(&mut seconds, |now| *now < deadline);
        *seconds
    }

    /// Like [`wait_until`](Self::wait_until) but gives up after `timeout`
    ///
    /// Returns `true` if the deadline was reached.
    pub fn wait_until_for(&self, deadline: u64, timeout: Duration) -> bool {
        let mut seconds = self.seconds.lock();
        self.ticked
            .wait_while_for(&mut seconds, |now| *now < deadline, timeout);
        *seconds >= deadline
    }

    /// Hold the clock lock
    ///
    /// The registration gate reads the time and flips `submitted` while
    /// holding this guard, so the flip is ordered against `advance`.
    pub(crate) fn lock(&self) -> MutexGuard<'_, u64> {
        self.seconds.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_wait_until_past_deadline_returns_immediately() {
        let clock = SimClock::new();
        clock.advance();
        clock.advance();
        assert_eq!(clock.wait_until(1), 2);
    }

    #[test]
    fn test_wait_until_wakes_on_advance() {
        let clock = Arc::new(SimClock::new());
        let waiter = {
            let clock = Arc::clone(&clock);
            thread::spawn(move || clock.wait_until(3))
        };

        for _ in 0..3 {
            thread::sleep(Duration::from_millis(2));
            clock.advance();
        }

        assert_eq!(waiter.join().unwrap(), 3);
    }

    #[test]
    fn test_wait_until_for_times_out() {
        let clock = SimClock::new();
        assert!(!clock.wait_until_for(5, Duration::from_millis(5)));
        assert_eq!(clock.now(), 0);
    }
}
