//! Shared ledger: whole-simulation completion counters
//!
//! Two monotonically decreasing counters, each behind its own lock. Actors
//! only decrement them on exit; the watchdog, the clock driver and any
//! external supervisor read them (or block until they hit zero).

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// A countdown that can be waited on
#[derive(Debug, Default)]
pub struct Countdown {
    remaining: Mutex<usize>,
    drained: Condvar,
}

impl Countdown {
    pub fn new(start: usize) -> Self {
        Self {
            remaining: Mutex::new(start),
            drained: Condvar::new(),
        }
    }

    pub fn get(&self) -> usize {
        *self.remaining.lock()
    }

    /// Decrement by one, returning the new value
    ///
    /// # Panics
    /// Panics if the countdown is already at zero.
    pub fn decrement(&self) -> usize {
        let mut remaining = self.remaining.lock();
        assert!(*remaining > 0, "countdown decremented below zero");
        *remaining -= 1;
        if *remaining == 0 {
            self.drained.notify_all();
        }
        *remaining
    }

    /// Block until the countdown reaches zero
    pub fn wait_zero(&self) {
        let mut remaining = self.remaining.lock();
        self.drained.wait_while(&mut remaining, |r| *r > 0);
    }

    /// Block until zero or `timeout`; returns true if zero was reached
    pub fn wait_zero_for(&self, timeout: Duration) -> bool {
        let mut remaining = self.remaining.lock();
        self.drained
            .wait_while_for(&mut remaining, |r| *r > 0, timeout);
        *remaining == 0
    }
}

/// Students and courses still running
#[derive(Debug)]
pub struct Ledger {
    students_remaining: Countdown,
    courses_remaining: Countdown,
}

impl Ledger {
    /// # Example
    /// ```
    /// use course_allocation_core::models::Ledger;
    ///
    /// let ledger = Ledger::new(2, 1);
    /// ledger.student_finished();
    /// ledger.student_finished();
    /// ledger.course_finished();
    /// assert!(ledger.is_complete());
    /// ```
    pub fn new(students: usize, courses: usize) -> Self {
        Self {
            students_remaining: Countdown::new(students),
            courses_remaining: Countdown::new(courses),
        }
    }

    pub fn students_remaining(&self) -> usize {
        self.students_remaining.get()
    }

    pub fn courses_remaining(&self) -> usize {
        self.courses_remaining.get()
    }

    pub fn student_finished(&self) -> usize {
        self.students_remaining.decrement()
    }

    pub fn course_finished(&self) -> usize {
        self.courses_remaining.decrement()
    }

    /// Both counters drained
    pub fn is_complete(&self) -> bool {
        self.students_remaining() == 0 && self.courses_remaining() == 0
    }

    pub fn wait_students_done(&self) {
        self.students_remaining.wait_zero();
    }

    pub fn wait_courses_done(&self) {
        self.courses_remaining.wait_zero();
    }

    pub fn wait_students_done_for(&self, timeout: Duration) -> bool {
        self.students_remaining.wait_zero_for(timeout)
    }

    /// Block until both counters drain or `timeout` elapses
    pub fn wait_complete_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.students_remaining.wait_zero_for(timeout)
            && self
                .courses_remaining
                .wait_zero_for(deadline.saturating_duration_since(Instant::now()))
    }
}
