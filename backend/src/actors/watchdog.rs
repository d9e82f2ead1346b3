//! Cleanup watchdog
//!
//! Sweeps every non-terminal student and, if the course it waits on has
//! shut down, posts `CourseClosed` so the student moves to its next
//! preference. This is the only path that unblocks a student whose course
//! actor has already exited.
//!
//! Each check reads a snapshot; a student missed in one sweep is caught in
//! the next, so delivery is eventual rather than single-shot.

use crate::models::SimulationState;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// Counters from a finished watchdog run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogStats {
    pub sweeps: u64,
    pub wakes: u64,
}

/// One pass over all students
///
/// Locks student then course, as everywhere else. Returns how many
/// students were woken.
pub fn sweep(state: &SimulationState) -> usize {
    let mut woken = 0;
    for student in state.students() {
        let mut st = student.lock();
        let Some(course_id) = student.waiting_on(&st) else {
            continue;
        };

        let available = state.course(course_id).lock();
        if !*available && student.notify_course_closed(&mut st, course_id) {
            trace!(student = %student.id(), course = %course_id, "woke student on closed course");
            woken += 1;
        }
        drop(available);
        drop(st);
    }
    woken
}

/// Sweep until every student is terminal (or shutdown is requested)
pub fn run_watchdog(state: &SimulationState, interval: Duration) -> WatchdogStats {
    let mut stats = WatchdogStats::default();

    while state.ledger().students_remaining() > 0 && !state.is_shutting_down() {
        stats.wakes += sweep(state) as u64;
        stats.sweeps += 1;

        if interval.is_zero() {
            thread::yield_now();
        } else {
            state.ledger().wait_students_done_for(interval);
        }
    }

    debug!(sweeps = stats.sweeps, wakes = stats.wakes, "watchdog finished");
    stats
}
