//! Student actor
//!
//! 1. Block on the clock until the student's submission time.
//! 2. Wait for a wake reason and consume it:
//!    - `Offer`: draw acceptance; accept ends the loop, withdraw keeps the
//!      student on the same course for a later round
//!    - `CourseClosed`: move to the next preference (or give up after the
//!      third)
//! 3. Decrement `students_remaining` once.

use crate::models::{CourseId, Event, SimulationState, StudentId, WakeOutcome};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// How a student's run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "course", rename_all = "snake_case")]
pub enum StudentOutcome {
    Placed(CourseId),
    Unplaced,
}

pub struct StudentActor<'a> {
    state: &'a SimulationState,
    id: StudentId,
    rng: RngManager,
}

impl<'a> StudentActor<'a> {
    pub fn new(state: &'a SimulationState, id: StudentId, seed: u64) -> Self {
        Self {
            state,
            id,
            rng: RngManager::new(seed),
        }
    }

    /// Run until placed or out of preferences
    pub fn run(mut self) -> StudentOutcome {
        let state = self.state;
        let student = state.student(self.id);

        student.await_registration(state.clock());
        state.emit(Event::StudentRegistered {
            time: state.now(),
            student: self.id,
        });

        let outcome = {
            let mut guard = student.lock();
            loop {
                let reason = student.wait_for_wake(&mut guard);
                let interest = state.course(reason.course()).interest();
                let outcome = student.apply_wake(&mut guard, reason, interest, &mut self.rng);
                trace!(student = %self.id, ?reason, ?outcome, "wake consumed");

                if let Some(event) = self.describe(outcome, guard.current_preference()) {
                    state.emit(event);
                }

                match outcome {
                    WakeOutcome::Placed(course) => break StudentOutcome::Placed(course),
                    WakeOutcome::Exhausted(_) => break StudentOutcome::Unplaced,
                    _ => {}
                }
            }
        };

        state.ledger().student_finished();
        outcome
    }

    fn describe(&self, outcome: WakeOutcome, cursor: usize) -> Option<Event> {
        let time = self.state.now();
        let student = self.id;
        match outcome {
            WakeOutcome::Placed(course) => Some(Event::StudentPlaced {
                time,
                student,
                course,
            }),
            WakeOutcome::Withdrew(course) => Some(Event::StudentWithdrew {
                time,
                student,
                course,
            }),
            WakeOutcome::Advanced { from, to } => Some(Event::PreferenceChanged {
                time,
                student,
                from,
                to,
                priority: cursor,
            }),
            WakeOutcome::Exhausted(_) => Some(Event::StudentExhausted { time, student }),
            WakeOutcome::Stale => None,
        }
    }
}
