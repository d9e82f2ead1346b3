//! Course actor
//!
//! Each round:
//! 1. Scan the course's labs in order and claim the first idle TA, noting
//!    whether any TA is still below its tutorial limit (`labs_left`).
//! 2. Nothing idle: stop if `labs_left` is false, otherwise block on the
//!    staffing board until some TA is released, then rescan.
//! 3. Draw a section capacity in `[1, max_slot_ceiling]`.
//! 4. Seat waiting students in registration order, up to the capacity.
//! 5. Run the tutorial.
//! 6. Hand the TA back and re-wake anyone still holding an offer.
//!
//! When the loop ends the course is marked unavailable (the watchdog then
//! moves its waiting students on) and `courses_remaining` drops by one.
//!
//! A round that seats nobody still consumes the TA and runs the tutorial.

use crate::models::{CourseId, Event, SimulationState, StudentId, TaClaim};
use crate::orchestrator::TimingConfig;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::thread;
use tracing::{debug, trace};

/// Result of one TA scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaScan {
    pub claimed: Option<TaClaim>,
    /// Some TA across the course's labs is still below its limit
    pub labs_left: bool,
}

/// Result of one loop iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// A tutorial ran
    Ran { slots: u32, seated: Vec<StudentId> },
    /// Eligible TAs exist but all were busy
    NoTaIdle,
    /// No eligible TA remains anywhere
    Exhausted,
}

/// Totals for a finished course
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub rounds: usize,
    pub seats_offered: usize,
    pub slots_drawn: u64,
}

/// Scan the course's labs for the first idle TA and claim it
pub fn scan_for_ta(state: &SimulationState, course: CourseId) -> TaScan {
    let mut labs_left = false;

    for &lab_id in state.course(course).lab_ids() {
        let lab = state.lab(lab_id);
        for index in 0..lab.tas().len() {
            let probe = lab.try_claim(index, course);
            labs_left |= probe.eligible;
            if let Some(claim) = probe.claim {
                return TaScan {
                    claimed: Some(claim),
                    labs_left,
                };
            }
        }
    }

    TaScan {
        claimed: None,
        labs_left,
    }
}

/// Offer seats to waiting students, in registration order
///
/// A student is seated if it has submitted, its current preference is this
/// course and it holds no unconsumed wake reason. Each student is locked
/// individually while checked, so no student is counted twice against the
/// same capacity.
pub fn allocate_seats(state: &SimulationState, course: CourseId, capacity: u32) -> Vec<StudentId> {
    let mut seated = Vec::new();
    if capacity == 0 {
        return seated;
    }

    for student in state.students() {
        let offered = {
            let mut st = student.lock();
            student.offer_seat(&mut st, course)
        };
        if offered {
            seated.push(student.id());
            state.emit(Event::SeatAllocated {
                time: state.now(),
                student: student.id(),
                course,
            });
            if seated.len() == capacity as usize {
                break;
            }
        }
    }

    seated
}

/// Re-wake every student still holding an unconsumed offer from `course`
pub fn renotify_waiting(state: &SimulationState, course: CourseId) -> usize {
    state
        .students()
        .iter()
        .filter(|student| {
            let st = student.lock();
            student.renotify_offer(&st, course)
        })
        .count()
}

pub struct CourseActor<'a> {
    state: &'a SimulationState,
    id: CourseId,
    timing: &'a TimingConfig,
    rng: RngManager,
    summary: CourseSummary,
}

impl<'a> CourseActor<'a> {
    pub fn new(state: &'a SimulationState, id: CourseId, timing: &'a TimingConfig, seed: u64) -> Self {
        Self {
            state,
            id,
            timing,
            rng: RngManager::new(seed),
            summary: CourseSummary::default(),
        }
    }

    /// Run rounds until no eligible TA remains, then close the course
    pub fn run(mut self) -> CourseSummary {
        loop {
            let seen = self.state.staffing().generation();
            match self.run_round() {
                RoundOutcome::Ran { .. } => {}
                RoundOutcome::NoTaIdle => {
                    trace!(course = %self.id, "all eligible TAs busy, waiting for a release");
                    self.state
                        .staffing()
                        .wait_for_release(seen, self.timing.staffing_poll_interval());
                }
                RoundOutcome::Exhausted => break,
            }
        }

        self.close();
        self.summary
    }

    /// One iteration of the course loop
    pub fn run_round(&mut self) -> RoundOutcome {
        let state = self.state;
        let scan = scan_for_ta(state, self.id);
        let Some(claim) = scan.claimed else {
            return if scan.labs_left {
                RoundOutcome::NoTaIdle
            } else {
                RoundOutcome::Exhausted
            };
        };

        state.emit(Event::TaAssigned {
            time: state.now(),
            ta: claim.ta,
            course: self.id,
            tutorial: claim.tutorials_taken,
        });

        let ceiling = state.course(self.id).max_slot_ceiling();
        let slots = self.rng.range_inclusive(1, u64::from(ceiling.max(1))) as u32;
        state.emit(Event::SectionOpened {
            time: state.now(),
            course: self.id,
            slots,
        });

        let seated = allocate_seats(state, self.id, slots);
        state.emit(Event::TutorialStarted {
            time: state.now(),
            course: self.id,
            filled: seated.len(),
            slots,
        });

        thread::sleep(self.timing.session_duration());

        let release = state.lab(claim.ta.lab).release(claim.ta.index);
        state.staffing().announce_release();
        if !release.available_again {
            debug!(ta = %release.ta, course = %self.id, "TA reached its tutorial limit");
        }
        state.emit(Event::TaReleased {
            time: state.now(),
            ta: release.ta,
            course: release.course.unwrap_or(self.id),
        });

        renotify_waiting(state, self.id);

        self.summary.rounds += 1;
        self.summary.seats_offered += seated.len();
        self.summary.slots_drawn += u64::from(slots);

        RoundOutcome::Ran { slots, seated }
    }

    fn close(&self) {
        let state = self.state;
        state.course(self.id).close();
        state.emit(Event::CourseClosed {
            time: state.now(),
            course: self.id,
        });
        state.ledger().course_finished();
    }
}
