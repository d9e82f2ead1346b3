//! Student model
//!
//! A student ranks exactly three courses and walks a preference cursor
//! through them:
//! - cursor `0..=2`: waiting on `preferences[cursor]`
//! - cursor `3`: terminal (placed, or every preference has closed)
//!
//! All mutable fields sit behind the student's own mutex, paired with the
//! student's wake condition variable. Course actors and the watchdog post a
//! [`WakeReason`] and notify while holding that same mutex; the student only
//! waits while no reason is pending. A wake can therefore never be lost
//! between the student's check and its wait.
//!
//! # Critical Invariants
//!
//! 1. The cursor never decreases and never exceeds 3
//! 2. `selected_course` is set at most once, together with cursor = 3
//! 3. At most one wake reason is pending at a time

use crate::core::SimClock;
use crate::models::ids::{CourseId, StudentId};
use crate::rng::RngManager;
use parking_lot::{Condvar, Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

/// Number of ranked preferences every student submits
pub const PREFERENCE_COUNT: usize = 3;

/// Upper bound of the acceptance draw
pub const ACCEPTANCE_SCALE: u64 = 1_000_000;

/// Why a student was woken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WakeReason {
    /// A course allocated the student a seat in its current section
    Offer(CourseId),

    /// The course the student is waiting on has shut down
    CourseClosed(CourseId),
}

impl WakeReason {
    /// Course the reason refers to
    pub fn course(&self) -> CourseId {
        match self {
            WakeReason::Offer(course) | WakeReason::CourseClosed(course) => *course,
        }
    }
}

/// Mutable part of a student, guarded by the student lock
#[derive(Debug, Clone, Default)]
pub struct StudentState {
    current_preference: usize,
    submitted: bool,
    pending: Option<WakeReason>,
    selected_course: Option<CourseId>,
}

impl StudentState {
    /// Preference cursor in `[0, 3]`
    pub fn current_preference(&self) -> usize {
        self.current_preference
    }

    /// Whether the student has filled in preferences
    pub fn submitted(&self) -> bool {
        self.submitted
    }

    /// Unconsumed wake reason, if any
    pub fn pending(&self) -> Option<WakeReason> {
        self.pending
    }

    /// Permanent placement (None until accepted)
    pub fn selected_course(&self) -> Option<CourseId> {
        self.selected_course
    }

    /// Placed or out of preferences
    pub fn is_terminal(&self) -> bool {
        self.current_preference >= PREFERENCE_COUNT
    }
}

/// Outcome of consuming one wake reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeOutcome {
    /// Offer accepted, student placed permanently
    Placed(CourseId),

    /// Offer declined; the cursor stays on the same course
    Withdrew(CourseId),

    /// Current course closed; cursor moved on to `to`
    Advanced { from: CourseId, to: CourseId },

    /// Current course closed and it was the last preference
    Exhausted(CourseId),

    /// Reason referred to a course the student no longer waits on
    Stale,
}

impl WakeOutcome {
    /// Whether the student loop ends after this outcome
    pub fn is_terminal(&self) -> bool {
        matches!(self, WakeOutcome::Placed(_) | WakeOutcome::Exhausted(_))
    }
}

/// A student and its lock
#[derive(Debug)]
pub struct Student {
    id: StudentId,
    preferences: [CourseId; PREFERENCE_COUNT],
    caliber: f64,
    submission_time: u64,
    state: Mutex<StudentState>,
    wake: Condvar,
}

impl Student {
    /// Create a student with its cursor on the first preference
    ///
    /// # Example
    /// ```
    /// use course_allocation_core::models::{CourseId, Student, StudentId};
    ///
    /// let student = Student::new(StudentId(0), [CourseId(2), CourseId(0), CourseId(1)], 0.8, 3);
    /// assert_eq!(student.lock().current_preference(), 0);
    /// assert_eq!(student.preference(0), Some(CourseId(2)));
    /// ```
    pub fn new(
        id: StudentId,
        preferences: [CourseId; PREFERENCE_COUNT],
        caliber: f64,
        submission_time: u64,
    ) -> Self {
        Self {
            id,
            preferences,
            caliber,
            submission_time,
            state: Mutex::new(StudentState::default()),
            wake: Condvar::new(),
        }
    }

    pub fn id(&self) -> StudentId {
        self.id
    }

    pub fn preferences(&self) -> &[CourseId; PREFERENCE_COUNT] {
        &self.preferences
    }

    /// Course at a cursor position (None for the terminal position)
    pub fn preference(&self, cursor: usize) -> Option<CourseId> {
        self.preferences.get(cursor).copied()
    }

    pub fn caliber(&self) -> f64 {
        self.caliber
    }

    pub fn submission_time(&self) -> u64 {
        self.submission_time
    }

    /// Acquire the student lock
    pub fn lock(&self) -> MutexGuard<'_, StudentState> {
        self.state.lock()
    }

    /// Course the student is currently waiting on (None once terminal)
    pub fn waiting_on(&self, state: &StudentState) -> Option<CourseId> {
        self.preference(state.current_preference)
    }

    /// Permanent placement, which the caller asserts has happened
    ///
    /// # Panics
    /// Panics if the student has not been placed.
    pub fn placed_course(&self) -> CourseId {
        let state = self.lock();
        match state.selected_course {
            Some(course) => course,
            None => panic!("student {} has no placement", self.id),
        }
    }

    // ------------------------------------------------------------------
    // Registration gate
    // ------------------------------------------------------------------

    /// Check (and record) whether preferences have been submitted
    ///
    /// Once `submitted` is true this is a no-op that reports true.
    /// Otherwise the clock is read under its own lock and `submitted` flips
    /// when the simulated time has reached `submission_time`.
    pub fn check_registration(&self, clock: &SimClock) -> bool {
        let mut state = self.lock();
        if state.submitted {
            return true;
        }

        let now = clock.lock();
        if self.submission_time <= *now {
            state.submitted = true;
        }
        state.submitted
    }

    /// Block on the clock until the registration gate opens
    pub fn await_registration(&self, clock: &SimClock) {
        while !self.check_registration(clock) {
            clock.wait_until(self.submission_time);
        }
    }

    // ------------------------------------------------------------------
    // Signals posted by other actors (caller holds the student lock)
    // ------------------------------------------------------------------

    /// Whether a course may seat this student in its current section
    pub fn is_seatable(&self, state: &StudentState, course: CourseId) -> bool {
        state.submitted && state.pending.is_none() && self.waiting_on(state) == Some(course)
    }

    /// Post a seat offer and wake the student
    ///
    /// Returns false (and posts nothing) if the student is not seatable.
    pub fn offer_seat(&self, state: &mut StudentState, course: CourseId) -> bool {
        if !self.is_seatable(state, course) {
            return false;
        }
        state.pending = Some(WakeReason::Offer(course));
        self.wake.notify_one();
        true
    }

    /// Re-wake the student if it still holds an unconsumed offer from `course`
    pub fn renotify_offer(&self, state: &StudentState, course: CourseId) -> bool {
        if state.pending == Some(WakeReason::Offer(course)) {
            self.wake.notify_one();
            return true;
        }
        false
    }

    /// Tell the student its current course has shut down
    ///
    /// Posts only when nothing else is pending, so an outstanding offer is
    /// always consumed first.
    pub fn notify_course_closed(&self, state: &mut StudentState, course: CourseId) -> bool {
        if state.pending.is_some() || self.waiting_on(state) != Some(course) {
            return false;
        }
        state.pending = Some(WakeReason::CourseClosed(course));
        self.wake.notify_one();
        true
    }

    // ------------------------------------------------------------------
    // Student side
    // ------------------------------------------------------------------

    /// Block until a wake reason is pending, then take it
    pub fn wait_for_wake(&self, state: &mut MutexGuard<'_, StudentState>) -> WakeReason {
        self.wake.wait_while(state, |s| s.pending.is_none());
        match state.pending.take() {
            Some(reason) => reason,
            None => unreachable!("wait_while returned with no pending reason"),
        }
    }

    /// Apply a consumed wake reason to the student state
    ///
    /// `interest` is the interest of the offering course; `rng` is the
    /// student's own generator.
    pub fn apply_wake(
        &self,
        state: &mut StudentState,
        reason: WakeReason,
        interest: f64,
        rng: &mut RngManager,
    ) -> WakeOutcome {
        let Some(current) = self.waiting_on(state) else {
            return WakeOutcome::Stale;
        };
        if reason.course() != current {
            return WakeOutcome::Stale;
        }

        match reason {
            WakeReason::Offer(course) => {
                if accept(self.caliber, interest, rng) {
                    debug_assert!(state.selected_course.is_none());
                    state.selected_course = Some(course);
                    state.current_preference = PREFERENCE_COUNT;
                    WakeOutcome::Placed(course)
                } else {
                    WakeOutcome::Withdrew(course)
                }
            }
            WakeReason::CourseClosed(course) => {
                state.current_preference += 1;
                match self.waiting_on(state) {
                    Some(next) => WakeOutcome::Advanced {
                        from: course,
                        to: next,
                    },
                    None => WakeOutcome::Exhausted(course),
                }
            }
        }
    }
}

/// Integer acceptance threshold out of [`ACCEPTANCE_SCALE`]
///
/// `round(caliber * 1000) * round(interest * 1000)`.
pub fn acceptance_threshold(caliber: f64, interest: f64) -> u64 {
    let caliber = (caliber.clamp(0.0, 1.0) * 1000.0).round() as u64;
    let interest = (interest.clamp(0.0, 1.0) * 1000.0).round() as u64;
    caliber * interest
}

/// Decide whether an offered seat becomes permanent
///
/// Draws uniformly from `[1, 1_000_000]` and accepts iff the draw is at
/// most the threshold, i.e. with probability ≈ `caliber * interest`.
///
/// # Example
/// ```
/// use course_allocation_core::models::student::accept;
/// use course_allocation_core::RngManager;
///
/// let mut rng = RngManager::new(1);
/// assert!(accept(1.0, 1.0, &mut rng));
/// assert!(!accept(0.0, 0.7, &mut rng));
/// ```
pub fn accept(caliber: f64, interest: f64, rng: &mut RngManager) -> bool {
    rng.range_inclusive(1, ACCEPTANCE_SCALE) <= acceptance_threshold(caliber, interest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Student {
        Student::new(StudentId(0), [CourseId(0), CourseId(1), CourseId(2)], 1.0, 0)
    }

    fn registered() -> Student {
        let s = student();
        assert!(s.check_registration(&SimClock::new()));
        s
    }

    #[test]
    fn test_threshold_rounds_each_factor() {
        assert_eq!(acceptance_threshold(0.9, 0.9), 810_000);
        assert_eq!(acceptance_threshold(0.0006, 1.0), 1_000);
        assert_eq!(acceptance_threshold(1.0, 1.0), ACCEPTANCE_SCALE);
    }

    #[test]
    fn test_offer_requires_submission() {
        let s = student();
        let mut st = s.lock();
        assert!(!s.offer_seat(&mut st, CourseId(0)));
        assert_eq!(st.pending(), None);
    }

    #[test]
    fn test_offer_requires_matching_preference() {
        let s = registered();
        let mut st = s.lock();
        assert!(!s.offer_seat(&mut st, CourseId(1)));
        assert!(s.offer_seat(&mut st, CourseId(0)));
        assert!(!s.offer_seat(&mut st, CourseId(0)), "offer already pending");
    }

    #[test]
    fn test_closed_does_not_override_offer() {
        let s = registered();
        let mut st = s.lock();
        assert!(s.offer_seat(&mut st, CourseId(0)));
        assert!(!s.notify_course_closed(&mut st, CourseId(0)));
        assert_eq!(st.pending(), Some(WakeReason::Offer(CourseId(0))));
    }

    #[test]
    fn test_accepted_offer_is_terminal() {
        let s = registered();
        let mut rng = RngManager::new(5);
        let mut st = s.lock();
        let outcome = s.apply_wake(&mut st, WakeReason::Offer(CourseId(0)), 1.0, &mut rng);
        assert_eq!(outcome, WakeOutcome::Placed(CourseId(0)));
        assert!(st.is_terminal());
        assert_eq!(st.selected_course(), Some(CourseId(0)));
    }

    #[test]
    fn test_withdrawal_keeps_cursor() {
        let s = registered();
        let mut rng = RngManager::new(5);
        let mut st = s.lock();
        let outcome = s.apply_wake(&mut st, WakeReason::Offer(CourseId(0)), 0.0, &mut rng);
        assert_eq!(outcome, WakeOutcome::Withdrew(CourseId(0)));
        assert_eq!(st.current_preference(), 0);
        assert_eq!(st.selected_course(), None);
    }

    #[test]
    fn test_closures_walk_to_exhaustion() {
        let s = registered();
        let mut rng = RngManager::new(5);
        let mut st = s.lock();

        let first = s.apply_wake(&mut st, WakeReason::CourseClosed(CourseId(0)), 0.0, &mut rng);
        assert_eq!(
            first,
            WakeOutcome::Advanced {
                from: CourseId(0),
                to: CourseId(1)
            }
        );
        s.apply_wake(&mut st, WakeReason::CourseClosed(CourseId(1)), 0.0, &mut rng);
        let last = s.apply_wake(&mut st, WakeReason::CourseClosed(CourseId(2)), 0.0, &mut rng);

        assert_eq!(last, WakeOutcome::Exhausted(CourseId(2)));
        assert_eq!(st.current_preference(), PREFERENCE_COUNT);
        assert_eq!(st.selected_course(), None);
    }

    #[test]
    fn test_stale_reason_is_ignored() {
        let s = registered();
        let mut rng = RngManager::new(5);
        let mut st = s.lock();
        let outcome = s.apply_wake(&mut st, WakeReason::CourseClosed(CourseId(2)), 0.0, &mut rng);
        assert_eq!(outcome, WakeOutcome::Stale);
        assert_eq!(st.current_preference(), 0);
    }

    #[test]
    #[should_panic(expected = "has no placement")]
    fn test_placed_course_fails_fast_without_placement() {
        student().placed_course();
    }
}
