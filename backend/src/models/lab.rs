//! Labs and their TAs
//!
//! A lab owns an ordered roster of TAs and a per-TA tutorial limit. Course
//! actors claim TAs for one tutorial at a time; a TA that reaches the limit
//! is never claimed again and the lab's `eligible_tas` drops by one. When
//! the last TA of a lab is used up the lab's exhaustion condition fires.
//!
//! # Lock order
//!
//! TA lock before lab lock. `try_claim` holds the TA lock while it updates
//! the lab counter; nothing takes a TA lock while holding a lab lock.
//!
//! # Critical Invariants
//!
//! 1. `tutorials_taken` never exceeds `tutorial_limit`
//! 2. `eligible_tas` equals the number of TAs below the limit
//! 3. The exhaustion signal fires at most once

use crate::models::ids::{CourseId, LabId, TaId};
use parking_lot::{Condvar, Mutex, MutexGuard};

/// Mutable part of a TA
#[derive(Debug, Clone)]
pub struct TaState {
    available: bool,
    tutorials_taken: u32,
    current_course: Option<CourseId>,
}

impl TaState {
    pub fn available(&self) -> bool {
        self.available
    }

    pub fn tutorials_taken(&self) -> u32 {
        self.tutorials_taken
    }

    /// Course the TA is currently teaching (None when idle)
    pub fn current_course(&self) -> Option<CourseId> {
        self.current_course
    }
}

/// A teaching assistant
#[derive(Debug)]
pub struct Ta {
    id: TaId,
    state: Mutex<TaState>,
}

impl Ta {
    fn new(id: TaId) -> Self {
        Self {
            id,
            state: Mutex::new(TaState {
                available: true,
                tutorials_taken: 0,
                current_course: None,
            }),
        }
    }

    pub fn id(&self) -> TaId {
        self.id
    }

    /// Acquire the TA lock
    pub fn lock(&self) -> MutexGuard<'_, TaState> {
        self.state.lock()
    }

    /// Course the TA is teaching, which the caller asserts is set
    ///
    /// # Panics
    /// Panics if the TA is idle.
    pub fn teaching(&self) -> CourseId {
        match self.lock().current_course {
            Some(course) => course,
            None => panic!("TA {} is not assigned to a course", self.id),
        }
    }
}

/// A successful TA claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaClaim {
    pub ta: TaId,
    /// Tutorials taken including this one
    pub tutorials_taken: u32,
    /// This claim used up the TA's last tutorial
    pub ta_exhausted: bool,
    /// This claim used up the lab's last eligible TA
    pub lab_exhausted: bool,
}

/// What a course actor learned from looking at one TA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaProbe {
    /// The TA was below its tutorial limit when inspected (busy or not)
    pub eligible: bool,
    pub claim: Option<TaClaim>,
}

/// Result of handing a TA back after a tutorial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaRelease {
    pub ta: TaId,
    /// The course the TA was teaching
    pub course: Option<CourseId>,
    /// The TA went back into the available pool
    pub available_again: bool,
}

/// Mutable part of a lab
#[derive(Debug, Clone)]
pub struct LabState {
    eligible_tas: usize,
    exhaustion_signalled: bool,
    closed: bool,
}

impl LabState {
    pub fn eligible_tas(&self) -> usize {
        self.eligible_tas
    }

    pub fn exhaustion_signalled(&self) -> bool {
        self.exhaustion_signalled
    }
}

/// A lab and its TA roster
#[derive(Debug)]
pub struct Lab {
    id: LabId,
    name: String,
    tutorial_limit: u32,
    tas: Vec<Ta>,
    state: Mutex<LabState>,
    exhausted: Condvar,
}

impl Lab {
    /// Create a lab with `ta_count` fresh TAs
    ///
    /// # Example
    /// ```
    /// use course_allocation_core::models::{Lab, LabId};
    ///
    /// let lab = Lab::new(LabId(0), "PRECOG".to_string(), 3, 2);
    /// assert_eq!(lab.tas().len(), 3);
    /// assert_eq!(lab.eligible_tas(), 3);
    /// ```
    pub fn new(id: LabId, name: String, ta_count: usize, tutorial_limit: u32) -> Self {
        let tas = (0..ta_count)
            .map(|index| Ta::new(TaId { lab: id, index }))
            .collect();
        Self {
            id,
            name,
            tutorial_limit,
            tas,
            state: Mutex::new(LabState {
                eligible_tas: ta_count,
                exhaustion_signalled: false,
                closed: false,
            }),
            exhausted: Condvar::new(),
        }
    }

    pub fn id(&self) -> LabId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum tutorials per TA
    pub fn tutorial_limit(&self) -> u32 {
        self.tutorial_limit
    }

    pub fn tas(&self) -> &[Ta] {
        &self.tas
    }

    /// Acquire the lab lock
    pub fn lock(&self) -> MutexGuard<'_, LabState> {
        self.state.lock()
    }

    /// TAs still below the tutorial limit
    pub fn eligible_tas(&self) -> usize {
        self.lock().eligible_tas
    }

    /// Inspect one TA and claim it for `course` if it is idle
    pub fn try_claim(&self, index: usize, course: CourseId) -> TaProbe {
        let ta = &self.tas[index];
        let mut st = ta.lock();
        let eligible = st.tutorials_taken < self.tutorial_limit;
        if !(st.available && eligible) {
            return TaProbe {
                eligible,
                claim: None,
            };
        }

        st.available = false;
        st.tutorials_taken += 1;
        st.current_course = Some(course);

        let ta_exhausted = st.tutorials_taken == self.tutorial_limit;
        let lab_exhausted = ta_exhausted && self.retire_ta();

        TaProbe {
            eligible,
            claim: Some(TaClaim {
                ta: ta.id(),
                tutorials_taken: st.tutorials_taken,
                ta_exhausted,
                lab_exhausted,
            }),
        }
    }

    /// Hand a TA back after its tutorial
    pub fn release(&self, index: usize) -> TaRelease {
        let ta = &self.tas[index];
        let mut st = ta.lock();
        let available_again = st.tutorials_taken < self.tutorial_limit;
        if available_again {
            st.available = true;
        }
        let course = st.current_course.take();
        TaRelease {
            ta: ta.id(),
            course,
            available_again,
        }
    }

    /// Count one TA out of the eligible pool
    ///
    /// Returns true if that TA was the lab's last, in which case the
    /// exhaustion condition has been signalled.
    fn retire_ta(&self) -> bool {
        let mut st = self.lock();
        debug_assert!(st.eligible_tas > 0, "lab {} retired too many TAs", self.name);
        st.eligible_tas = st.eligible_tas.saturating_sub(1);
        if st.eligible_tas == 0 && !st.exhaustion_signalled {
            st.exhaustion_signalled = true;
            self.exhausted.notify_all();
            return true;
        }
        false
    }

    /// Block until the lab is exhausted or closed
    ///
    /// Returns true if the lab ran out of eligible TAs.
    pub fn wait_exhausted(&self) -> bool {
        let mut st = self.lock();
        self.exhausted
            .wait_while(&mut st, |s| !s.exhaustion_signalled && !s.closed);
        st.exhaustion_signalled
    }

    /// Release anyone blocked in [`wait_exhausted`](Self::wait_exhausted)
    pub fn close(&self) {
        let mut st = self.lock();
        st.closed = true;
        self.exhausted.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_marks_ta_busy() {
        let lab = Lab::new(LabId(0), "CVIT".to_string(), 1, 2);
        let probe = lab.try_claim(0, CourseId(4));
        let claim = probe.claim.expect("idle TA should be claimed");

        assert!(probe.eligible);
        assert_eq!(claim.tutorials_taken, 1);
        assert!(!claim.ta_exhausted);
        assert_eq!(lab.tas()[0].teaching(), CourseId(4));

        let second = lab.try_claim(0, CourseId(5));
        assert!(second.eligible, "busy TA is still eligible");
        assert!(second.claim.is_none());
    }

    #[test]
    fn test_release_below_limit_returns_ta() {
        let lab = Lab::new(LabId(0), "CVIT".to_string(), 1, 2);
        lab.try_claim(0, CourseId(0));
        let release = lab.release(0);
        assert!(release.available_again);
        assert_eq!(release.course, Some(CourseId(0)));
        assert!(lab.tas()[0].lock().available());
        assert_eq!(lab.tas()[0].lock().current_course(), None);
    }

    #[test]
    fn test_last_tutorial_exhausts_lab() {
        let lab = Lab::new(LabId(0), "CVIT".to_string(), 1, 1);
        let claim = lab.try_claim(0, CourseId(0)).claim.unwrap();
        assert!(claim.ta_exhausted);
        assert!(claim.lab_exhausted);
        assert_eq!(lab.eligible_tas(), 0);

        let release = lab.release(0);
        assert!(!release.available_again);

        let probe = lab.try_claim(0, CourseId(0));
        assert!(!probe.eligible);
        assert!(probe.claim.is_none());
        assert!(lab.wait_exhausted());
    }

    #[test]
    fn test_close_releases_monitor_without_exhaustion() {
        let lab = Lab::new(LabId(0), "CVIT".to_string(), 2, 1);
        lab.close();
        assert!(!lab.wait_exhausted());
    }

    #[test]
    #[should_panic(expected = "is not assigned")]
    fn test_idle_ta_has_no_course() {
        let lab = Lab::new(LabId(0), "CVIT".to_string(), 1, 1);
        lab.tas()[0].teaching();
    }
}
