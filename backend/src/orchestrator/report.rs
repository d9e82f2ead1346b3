//! Report - end-of-run snapshot of the allocation state
//!
//! Captures per-student placements, per-course closure, per-TA tutorial
//! counts and per-lab eligibility once every actor has finished. The
//! report is plain data and serializes with serde.
//!
//! # Critical Invariants (checked by [`SimulationReport::check_invariants`])
//!
//! - **Terminal students**: every cursor ends at 3
//! - **Placement consistency**: a placed student's course is one of its preferences
//! - **Tutorial limits**: no TA exceeds its lab's limit
//! - **Eligibility accounting**: lab `eligible_tas` equals TAs below the limit
//! - **Closed courses**: every course ends unavailable

use crate::actors::{CourseSummary, StudentOutcome};
use crate::models::{CourseId, LabId, SimulationState, StudentId, PREFERENCE_COUNT};
use serde::{Deserialize, Serialize};

/// Complete end-of-run snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Simulated time when the run finished
    pub final_time: u64,

    /// Master seed the run was started with
    pub rng_seed: u64,

    pub students: Vec<StudentReport>,
    pub courses: Vec<CourseReport>,
    pub labs: Vec<LabReport>,

    /// Events recorded during the run
    pub event_count: usize,

    /// Students still counted as running by the ledger (0 after a clean run)
    pub students_remaining: usize,

    /// Courses still counted as running by the ledger (0 after a clean run)
    pub courses_remaining: usize,
}

/// Student state snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentReport {
    pub id: StudentId,
    pub caliber: f64,
    pub preferences: Vec<CourseId>,
    pub current_preference: usize,
    pub submitted: bool,
    pub outcome: StudentOutcome,
}

/// Course state snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseReport {
    pub id: CourseId,
    pub name: String,
    pub interest: f64,
    pub available: bool,
    #[serde(flatten)]
    pub summary: CourseSummary,
}

/// Lab state snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabReport {
    pub id: LabId,
    pub name: String,
    pub tutorial_limit: u32,
    pub eligible_tas: usize,
    pub exhausted: bool,
    pub tas: Vec<TaReport>,
}

/// TA state snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaReport {
    pub index: usize,
    pub tutorials_taken: u32,
    pub available: bool,
    pub current_course: Option<CourseId>,
}

impl SimulationReport {
    /// Snapshot the state after the actors have been joined
    ///
    /// `course_summaries` is indexed by course id; courses whose actor did
    /// not report get an empty summary.
    pub fn capture(state: &SimulationState, rng_seed: u64, course_summaries: &[CourseSummary]) -> Self {
        let students = state
            .students()
            .iter()
            .map(|student| {
                let st = student.lock();
                StudentReport {
                    id: student.id(),
                    caliber: student.caliber(),
                    preferences: student.preferences().to_vec(),
                    current_preference: st.current_preference(),
                    submitted: st.submitted(),
                    outcome: match st.selected_course() {
                        Some(course) => StudentOutcome::Placed(course),
                        None => StudentOutcome::Unplaced,
                    },
                }
            })
            .collect();

        let courses = state
            .courses()
            .iter()
            .map(|course| CourseReport {
                id: course.id(),
                name: course.name().to_string(),
                interest: course.interest(),
                available: course.is_available(),
                summary: course_summaries
                    .get(course.id().0)
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();

        let labs = state
            .labs()
            .iter()
            .map(|lab| {
                let tas = lab
                    .tas()
                    .iter()
                    .map(|ta| {
                        let st = ta.lock();
                        TaReport {
                            index: ta.id().index,
                            tutorials_taken: st.tutorials_taken(),
                            available: st.available(),
                            current_course: st.current_course(),
                        }
                    })
                    .collect();
                let lab_state = lab.lock();
                LabReport {
                    id: lab.id(),
                    name: lab.name().to_string(),
                    tutorial_limit: lab.tutorial_limit(),
                    eligible_tas: lab_state.eligible_tas(),
                    exhausted: lab_state.exhaustion_signalled(),
                    tas,
                }
            })
            .collect();

        Self {
            final_time: state.now(),
            rng_seed,
            students,
            courses,
            labs,
            event_count: state.event_count(),
            students_remaining: state.ledger().students_remaining(),
            courses_remaining: state.ledger().courses_remaining(),
        }
    }

    /// Students with a permanent placement
    pub fn placed_count(&self) -> usize {
        self.students
            .iter()
            .filter(|s| matches!(s.outcome, StudentOutcome::Placed(_)))
            .count()
    }

    /// Students who ran out of preferences
    pub fn unplaced_count(&self) -> usize {
        self.students.len() - self.placed_count()
    }

    /// Outcome of one student
    pub fn outcome_of(&self, student: StudentId) -> Option<StudentOutcome> {
        self.students.get(student.0).map(|s| s.outcome)
    }

    /// Total tutorials run across all TAs
    pub fn total_tutorials(&self) -> u64 {
        self.labs
            .iter()
            .flat_map(|lab| lab.tas.iter())
            .map(|ta| u64::from(ta.tutorials_taken))
            .sum()
    }

    /// Check the end-of-run invariants
    ///
    /// Returns a description of every violation found (empty = consistent).
    pub fn check_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for student in &self.students {
            if student.current_preference != PREFERENCE_COUNT {
                violations.push(format!(
                    "student {} ended at preference {}",
                    student.id, student.current_preference
                ));
            }
            if let StudentOutcome::Placed(course) = student.outcome {
                if !student.preferences.contains(&course) {
                    violations.push(format!(
                        "student {} placed in {} which it never ranked",
                        student.id, course
                    ));
                }
            }
        }

        for course in &self.courses {
            if course.available {
                violations.push(format!("course {} is still available", course.id));
            }
        }

        for lab in &self.labs {
            let below_limit = lab
                .tas
                .iter()
                .filter(|ta| ta.tutorials_taken < lab.tutorial_limit)
                .count();
            if below_limit != lab.eligible_tas {
                violations.push(format!(
                    "lab {} reports {} eligible TAs but {} are below the limit",
                    lab.id, lab.eligible_tas, below_limit
                ));
            }
            if lab.exhausted != (lab.eligible_tas == 0) {
                violations.push(format!(
                    "lab {} exhaustion flag disagrees with {} eligible TAs",
                    lab.id, lab.eligible_tas
                ));
            }
            for ta in &lab.tas {
                if ta.tutorials_taken > lab.tutorial_limit {
                    violations.push(format!(
                        "TA {} of lab {} took {} tutorials (limit {})",
                        ta.index, lab.id, ta.tutorials_taken, lab.tutorial_limit
                    ));
                }
                if ta.current_course.is_some() {
                    violations.push(format!("TA {} of lab {} never left its course", ta.index, lab.id));
                }
            }
        }

        if self.students_remaining != 0 || self.courses_remaining != 0 {
            violations.push(format!(
                "ledger not drained: {} students, {} courses",
                self.students_remaining, self.courses_remaining
            ));
        }

        violations
    }

    /// Serialize the report to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
