//! Simulation State
//!
//! The registries every actor reads, plus the shared coordination objects.
//! Built once by the orchestrator (or a test) and shared by reference with
//! every actor thread; nothing is added or removed while actors run.
//!
//! # Lock order
//!
//! Student → Course → TA → Lab, outer to inner. The clock, ledger, staffing
//! board and event log locks are leaves: they are taken last and released
//! before any other entity lock is requested.
//!
//! # Critical Invariants
//!
//! 1. **Handle validity**: every `CourseId` in a student's preferences and
//!    every `LabId` in a course's lab list indexes into the registries
//! 2. **Fixed size**: registries never grow or shrink after construction

use crate::core::SimClock;
use crate::models::course::Course;
use crate::models::event::{Event, EventLog};
use crate::models::ids::{CourseId, LabId, StudentId};
use crate::models::lab::Lab;
use crate::models::ledger::Ledger;
use crate::models::staffing::StaffingBoard;
use crate::models::student::Student;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Complete simulation state
///
/// # Example
///
/// ```rust
/// use course_allocation_core::models::{Course, CourseId, Lab, LabId, SimulationState, Student, StudentId};
///
/// let labs = vec![Lab::new(LabId(0), "LTRC".to_string(), 2, 1)];
/// let courses = vec![Course::new(CourseId(0), "NLP".to_string(), 0.5, vec![LabId(0)], 2)];
/// let students = vec![Student::new(StudentId(0), [CourseId(0); 3], 0.5, 0)];
///
/// let state = SimulationState::new(students, courses, labs);
/// assert_eq!(state.ledger().students_remaining(), 1);
/// assert_eq!(state.ledger().courses_remaining(), 1);
/// ```
#[derive(Debug)]
pub struct SimulationState {
    students: Vec<Student>,
    courses: Vec<Course>,
    labs: Vec<Lab>,
    ledger: Ledger,
    clock: SimClock,
    staffing: StaffingBoard,
    events: Mutex<EventLog>,
    shutdown: AtomicBool,
}

impl SimulationState {
    pub fn new(students: Vec<Student>, courses: Vec<Course>, labs: Vec<Lab>) -> Self {
        let ledger = Ledger::new(students.len(), courses.len());
        Self {
            students,
            courses,
            labs,
            ledger,
            clock: SimClock::new(),
            staffing: StaffingBoard::new(),
            events: Mutex::new(EventLog::new()),
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn labs(&self) -> &[Lab] {
        &self.labs
    }

    pub fn student(&self, id: StudentId) -> &Student {
        &self.students[id.0]
    }

    pub fn course(&self, id: CourseId) -> &Course {
        &self.courses[id.0]
    }

    pub fn lab(&self, id: LabId) -> &Lab {
        &self.labs[id.0]
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn staffing(&self) -> &StaffingBoard {
        &self.staffing
    }

    /// Current simulated time
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Tell the background actors (clock driver, watchdog) to stop
    ///
    /// The orchestrator calls this once every student and course actor has
    /// been joined.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Record an event and mirror it to the tracing subscriber
    pub fn emit(&self, event: Event) {
        match &event {
            Event::StudentPlaced { .. }
            | Event::StudentExhausted { .. }
            | Event::CourseClosed { .. }
            | Event::LabExhausted { .. } => {
                info!(time = event.time(), kind = event.event_type(), "{}", event)
            }
            _ => debug!(time = event.time(), kind = event.event_type(), "{}", event),
        }
        self.events.lock().log(event);
    }

    /// Copy of the event log so far
    pub fn event_log(&self) -> EventLog {
        self.events.lock().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    /// Take the event log, leaving an empty one behind
    pub fn take_events(&self) -> EventLog {
        std::mem::take(&mut *self.events.lock())
    }
}
