//! Semantic events emitted by the allocation core
//!
//! The core never formats progress output itself. Every significant state
//! change is recorded as an [`Event`] stamped with the simulated time; a
//! reporter (the CLI, a test, a metrics sink) decides how to render them.
//!
//! # Event Types
//!
//! - **Student**: registered, seat allocated, placed, withdrew, preference
//!   changed, exhausted
//! - **Staffing**: TA assigned, TA released, lab exhausted
//! - **Course**: section opened, tutorial started, course closed
//!
//! # Example
//!
//! ```rust
//! use course_allocation_core::models::{CourseId, Event, StudentId};
//!
//! let event = Event::StudentPlaced {
//!     time: 4,
//!     student: StudentId(7),
//!     course: CourseId(1),
//! };
//!
//! assert_eq!(event.time(), 4);
//! assert_eq!(event.event_type(), "StudentPlaced");
//! ```

use crate::models::ids::{CourseId, LabId, StudentId, TaId};
use crate::models::state::SimulationState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulation event capturing a state change.
///
/// Events from different actors interleave; within one actor they appear
/// in the order that actor produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Student filled in its preferences
    StudentRegistered { time: u64, student: StudentId },

    /// A course seated the student in its current section
    SeatAllocated {
        time: u64,
        student: StudentId,
        course: CourseId,
    },

    /// Student accepted an offered seat permanently
    StudentPlaced {
        time: u64,
        student: StudentId,
        course: CourseId,
    },

    /// Student declined an offered seat; stays on the same preference
    StudentWithdrew {
        time: u64,
        student: StudentId,
        course: CourseId,
    },

    /// Student's current course closed; cursor moved on
    PreferenceChanged {
        time: u64,
        student: StudentId,
        from: CourseId,
        to: CourseId,
        /// New cursor position (0-indexed)
        priority: usize,
    },

    /// Every preference closed without a placement
    StudentExhausted { time: u64, student: StudentId },

    /// A course claimed a TA for one tutorial
    TaAssigned {
        time: u64,
        ta: TaId,
        course: CourseId,
        /// 1-based count of tutorials this TA has now taken
        tutorial: u32,
    },

    /// TA finished the tutorial and left the course
    TaReleased {
        time: u64,
        ta: TaId,
        course: CourseId,
    },

    /// Section capacity drawn for this round
    SectionOpened {
        time: u64,
        course: CourseId,
        slots: u32,
    },

    /// Seat allocation done; tutorial is running
    TutorialStarted {
        time: u64,
        course: CourseId,
        filled: usize,
        slots: u32,
    },

    /// No eligible TA left; course withdrawn from offerings
    CourseClosed { time: u64, course: CourseId },

    /// Lab has no TA left below the tutorial limit
    LabExhausted { time: u64, lab: LabId },
}

impl Event {
    /// Simulated time at which the event happened
    pub fn time(&self) -> u64 {
        match self {
            Event::StudentRegistered { time, .. }
            | Event::SeatAllocated { time, .. }
            | Event::StudentPlaced { time, .. }
            | Event::StudentWithdrew { time, .. }
            | Event::PreferenceChanged { time, .. }
            | Event::StudentExhausted { time, .. }
            | Event::TaAssigned { time, .. }
            | Event::TaReleased { time, .. }
            | Event::SectionOpened { time, .. }
            | Event::TutorialStarted { time, .. }
            | Event::CourseClosed { time, .. }
            | Event::LabExhausted { time, .. } => *time,
        }
    }

    /// Variant name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::StudentRegistered { .. } => "StudentRegistered",
            Event::SeatAllocated { .. } => "SeatAllocated",
            Event::StudentPlaced { .. } => "StudentPlaced",
            Event::StudentWithdrew { .. } => "StudentWithdrew",
            Event::PreferenceChanged { .. } => "PreferenceChanged",
            Event::StudentExhausted { .. } => "StudentExhausted",
            Event::TaAssigned { .. } => "TaAssigned",
            Event::TaReleased { .. } => "TaReleased",
            Event::SectionOpened { .. } => "SectionOpened",
            Event::TutorialStarted { .. } => "TutorialStarted",
            Event::CourseClosed { .. } => "CourseClosed",
            Event::LabExhausted { .. } => "LabExhausted",
        }
    }

    /// Student the event is about, if any
    pub fn student_id(&self) -> Option<StudentId> {
        match self {
            Event::StudentRegistered { student, .. }
            | Event::SeatAllocated { student, .. }
            | Event::StudentPlaced { student, .. }
            | Event::StudentWithdrew { student, .. }
            | Event::PreferenceChanged { student, .. }
            | Event::StudentExhausted { student, .. } => Some(*student),
            _ => None,
        }
    }

    /// Course the event is about, if any
    ///
    /// For `PreferenceChanged` this is the course the student left.
    pub fn course_id(&self) -> Option<CourseId> {
        match self {
            Event::SeatAllocated { course, .. }
            | Event::StudentPlaced { course, .. }
            | Event::StudentWithdrew { course, .. }
            | Event::TaAssigned { course, .. }
            | Event::TaReleased { course, .. }
            | Event::SectionOpened { course, .. }
            | Event::TutorialStarted { course, .. }
            | Event::CourseClosed { course, .. } => Some(*course),
            Event::PreferenceChanged { from, .. } => Some(*from),
            _ => None,
        }
    }
}

impl Event {
    /// Render with course and lab names taken from `state`
    ///
    /// [`Display`](fmt::Display) on the bare event prints numeric ids;
    /// this is what a progress reporter shows.
    ///
    /// # Example
    /// ```
    /// use course_allocation_core::models::{Course, CourseId, Event, Lab, LabId, SimulationState, Student, StudentId};
    ///
    /// let labs = vec![Lab::new(LabId(0), "LTRC".to_string(), 1, 1)];
    /// let courses = vec![Course::new(CourseId(0), "NLP".to_string(), 0.5, vec![LabId(0)], 2)];
    /// let students = vec![Student::new(StudentId(0), [CourseId(0); 3], 0.5, 0)];
    /// let state = SimulationState::new(students, courses, labs);
    ///
    /// let event = Event::SectionOpened { time: 1, course: CourseId(0), slots: 2 };
    /// assert_eq!(event.named(&state).to_string(), "Course NLP has been allocated 2 seats");
    /// ```
    pub fn named<'a>(&'a self, state: &'a SimulationState) -> NamedEvent<'a> {
        NamedEvent { event: self, state }
    }

    fn render(
        &self,
        f: &mut fmt::Formatter<'_>,
        course_name: &dyn Fn(CourseId) -> String,
        lab_name: &dyn Fn(LabId) -> String,
    ) -> fmt::Result {
        match self {
            Event::StudentRegistered { student, .. } => {
                write!(f, "Student {student} has filled in preferences for course registration")
            }
            Event::SeatAllocated { student, course, .. } => write!(
                f,
                "Student {student} has been allocated a seat in course {}",
                course_name(*course)
            ),
            Event::StudentPlaced { student, course, .. } => write!(
                f,
                "Student {student} has selected course {} permanently",
                course_name(*course)
            ),
            Event::StudentWithdrew { student, course, .. } => write!(
                f,
                "Student {student} has withdrawn from course {}",
                course_name(*course)
            ),
            Event::PreferenceChanged {
                student,
                from,
                to,
                priority,
                ..
            } => write!(
                f,
                "Student {student} has changed current preference from {} (priority {priority}) to {} (priority {})",
                course_name(*from),
                course_name(*to),
                priority + 1
            ),
            Event::StudentExhausted { student, .. } => {
                write!(f, "Student {student} could not get any of their preferred courses")
            }
            Event::TaAssigned {
                ta,
                course,
                tutorial,
                ..
            } => write!(
                f,
                "TA {} from lab {} has been allocated to course {} for TA ship {tutorial}",
                ta.index,
                lab_name(ta.lab),
                course_name(*course)
            ),
            Event::TaReleased { ta, course, .. } => write!(
                f,
                "TA {} from lab {} has completed the tutorial and left course {}",
                ta.index,
                lab_name(ta.lab),
                course_name(*course)
            ),
            Event::SectionOpened { course, slots, .. } => {
                write!(f, "Course {} has been allocated {slots} seats", course_name(*course))
            }
            Event::TutorialStarted {
                course,
                filled,
                slots,
                ..
            } => write!(
                f,
                "Tutorial has started for course {} with {filled} seats filled out of {slots}",
                course_name(*course)
            ),
            Event::CourseClosed { course, .. } => write!(
                f,
                "Course {} doesn't have any TAs eligible and is removed from course offerings",
                course_name(*course)
            ),
            Event::LabExhausted { lab, .. } => write!(
                f,
                "Lab {} no longer has students available for TA ship",
                lab_name(*lab)
            ),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &|course| course.to_string(), &|lab| lab.to_string())
    }
}

/// An [`Event`] displayed with entity names, see [`Event::named`]
pub struct NamedEvent<'a> {
    event: &'a Event,
    state: &'a SimulationState,
}

impl fmt::Display for NamedEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state;
        self.event.render(
            f,
            &|course| match state.courses().get(course.0) {
                Some(c) => c.name().to_string(),
                None => course.to_string(),
            },
            &|lab| match state.labs().get(lab.0) {
                Some(l) => l.name().to_string(),
                None => lab.to_string(),
            },
        )
    }
}

/// Event log for storing and querying simulation events.
///
/// A wrapper around `Vec<Event>` with convenience filters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events of one variant, by [`Event::event_type`] name
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_student(&self, student: StudentId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.student_id() == Some(student))
            .collect()
    }

    pub fn events_for_course(&self, course: CourseId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.course_id() == Some(course))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_time() {
        let event = Event::TaAssigned {
            time: 42,
            ta: TaId {
                lab: LabId(1),
                index: 0,
            },
            course: CourseId(2),
            tutorial: 1,
        };

        assert_eq!(event.time(), 42);
        assert_eq!(event.course_id(), Some(CourseId(2)));
        assert_eq!(event.student_id(), None);
    }

    #[test]
    fn test_log_filters() {
        let mut log = EventLog::new();
        log.log(Event::SeatAllocated {
            time: 1,
            student: StudentId(0),
            course: CourseId(0),
        });
        log.log(Event::StudentWithdrew {
            time: 2,
            student: StudentId(0),
            course: CourseId(0),
        });
        log.log(Event::CourseClosed {
            time: 3,
            course: CourseId(1),
        });

        assert_eq!(log.len(), 3);
        assert_eq!(log.events_for_student(StudentId(0)).len(), 2);
        assert_eq!(log.events_for_course(CourseId(1)).len(), 1);
        assert_eq!(log.events_of_type("StudentWithdrew").len(), 1);
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let event = Event::LabExhausted {
            time: 9,
            lab: LabId(3),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "LabExhausted");
        assert_eq!(json["lab"], 3);
    }

    #[test]
    fn test_display_preference_change_is_one_based() {
        let event = Event::PreferenceChanged {
            time: 0,
            student: StudentId(1),
            from: CourseId(0),
            to: CourseId(2),
            priority: 1,
        };
        assert_eq!(
            event.to_string(),
            "Student 1 has changed current preference from 0 (priority 1) to 2 (priority 2)"
        );
    }

    #[test]
    fn test_named_display_uses_course_and_lab_names() {
        use crate::models::{Course, Lab, Student};

        let labs = vec![
            Lab::new(LabId(0), "PRECOG".to_string(), 1, 1),
            Lab::new(LabId(1), "CVIT".to_string(), 2, 1),
        ];
        let courses = vec![
            Course::new(CourseId(0), "SMAI".to_string(), 0.5, vec![LabId(0)], 2),
            Course::new(CourseId(1), "CV".to_string(), 0.5, vec![LabId(1)], 2),
        ];
        let students = vec![Student::new(StudentId(0), [CourseId(0), CourseId(1), CourseId(0)], 0.5, 0)];
        let state = SimulationState::new(students, courses, labs);

        let assigned = Event::TaAssigned {
            time: 3,
            ta: TaId {
                lab: LabId(1),
                index: 1,
            },
            course: CourseId(1),
            tutorial: 1,
        };
        assert_eq!(
            assigned.named(&state).to_string(),
            "TA 1 from lab CVIT has been allocated to course CV for TA ship 1"
        );

        let changed = Event::PreferenceChanged {
            time: 4,
            student: StudentId(0),
            from: CourseId(0),
            to: CourseId(1),
            priority: 1,
        };
        assert_eq!(
            changed.named(&state).to_string(),
            "Student 0 has changed current preference from SMAI (priority 1) to CV (priority 2)"
        );

        let exhausted = Event::LabExhausted { time: 5, lab: LabId(0) };
        assert_eq!(
            exhausted.named(&state).to_string(),
            "Lab PRECOG no longer has students available for TA ship"
        );
        // Bare display keeps the ids
        assert_eq!(
            exhausted.to_string(),
            "Lab 0 no longer has students available for TA ship"
        );
    }
}
