//! Tests for seat allocation and offer re-notification

use course_allocation_core::actors::{allocate_seats, renotify_waiting, CourseActor, RoundOutcome};
use course_allocation_core::models::{
    Course, CourseId, Event, Lab, LabId, SimulationState, Student, StudentId, WakeReason,
};
use course_allocation_core::orchestrator::TimingConfig;

fn state_with(students: Vec<Student>) -> SimulationState {
    let labs = vec![Lab::new(LabId(0), "LTRC".to_string(), 1, 1)];
    let courses = vec![
        Course::new(CourseId(0), "NLP".to_string(), 0.9, vec![LabId(0)], 5),
        Course::new(CourseId(1), "IRE".to_string(), 0.9, vec![LabId(0)], 5),
    ];
    SimulationState::new(students, courses, labs)
}

fn student(id: usize, first: usize) -> Student {
    Student::new(
        StudentId(id),
        [CourseId(first), CourseId(1 - first), CourseId(first)],
        0.5,
        0,
    )
}

fn register_all(state: &SimulationState) {
    for s in state.students() {
        assert!(s.check_registration(state.clock()));
    }
}

#[test]
fn test_capacity_two_seats_first_two_of_five() {
    let state = state_with((0..5).map(|i| student(i, 0)).collect());
    register_all(&state);

    let seated = allocate_seats(&state, CourseId(0), 2);

    assert_eq!(seated, vec![StudentId(0), StudentId(1)]);
    for s in state.students() {
        let expected = if s.id().0 < 2 {
            Some(WakeReason::Offer(CourseId(0)))
        } else {
            None
        };
        assert_eq!(s.lock().pending(), expected, "student {}", s.id());
    }
    assert_eq!(state.event_log().events_of_type("SeatAllocated").len(), 2);
}

#[test]
fn test_skips_unsubmitted_and_other_courses() {
    let students = vec![
        student(0, 1),                                                // wants course 1
        Student::new(StudentId(1), [CourseId(0); 3], 0.5, 10),        // not submitted yet
        student(2, 0),
        student(3, 0),
    ];
    let state = state_with(students);
    for s in state.students() {
        s.check_registration(state.clock());
    }

    let seated = allocate_seats(&state, CourseId(0), 5);
    assert_eq!(seated, vec![StudentId(2), StudentId(3)]);
}

#[test]
fn test_fewer_waiting_than_capacity() {
    let state = state_with(vec![student(0, 0)]);
    register_all(&state);

    let seated = allocate_seats(&state, CourseId(0), 4);
    assert_eq!(seated.len(), 1);
}

#[test]
fn test_student_with_pending_offer_not_counted_twice() {
    let state = state_with((0..3).map(|i| student(i, 0)).collect());
    register_all(&state);

    assert_eq!(allocate_seats(&state, CourseId(0), 2), vec![StudentId(0), StudentId(1)]);
    // Next round: only student 2 is still seatable
    assert_eq!(allocate_seats(&state, CourseId(0), 2), vec![StudentId(2)]);
    assert!(allocate_seats(&state, CourseId(0), 2).is_empty());
}

#[test]
fn test_renotify_only_touches_pending_offers_for_course() {
    let state = state_with(vec![student(0, 0), student(1, 0), student(2, 1)]);
    register_all(&state);

    allocate_seats(&state, CourseId(0), 1);
    allocate_seats(&state, CourseId(1), 1);

    assert_eq!(renotify_waiting(&state, CourseId(0)), 1);
    assert_eq!(renotify_waiting(&state, CourseId(1)), 1);
}

#[test]
fn test_round_reports_capacity_and_seated_students() {
    let state = state_with((0..3).map(|i| student(i, 0)).collect());
    register_all(&state);
    let timing = TimingConfig::fast();
    let mut actor = CourseActor::new(&state, CourseId(0), &timing, 9);

    let RoundOutcome::Ran { slots, seated } = actor.run_round() else {
        panic!("the lab's only TA was idle");
    };
    assert!((1..=5).contains(&slots));
    assert_eq!(seated.len(), (slots as usize).min(3));
    let expected: Vec<StudentId> = (0..seated.len()).map(StudentId).collect();
    assert_eq!(seated, expected);

    let log = state.event_log();
    let started = log.events_of_type("TutorialStarted");
    assert_eq!(started.len(), 1);
    assert!(matches!(
        started[0],
        Event::TutorialStarted { filled, slots: s, .. } if *filled == seated.len() && *s == slots
    ));

    // The lab's single TA had a limit of one tutorial
    assert_eq!(actor.run_round(), RoundOutcome::Exhausted);
}

#[test]
fn test_round_waits_when_eligible_ta_is_busy() {
    let labs = vec![Lab::new(LabId(0), "LTRC".to_string(), 1, 2)];
    let courses = vec![
        Course::new(CourseId(0), "NLP".to_string(), 0.9, vec![LabId(0)], 5),
        Course::new(CourseId(1), "IRE".to_string(), 0.9, vec![LabId(0)], 5),
    ];
    let state = SimulationState::new(vec![student(0, 0)], courses, labs);
    let timing = TimingConfig::fast();

    // Course 1 is holding the only TA
    assert!(state.lab(LabId(0)).try_claim(0, CourseId(1)).claim.is_some());

    let mut actor = CourseActor::new(&state, CourseId(0), &timing, 1);
    assert_eq!(actor.run_round(), RoundOutcome::NoTaIdle);

    state.lab(LabId(0)).release(0);
    assert!(matches!(actor.run_round(), RoundOutcome::Ran { .. }));
}
