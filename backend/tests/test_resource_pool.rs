//! Tests for TA claiming, release and lab exhaustion

use course_allocation_core::actors::{run_lab_monitor, scan_for_ta};
use course_allocation_core::models::{
    Course, CourseId, Lab, LabId, SimulationState, Student, StudentId, TaId,
};
use std::thread;
use std::time::Duration;

/// Two labs feeding one course, plus a second course sharing lab 1
fn two_lab_state(limit_a: u32, limit_b: u32) -> SimulationState {
    let labs = vec![
        Lab::new(LabId(0), "PRECOG".to_string(), 1, limit_a),
        Lab::new(LabId(1), "CVIT".to_string(), 2, limit_b),
    ];
    let courses = vec![
        Course::new(CourseId(0), "SMAI".to_string(), 0.5, vec![LabId(0), LabId(1)], 3),
        Course::new(CourseId(1), "CV".to_string(), 0.5, vec![LabId(1)], 3),
    ];
    let students = vec![Student::new(StudentId(0), [CourseId(0), CourseId(1), CourseId(0)], 0.5, 0)];
    SimulationState::new(students, courses, labs)
}

#[test]
fn test_scan_claims_first_idle_ta_in_lab_order() {
    let state = two_lab_state(1, 1);

    let first = scan_for_ta(&state, CourseId(0));
    let claim = first.claimed.unwrap();
    assert_eq!(claim.ta, TaId { lab: LabId(0), index: 0 });
    assert!(first.labs_left);

    let second = scan_for_ta(&state, CourseId(0));
    assert_eq!(second.claimed.unwrap().ta, TaId { lab: LabId(1), index: 0 });

    let third = scan_for_ta(&state, CourseId(0));
    assert_eq!(third.claimed.unwrap().ta, TaId { lab: LabId(1), index: 1 });
}

#[test]
fn test_busy_but_eligible_ta_keeps_labs_left() {
    let state = two_lab_state(2, 2);

    // Course 1 occupies both lab-1 TAs
    scan_for_ta(&state, CourseId(1)).claimed.unwrap();
    scan_for_ta(&state, CourseId(1)).claimed.unwrap();

    let scan = scan_for_ta(&state, CourseId(1));
    assert!(scan.claimed.is_none(), "no TA is idle");
    assert!(scan.labs_left, "busy TAs are still eligible");
}

#[test]
fn test_exhausted_labs_end_the_course() {
    let state = two_lab_state(1, 1);
    let lab = state.lab(LabId(1));

    for _ in 0..2 {
        let claim = scan_for_ta(&state, CourseId(1)).claimed.unwrap();
        assert!(claim.ta_exhausted);
        lab.release(claim.ta.index);
    }

    let scan = scan_for_ta(&state, CourseId(1));
    assert!(scan.claimed.is_none());
    assert!(!scan.labs_left);
    assert_eq!(lab.eligible_tas(), 0);
}

#[test]
fn test_tutorials_never_exceed_limit() {
    let state = two_lab_state(3, 3);
    let lab = state.lab(LabId(0));

    let mut claims = 0;
    loop {
        let probe = lab.try_claim(0, CourseId(0));
        let Some(claim) = probe.claim else { break };
        claims += 1;
        assert!(claim.tutorials_taken <= lab.tutorial_limit());
        lab.release(0);
    }

    assert_eq!(claims, 3);
    let ta = lab.tas()[0].lock();
    assert_eq!(ta.tutorials_taken(), 3);
    assert!(!ta.available(), "TA at its limit never returns to the pool");
}

#[test]
fn test_eligible_count_decrements_once_per_ta() {
    let state = two_lab_state(2, 2);
    let lab = state.lab(LabId(1));

    assert_eq!(lab.eligible_tas(), 2);

    // TA 0: two tutorials, retired on the second
    let c = lab.try_claim(0, CourseId(1)).claim.unwrap();
    assert!(!c.ta_exhausted);
    lab.release(0);
    assert_eq!(lab.eligible_tas(), 2);
    let c = lab.try_claim(0, CourseId(1)).claim.unwrap();
    assert!(c.ta_exhausted && !c.lab_exhausted);
    lab.release(0);
    assert_eq!(lab.eligible_tas(), 1);

    // TA 1: exhausts the lab
    lab.try_claim(1, CourseId(1));
    lab.release(1);
    let c = lab.try_claim(1, CourseId(1)).claim.unwrap();
    assert!(c.lab_exhausted);
    assert_eq!(lab.eligible_tas(), 0);
    assert!(lab.lock().exhaustion_signalled());
}

#[test]
fn test_monitor_sees_signal_fired_before_it_started() {
    let state = two_lab_state(1, 1);
    state.lab(LabId(0)).try_claim(0, CourseId(0));

    assert!(run_lab_monitor(&state, LabId(0)));
    assert_eq!(state.event_log().events_of_type("LabExhausted").len(), 1);
}

#[test]
fn test_monitor_wakes_on_later_exhaustion() {
    let state = two_lab_state(1, 1);

    thread::scope(|scope| {
        let monitor = scope.spawn(|| run_lab_monitor(&state, LabId(0)));
        thread::sleep(Duration::from_millis(5));
        state.lab(LabId(0)).try_claim(0, CourseId(0));
        assert!(monitor.join().unwrap());
    });

    assert_eq!(state.event_log().events_of_type("LabExhausted").len(), 1);
}

#[test]
fn test_monitor_exits_quietly_on_close() {
    let state = two_lab_state(1, 1);

    thread::scope(|scope| {
        let monitor = scope.spawn(|| run_lab_monitor(&state, LabId(1)));
        thread::sleep(Duration::from_millis(2));
        state.lab(LabId(1)).close();
        assert!(!monitor.join().unwrap());
    });

    assert!(state.event_log().is_empty());
}
