//! Orchestrator Engine - builds the registries and runs every actor
//!
//! # Architecture
//!
//! ```text
//! SimulationConfig ──validate──▶ SimulationState (arenas, ledger, clock)
//!                                      │
//!        ┌──────────────┬──────────────┼───────────────┬──────────────┐
//!        ▼              ▼              ▼               ▼              ▼
//!   clock driver    watchdog     lab monitors    course actors   student actors
//! ```
//!
//! All actors run on scoped threads borrowing the same state. The run ends
//! when every student and course actor has returned; the orchestrator then
//! stops the background actors, closes the labs and snapshots a report.
//!
//! # Seeding
//!
//! The master seed feeds one xorshift64* generator which hands a derived
//! seed to every course (in course order) and then every student (in
//! registration order). A fixed seed therefore fixes each actor's own
//! sequence of draws.
//!
//! # Example
//!
//! ```rust
//! use course_allocation_core::orchestrator::{Orchestrator, SimulationConfig, TimingConfig};
//!
//! let mut config = SimulationConfig::from_json_str(r#"{
//!     "rng_seed": 1,
//!     "labs": [{ "name": "LTRC", "ta_count": 1, "tutorial_limit": 1 }],
//!     "courses": [{ "name": "NLP", "interest": 1.0, "max_slots": 1, "labs": [0] }],
//!     "students": [{ "caliber": 1.0, "preferences": [0, 0, 0] }]
//! }"#).unwrap();
//! config.timing = TimingConfig::fast();
//!
//! let orchestrator = Orchestrator::new(config).unwrap();
//! let report = orchestrator.run().unwrap();
//! assert!(report.check_invariants().is_empty());
//! ```

use crate::actors::{
    run_clock_driver, run_lab_monitor, run_watchdog, CourseActor, CourseSummary, StudentActor,
};
use crate::models::{Course, CourseId, Lab, LabId, SimulationState, Student, StudentId};
use crate::orchestrator::config::{ConfigError, SimulationConfig};
use crate::orchestrator::report::SimulationReport;
use crate::rng::RngManager;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ScopedJoinHandle};
use thiserror::Error;
use tracing::{error, info};

/// Simulation error types
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("simulation has already been run")]
    AlreadyRun,

    #[error("{actor} actor panicked: {message}")]
    ActorPanicked { actor: String, message: String },
}

/// Runs one simulation from a validated configuration
#[derive(Debug)]
pub struct Orchestrator {
    config: SimulationConfig,
    state: SimulationState,
    course_seeds: Vec<u64>,
    student_seeds: Vec<u64>,
    started: AtomicBool,
}

impl Orchestrator {
    /// Validate the configuration and build the registries
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let labs = config
            .labs
            .iter()
            .enumerate()
            .map(|(i, lab)| Lab::new(LabId(i), lab.name.clone(), lab.ta_count, lab.tutorial_limit))
            .collect();

        let courses = config
            .courses
            .iter()
            .enumerate()
            .map(|(i, course)| {
                Course::new(
                    CourseId(i),
                    course.name.clone(),
                    course.interest,
                    course.labs.iter().copied().map(LabId).collect(),
                    course.max_slots,
                )
            })
            .collect();

        let students = config
            .students
            .iter()
            .enumerate()
            .map(|(i, student)| {
                let p = &student.preferences;
                Student::new(
                    StudentId(i),
                    [CourseId(p[0]), CourseId(p[1]), CourseId(p[2])],
                    student.caliber,
                    student.submission_time,
                )
            })
            .collect();

        let mut master = RngManager::new(config.rng_seed);
        let course_seeds = (0..config.courses.len()).map(|_| master.derive_seed()).collect();
        let student_seeds = (0..config.students.len()).map(|_| master.derive_seed()).collect();

        Ok(Self {
            state: SimulationState::new(students, courses, labs),
            config,
            course_seeds,
            student_seeds,
            started: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Shared state (readable while or after running)
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Run every actor to completion and snapshot the result
    ///
    /// A simulation runs once; a second call returns
    /// [`SimulationError::AlreadyRun`]. Returns an error if any actor
    /// panicked; a panicked course is marked closed so its waiting students
    /// can still move on.
    pub fn run(&self) -> Result<SimulationReport, SimulationError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(SimulationError::AlreadyRun);
        }
        let state = &self.state;
        let timing = &self.config.timing;

        info!(
            students = state.students().len(),
            courses = state.courses().len(),
            labs = state.labs().len(),
            seed = self.config.rng_seed,
            "simulation starting"
        );

        let (summaries, failures) = thread::scope(|scope| {
            let clock = scope.spawn(|| run_clock_driver(state, timing.tick_interval()));
            let watchdog = scope.spawn(|| run_watchdog(state, timing.watchdog_interval()));
            let monitors: Vec<_> = state
                .labs()
                .iter()
                .map(|lab| {
                    let id = lab.id();
                    scope.spawn(move || run_lab_monitor(state, id))
                })
                .collect();

            let students: Vec<_> = state
                .students()
                .iter()
                .zip(&self.student_seeds)
                .map(|(student, &seed)| {
                    let id = student.id();
                    scope.spawn(move || StudentActor::new(state, id, seed).run())
                })
                .collect();

            let courses: Vec<_> = state
                .courses()
                .iter()
                .zip(&self.course_seeds)
                .map(|(course, &seed)| {
                    let id = course.id();
                    scope.spawn(move || {
                        thread::sleep(timing.course_start_delay());
                        CourseActor::new(state, id, timing, seed).run()
                    })
                })
                .collect();

            let mut failures = Vec::new();
            let mut summaries = Vec::with_capacity(courses.len());
            for (i, handle) in courses.into_iter().enumerate() {
                match join_actor(handle, || format!("course {i}")) {
                    Ok(summary) => summaries.push(summary),
                    Err(failure) => {
                        // Let the watchdog move this course's students on.
                        state.course(CourseId(i)).close();
                        summaries.push(CourseSummary::default());
                        failures.push(failure);
                    }
                }
            }
            for (i, handle) in students.into_iter().enumerate() {
                if let Err(failure) = join_actor(handle, || format!("student {i}")) {
                    failures.push(failure);
                }
            }

            state.request_shutdown();
            for lab in state.labs() {
                lab.close();
            }

            for (i, handle) in monitors.into_iter().enumerate() {
                if let Err(failure) = join_actor(handle, || format!("lab monitor {i}")) {
                    failures.push(failure);
                }
            }
            if let Err(failure) = join_actor(watchdog, || "watchdog".to_string()) {
                failures.push(failure);
            }
            if let Err(failure) = join_actor(clock, || "clock driver".to_string()) {
                failures.push(failure);
            }

            (summaries, failures)
        });

        if let Some(failure) = failures.into_iter().next() {
            error!(%failure, "simulation aborted");
            return Err(failure);
        }

        let report = SimulationReport::capture(state, self.config.rng_seed, &summaries);
        info!(
            placed = report.placed_count(),
            unplaced = report.unplaced_count(),
            final_time = report.final_time,
            events = report.event_count,
            "simulation finished"
        );
        Ok(report)
    }
}

fn join_actor<T>(
    handle: ScopedJoinHandle<'_, T>,
    actor: impl FnOnce() -> String,
) -> Result<T, SimulationError> {
    handle.join().map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        SimulationError::ActorPanicked {
            actor: actor(),
            message,
        }
    })
}
