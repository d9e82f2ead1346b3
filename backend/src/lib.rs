//! Course Allocation Simulator - Rust Core
//!
//! Concurrent simulation of a constrained matching market: students rank
//! three courses, courses run tutorials only while a lab TA is free to
//! staff them, and a caliber × interest draw decides whether an offered
//! seat becomes a permanent placement.
//!
//! # Architecture
//!
//! - **core**: Simulated clock
//! - **models**: Students, courses, labs/TAs, ledger, events, shared state
//! - **actors**: Student, course, watchdog, lab monitor and clock driver loops
//! - **orchestrator**: Configuration, actor spawning, end-of-run report
//! - **rng**: Seedable random number generation
//!
//! # Critical Invariants
//!
//! 1. Locks are taken Student → Course → TA → Lab; clock, ledger, staffing
//!    board and event log locks are leaves
//! 2. Every wake is posted under the target's own lock
//! 3. A student waiting on a closed course is always woken by the watchdog

// Module declarations
pub mod actors;
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod rng;

// Re-exports for convenience
pub use crate::core::clock::SimClock;
pub use models::{
    event::{Event, EventLog},
    state::SimulationState,
    student::{accept, Student, WakeReason},
    Course, CourseId, Lab, LabId, Ledger, StudentId, TaId,
};
pub use orchestrator::{
    ConfigError, Orchestrator, SimulationConfig, SimulationError, SimulationReport, TimingConfig,
};
pub use rng::RngManager;
