//! Concurrent actors
//!
//! Every actor borrows the shared [`SimulationState`](crate::models::SimulationState)
//! and runs on its own thread:
//!
//! - **student**: one per student
//! - **course**: one per course
//! - **watchdog**: single sweeper for students stuck on closed courses
//! - **lab_monitor**: one per lab, reports exhaustion
//! - **clock_driver**: advances simulated time

pub mod clock_driver;
pub mod course;
pub mod lab_monitor;
pub mod student;
pub mod watchdog;

pub use clock_driver::run_clock_driver;
pub use course::{allocate_seats, renotify_waiting, scan_for_ta, CourseActor, CourseSummary, RoundOutcome, TaScan};
pub use lab_monitor::run_lab_monitor;
pub use student::{StudentActor, StudentOutcome};
pub use watchdog::{run_watchdog, sweep, WatchdogStats};
