//! Domain models for the course allocation simulator

pub mod course;
pub mod event;
pub mod ids;
pub mod lab;
pub mod ledger;
pub mod staffing;
pub mod state;
pub mod student;

// Re-exports
pub use course::Course;
pub use event::{Event, EventLog, NamedEvent};
pub use ids::{CourseId, LabId, StudentId, TaId};
pub use lab::{Lab, Ta, TaClaim, TaProbe, TaRelease};
pub use ledger::{Countdown, Ledger};
pub use staffing::StaffingBoard;
pub use state::SimulationState;
pub use student::{Student, StudentState, WakeOutcome, WakeReason, PREFERENCE_COUNT};
