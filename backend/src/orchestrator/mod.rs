//! Orchestrator - builds the simulation and runs its actors
//!
//! See `engine.rs` for the run loop, `config.rs` for the roster format and
//! `report.rs` for the end-of-run snapshot.

pub mod config;
pub mod engine;
pub mod report;

// Re-export main types for convenience
pub use config::{ConfigError, CourseConfig, LabConfig, SimulationConfig, StudentConfig, TimingConfig};
pub use engine::{Orchestrator, SimulationError};
pub use report::{CourseReport, LabReport, SimulationReport, StudentReport, TaReport};
