//! Simulation time

pub mod clock;

pub use clock::SimClock;
