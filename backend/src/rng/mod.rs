//! Seedable random number generation
//!
//! Uses the xorshift64* algorithm. All randomness in the simulator goes
//! through this module.

mod xorshift;

pub use xorshift::RngManager;
