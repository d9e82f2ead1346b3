//! Clock driver: advances simulated time until the simulation completes

use crate::models::SimulationState;
use std::time::Duration;
use tracing::trace;

/// Advance the clock once per `tick_interval` of wall time
///
/// Stops as soon as both ledger counters are zero, or when shutdown is
/// requested. Returns the final simulated time.
pub fn run_clock_driver(state: &SimulationState, tick_interval: Duration) -> u64 {
    let tick_interval = tick_interval.max(Duration::from_millis(1));
    while !state.is_shutting_down() && !state.ledger().wait_complete_for(tick_interval) {
        let now = state.clock().advance();
        trace!(time = now, "clock advanced");
    }
    state.now()
}
