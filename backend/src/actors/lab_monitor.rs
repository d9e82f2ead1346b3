//! Lab monitor: reacts once to a lab's exhaustion signal

use crate::models::{Event, LabId, SimulationState};

/// Block until the lab runs out of eligible TAs or is closed
///
/// Emits `LabExhausted` in the first case. The wait is predicate-guarded,
/// so a signal fired before the monitor starts is still observed.
pub fn run_lab_monitor(state: &SimulationState, lab: LabId) -> bool {
    let exhausted = state.lab(lab).wait_exhausted();
    if exhausted {
        state.emit(Event::LabExhausted {
            time: state.now(),
            lab,
        });
    }
    exhausted
}
