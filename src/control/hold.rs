//! Fan command with a minimum hold time
//!
//! Any moving sensor turns the fan on and re-arms the hold timer.  Once
//! every sensor is quiet the previous command is held until the timer
//! has run down, then the fan is released.

use core::time::Duration;

use super::debounce::SensorState;

/// Aggregated actuator state carried between control cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorState {
    pub commanded: bool,
    pub hold_remaining: Duration,
}

/// Decide the fan command for this cycle.
///
/// `elapsed` is the time since the previous decision; it is charged
/// against the hold timer only while no sensor reports motion.
pub fn decide<'a>(
    states: impl IntoIterator<Item = &'a SensorState>,
    actuator: ActuatorState,
    hold: Duration,
    elapsed: Duration,
) -> (bool, ActuatorState) {
    if states.into_iter().any(|s| s.motion) {
        let next = ActuatorState {
            commanded: true,
            hold_remaining: hold,
        };
        return (true, next);
    }

    if actuator.hold_remaining > Duration::ZERO {
        let next = ActuatorState {
            commanded: actuator.commanded,
            hold_remaining: actuator.hold_remaining.saturating_sub(elapsed),
        };
        return (actuator.commanded, next);
    }

    (false, ActuatorState::default())
}
