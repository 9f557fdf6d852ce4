//! Control core: sample debounce and the held fan command.

pub mod debounce;
pub mod hold;

pub use debounce::{DebounceParams, SensorState};
pub use hold::ActuatorState;
