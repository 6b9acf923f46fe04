//! The decision loop's building blocks.
//!
//! Each piece is a plain state machine that reads the per-tick clock
//! snapshot and, where it drives hardware, a port trait:
//!
//! | Module    | Role                                              |
//! |-----------|---------------------------------------------------|
//! | `arbiter` | closest-sensor selection with hysteresis          |
//! | `cadence` | distance → beep timing, pulsed / steady regimes   |
//! | `fade`    | descending-pitch closing sequence on target loss  |
//! | `sweep`   | back-and-forth servo sweep, proximity detach      |

pub mod arbiter;
pub mod cadence;
pub mod fade;
pub mod sweep;

pub use arbiter::{Arbitration, ArbitrationState, Channel, DistanceReading, SensorArbiter, SensorId};
pub use cadence::{BeepCadenceEngine, BeepMapping, BeepParams, CadenceMode, CadenceUpdate};
pub use fade::{FadeOutSequencer, FadeProgress, FadeStep};
pub use sweep::{ActuatorSweeper, SweepTransition};
