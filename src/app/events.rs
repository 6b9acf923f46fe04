//! Outbound application events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port on state transitions. The
//! serial log adapter renders them; tests record them.

use crate::control::{BeepParams, DistanceReading, SensorId};

/// Structured events emitted by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// The controller has started; the servo is attached at `position_deg`.
    Started { position_deg: i16 },

    /// Raw per-channel readings from one sampling cycle.
    Readings {
        a: DistanceReading,
        b: DistanceReading,
    },

    /// Hysteresis committed a different sensor.
    SensorSwitched { from: SensorId, to: SensorId },

    /// Near-field: steady tone at the given pitch.
    SteadyTone { frequency_hz: u32 },

    /// A pulsed beep cycle started from idle or steady tone.
    BeepCycleStarted(BeepParams),

    /// No target: beeper silenced without a fade.
    Silenced,

    /// Tracked target lost mid-beep; closing sequence started.
    FadeOutStarted,

    /// Target returned before the closing sequence finished.
    FadeOutCancelled { at_step: u8 },

    /// Closing sequence ran to completion; speaker silent.
    FadeOutComplete,

    /// An object is within range; servo pulses stopped.
    ActuatorDetached { position_deg: i16 },

    /// Path is clear; servo re-asserted at its preserved position.
    ActuatorReattached { position_deg: i16 },

    /// Periodic battery sample.
    Battery { volts: f32, low: bool },
}
