//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (ultrasonic rangers, buzzer, servo, battery divider,
//! event sinks) implement these traits. The
//! [`Controller`](super::service::Controller) consumes them via generics,
//! so the decision loop never touches hardware directly.

use crate::control::{Channel, DistanceReading};

// ───────────────────────────────────────────────────────────────
// Range port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the two ultrasonic channels.
pub trait RangePort {
    /// Fire one trigger/echo exchange on `channel`.
    ///
    /// Blocks for at most the configured echo timeout. A timeout is
    /// reported as [`DistanceReading::NoEcho`], never as an error.
    fn measure(&mut self, channel: Channel) -> DistanceReading;

    /// Block for `ms` milliseconds between triggers so the second sensor
    /// does not hear the first sensor's ping.
    fn settle(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Tone port (driven adapter: domain → speaker)
// ───────────────────────────────────────────────────────────────

/// Speaker control.
pub trait TonePort {
    /// Start a square wave at `frequency_hz`. With `duration_ms` the tone
    /// stops on its own `duration_ms` after `now_ms`; without it the tone
    /// holds until [`stop_tone`].
    ///
    /// [`stop_tone`]: TonePort::stop_tone
    fn start_tone(&mut self, frequency_hz: u32, duration_ms: Option<u32>, now_ms: u64);

    /// Silence the speaker.
    fn stop_tone(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Servo port (driven adapter: domain → positional actuator)
// ───────────────────────────────────────────────────────────────

/// Positional actuator control.
pub trait ServoPort {
    /// Resume pulse output.
    fn attach(&mut self);

    /// Cease pulse output; the servo goes limp where it is.
    fn detach(&mut self);

    /// Command a pulse width. Callers pre-clamp to the safe range.
    fn set_pulse_width_us(&mut self, width_us: u32);
}

// ───────────────────────────────────────────────────────────────
// Battery port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait BatteryPort {
    /// Sample the pack voltage through the divider.
    fn sample_voltage_volts(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds, read fresh.
///
/// The loop hands every tick one snapshot, but sampling blocks for tens of
/// milliseconds. Deadlines armed after it are measured from this clock so
/// they do not start out already expired.
pub trait ClockPort {
    fn uptime_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, test
/// recorder, etc.). Presentation only: nothing in the control loop
/// depends on what the sink does.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`SystemConfig::validate`](crate::config::SystemConfig::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}
