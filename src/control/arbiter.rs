//! Closest-sensor arbitration with hysteresis.
//!
//! Each sampling cycle yields one reading per channel. The arbiter picks
//! the instantaneous *candidate* (closest valid reading, ties to A) and
//! only *commits* to a different sensor after the candidate has won
//! `hysteresis_count` consecutive cycles. This keeps the beeper from
//! chattering between sensors when both see the target at nearly the same
//! distance.
//!
//! Proximity gating for the servo deliberately does not go through the
//! committed sensor: see [`any_within`].

use core::fmt;

use crate::config::SystemConfig;

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Physical ultrasonic channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    A,
    B,
}

/// One ranging result. Captured once per cycle per channel; immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceReading {
    /// Echo received; distance rounded to the nearest centimetre.
    Cm(u16),
    /// Timeout or zero-width echo: nothing in front of the sensor.
    NoEcho,
}

impl DistanceReading {
    /// Convert an echo high-time to a reading. Zero means no echo.
    pub fn from_echo_us(echo_us: u32, us_per_cm: f32) -> Self {
        if echo_us == 0 {
            return Self::NoEcho;
        }
        let cm = (echo_us as f32 / us_per_cm + 0.5) as u32;
        Self::Cm(cm.min(u32::from(u16::MAX)) as u16)
    }

    pub fn cm(self) -> Option<u16> {
        match self {
            Self::Cm(cm) => Some(cm),
            Self::NoEcho => None,
        }
    }

    /// The distance, if an echo came back from within `ceiling_cm`.
    pub fn within(self, ceiling_cm: u16) -> Option<u16> {
        self.cm().filter(|&cm| cm <= ceiling_cm)
    }
}

impl fmt::Display for DistanceReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cm(cm) => write!(f, "{cm} cm"),
            Self::NoEcho => write!(f, "no echo"),
        }
    }
}

/// True if either channel sees something within the ceiling.
pub fn any_within(a: DistanceReading, b: DistanceReading, ceiling_cm: u16) -> bool {
    a.within(ceiling_cm).is_some() || b.within(ceiling_cm).is_some()
}

// ---------------------------------------------------------------------------
// Arbitration
// ---------------------------------------------------------------------------

/// Arbitration outcome: which physical sensor is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorId {
    #[default]
    None,
    SensorA,
    SensorB,
}

impl From<Channel> for SensorId {
    fn from(ch: Channel) -> Self {
        match ch {
            Channel::A => Self::SensorA,
            Channel::B => Self::SensorB,
        }
    }
}

/// Hysteresis bookkeeping. Persists across cycles.
///
/// `committed` only changes when `candidate_streak` reaches the threshold.
/// The streak restarts whenever the candidate changes and is zero whenever
/// the candidate matches the committed sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArbitrationState {
    pub candidate: SensorId,
    pub candidate_streak: u8,
    pub committed: SensorId,
}

/// Result of one cycle with a target present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arbitration {
    pub candidate: SensorId,
    pub committed: SensorId,
    /// Previously committed sensor, when this cycle switched.
    pub switched_from: Option<SensorId>,
    /// Distance seen by the committed sensor, capped at the ceiling.
    /// `None` while nothing is committed yet.
    pub active_cm: Option<u16>,
}

pub struct SensorArbiter {
    ceiling_cm: u16,
    hysteresis_count: u8,
    state: ArbitrationState,
}

impl SensorArbiter {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            ceiling_cm: config.max_detect_cm,
            hysteresis_count: config.hysteresis_count.max(1),
            state: ArbitrationState::default(),
        }
    }

    /// Run one arbitration cycle.
    ///
    /// Returns `None` when neither reading is within the ceiling; the state
    /// is then reset to its empty form on the spot.
    pub fn arbitrate(&mut self, a: DistanceReading, b: DistanceReading) -> Option<Arbitration> {
        let Some(candidate) = self.candidate(a, b) else {
            self.reset();
            return None;
        };

        let mut switched_from = None;
        if candidate == self.state.committed {
            self.state.candidate_streak = 0;
        } else {
            if candidate != self.state.candidate {
                self.state.candidate_streak = 0;
            }
            self.state.candidate_streak = self.state.candidate_streak.saturating_add(1);
            if self.state.candidate_streak >= self.hysteresis_count {
                switched_from = Some(self.state.committed);
                self.state.committed = candidate;
                self.state.candidate_streak = 0;
            }
        }
        self.state.candidate = candidate;

        let committed_reading = match self.state.committed {
            SensorId::SensorA => Some(a),
            SensorId::SensorB => Some(b),
            SensorId::None => None,
        };
        // A committed sensor that lost its echo this cycle reads as the
        // far edge of the range until hysteresis hands over.
        let active_cm = committed_reading
            .map(|r| r.cm().map_or(self.ceiling_cm, |cm| cm.min(self.ceiling_cm)));

        Some(Arbitration {
            candidate,
            committed: self.state.committed,
            switched_from,
            active_cm,
        })
    }

    /// Closest valid sensor this cycle; ties go to A.
    pub fn candidate(&self, a: DistanceReading, b: DistanceReading) -> Option<SensorId> {
        match (a.within(self.ceiling_cm), b.within(self.ceiling_cm)) {
            (Some(da), Some(db)) if da <= db => Some(SensorId::SensorA),
            (Some(_), Some(_)) => Some(SensorId::SensorB),
            (Some(_), None) => Some(SensorId::SensorA),
            (None, Some(_)) => Some(SensorId::SensorB),
            (None, None) => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = ArbitrationState::default();
    }

    pub fn state(&self) -> ArbitrationState {
        self.state
    }

    pub fn committed(&self) -> SensorId {
        self.state.committed
    }
}
