//! Distance-driven beep cadence.
//!
//! Two audible regimes:
//!
//! - **Continuous**: at or below `continuous_tone_cm` the speaker holds a
//!   steady tone at the near-field pitch.
//! - **Pulsed**: further out the speaker alternates on/off. Pitch falls
//!   and both durations grow linearly with distance.
//!
//! While pulsing, new parameters are stored but the running on/off phase
//! keeps its deadline; the change lands at the next toggle. This keeps a
//! moving target from restarting the beep every sampling cycle.

use crate::app::ports::TonePort;
use crate::config::SystemConfig;
use crate::scheduler::Deadline;

/// Timing and pitch of one pulsed beep cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeepParams {
    pub frequency_hz: u32,
    pub on_ms: u32,
    pub off_ms: u32,
}

/// Integer linear interpolation, truncating toward zero.
fn map_range(x: i64, in_min: i64, in_max: i64, out_min: i64, out_max: i64) -> i64 {
    if in_max == in_min {
        return out_min;
    }
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Distance → [`BeepParams`] mapping.
#[derive(Debug, Clone, Copy)]
pub struct BeepMapping {
    min_cm: u16,
    max_cm: u16,
    continuous_cm: u16,
    freq_hz: (u32, u32),
    on_ms: (u32, u32),
    off_ms: (u32, u32),
}

impl BeepMapping {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            min_cm: config.min_detect_cm,
            max_cm: config.max_detect_cm,
            continuous_cm: config.continuous_tone_cm,
            freq_hz: (config.freq_near_hz, config.freq_far_hz),
            on_ms: (config.on_near_ms, config.on_far_ms),
            off_ms: (config.off_near_ms, config.off_far_ms),
        }
    }

    /// Parameters for `cm`, clamped into the mapped range first.
    pub fn params(&self, cm: u16) -> BeepParams {
        let d = i64::from(cm.clamp(self.min_cm, self.max_cm));
        let lerp = |(near, far): (u32, u32)| {
            map_range(
                d,
                i64::from(self.min_cm),
                i64::from(self.max_cm),
                i64::from(near),
                i64::from(far),
            )
            .max(0) as u32
        };
        BeepParams {
            frequency_hz: lerp(self.freq_hz),
            on_ms: lerp(self.on_ms),
            off_ms: lerp(self.off_ms),
        }
    }

    pub fn is_near_field(&self, cm: u16) -> bool {
        cm <= self.continuous_cm
    }
}

/// Externally visible cadence regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceMode {
    Idle,
    Pulsed,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Pulsed { tone_on: bool, next_toggle: Deadline },
    Continuous { frequency_hz: u32 },
}

/// What [`BeepCadenceEngine::update`] did to the speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceUpdate {
    /// Nothing changed.
    Unchanged,
    /// Entered (or re-pitched) the steady tone.
    SteadyTone(u32),
    /// Started a fresh pulsed cycle with the tone on.
    CycleStarted(BeepParams),
    /// Stored new parameters; they take effect at the next toggle.
    Deferred(BeepParams),
}

pub struct BeepCadenceEngine {
    mapping: BeepMapping,
    params: Option<BeepParams>,
    phase: Phase,
}

impl BeepCadenceEngine {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            mapping: BeepMapping::new(config),
            params: None,
            phase: Phase::Idle,
        }
    }

    /// Apply the active distance for this cycle.
    pub fn update(&mut self, cm: u16, now_ms: u64, tone: &mut impl TonePort) -> CadenceUpdate {
        let desired = self.mapping.params(cm);

        if self.mapping.is_near_field(cm) {
            if self.phase == (Phase::Continuous { frequency_hz: desired.frequency_hz }) {
                return CadenceUpdate::Unchanged;
            }
            tone.stop_tone();
            tone.start_tone(desired.frequency_hz, None, now_ms);
            self.phase = Phase::Continuous {
                frequency_hz: desired.frequency_hz,
            };
            self.params = Some(desired);
            return CadenceUpdate::SteadyTone(desired.frequency_hz);
        }

        match self.phase {
            Phase::Pulsed { .. } => {
                if self.params == Some(desired) {
                    CadenceUpdate::Unchanged
                } else {
                    self.params = Some(desired);
                    CadenceUpdate::Deferred(desired)
                }
            }
            Phase::Idle | Phase::Continuous { .. } => {
                self.params = Some(desired);
                tone.start_tone(desired.frequency_hz, None, now_ms);
                let mut next_toggle = Deadline::disarmed();
                next_toggle.arm(now_ms, desired.on_ms);
                self.phase = Phase::Pulsed {
                    tone_on: true,
                    next_toggle,
                };
                CadenceUpdate::CycleStarted(desired)
            }
        }
    }

    /// Flip the pulsed tone when its deadline is reached. Returns true on a
    /// flip. Does nothing outside the pulsed regime.
    pub fn toggle(&mut self, now_ms: u64, tone: &mut impl TonePort) -> bool {
        let Phase::Pulsed {
            tone_on,
            next_toggle,
        } = &mut self.phase
        else {
            return false;
        };
        let Some(params) = self.params else {
            return false;
        };
        if !next_toggle.reached(now_ms) {
            return false;
        }
        if *tone_on {
            tone.stop_tone();
            next_toggle.arm(now_ms, params.off_ms);
        } else {
            tone.start_tone(params.frequency_hz, None, now_ms);
            next_toggle.arm(now_ms, params.on_ms);
        }
        *tone_on = !*tone_on;
        true
    }

    /// Stop the speaker if the cadence was sounding and go idle. Returns
    /// true if a stop was issued.
    pub fn silence(&mut self, tone: &mut impl TonePort) -> bool {
        let was_sounding = self.is_sounding();
        if was_sounding {
            tone.stop_tone();
        }
        self.clear();
        was_sounding
    }

    /// Forget the cadence without touching the speaker. Used when the fade
    /// takes over the tone output.
    pub fn clear(&mut self) {
        self.phase = Phase::Idle;
        self.params = None;
    }

    pub fn mode(&self) -> CadenceMode {
        match self.phase {
            Phase::Idle => CadenceMode::Idle,
            Phase::Pulsed { .. } => CadenceMode::Pulsed,
            Phase::Continuous { .. } => CadenceMode::Continuous,
        }
    }

    pub fn is_sounding(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn params(&self) -> Option<BeepParams> {
        self.params
    }

    /// Whether the speaker is currently driven by the cadence.
    pub fn is_tone_on(&self) -> bool {
        match self.phase {
            Phase::Idle => false,
            Phase::Pulsed { tone_on, .. } => tone_on,
            Phase::Continuous { .. } => true,
        }
    }

    pub fn next_toggle_ms(&self) -> Option<u64> {
        match self.phase {
            Phase::Pulsed { next_toggle, .. } => next_toggle.at_ms(),
            _ => None,
        }
    }

    pub fn mapping(&self) -> &BeepMapping {
        &self.mapping
    }
}
