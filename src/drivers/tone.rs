//! Piezo speaker driver.
//!
//! Square wave on LEDC channel 0: the timer frequency sets the pitch and
//! the duty is held at 50 % while sounding. A bounded tone remembers its
//! stop time and is silenced by [`ToneDriver::poll`], which the main loop
//! calls every iteration.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: retunes the LEDC timer and writes the duty via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::error::ActuatorError;
use crate::pins;
use crate::scheduler::Deadline;

const HALF_DUTY: u32 = 1 << (pins::SPEAKER_PWM_RESOLUTION_BITS - 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneState {
    Silent,
    Sounding { frequency_hz: u32, stop_at: Deadline },
}

pub struct ToneDriver {
    state: ToneState,
}

impl Default for ToneDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneDriver {
    pub fn new() -> Self {
        Self {
            state: ToneState::Silent,
        }
    }

    /// Sound `frequency_hz`, replacing whatever was playing. With
    /// `duration_ms` the tone ends on the first `poll` at or past
    /// `now_ms + duration_ms`. A pitch the timer cannot produce leaves the
    /// speaker silent.
    pub fn start(
        &mut self,
        frequency_hz: u32,
        duration_ms: Option<u32>,
        now_ms: u64,
    ) -> Result<(), ActuatorError> {
        if frequency_hz == 0 {
            self.stop();
            return Ok(());
        }
        if !hw_init::ledc_set_speaker_freq(frequency_hz) {
            self.stop();
            return Err(ActuatorError::PwmWriteFailed);
        }
        hw_init::ledc_set_duty(hw_init::LEDC_CH_SPEAKER, HALF_DUTY);

        let mut stop_at = Deadline::disarmed();
        if let Some(ms) = duration_ms {
            stop_at.arm(now_ms, ms);
        }
        self.state = ToneState::Sounding {
            frequency_hz,
            stop_at,
        };
        Ok(())
    }

    pub fn stop(&mut self) {
        hw_init::ledc_set_duty(hw_init::LEDC_CH_SPEAKER, 0);
        self.state = ToneState::Silent;
    }

    /// End a bounded tone whose time is up. Returns true if it stopped one.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.state {
            ToneState::Sounding { stop_at, .. } if stop_at.reached(now_ms) => {
                self.stop();
                true
            }
            _ => false,
        }
    }

    pub fn state(&self) -> ToneState {
        self.state
    }

    pub fn is_sounding(&self) -> bool {
        !matches!(self.state, ToneState::Silent)
    }

    pub fn frequency_hz(&self) -> Option<u32> {
        match self.state {
            ToneState::Sounding { frequency_hz, .. } => Some(frequency_hz),
            ToneState::Silent => None,
        }
    }
}
