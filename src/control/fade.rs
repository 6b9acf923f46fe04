//! Closing sequence played when a tracked target disappears.
//!
//! A short run of bounded beeps, each lower than the last, spaced
//! `fade_step_ms` apart. After the final beep's slot elapses the speaker is
//! explicitly stopped. The schedule is computed once from the config.

use heapless::Vec;

use crate::app::ports::TonePort;
use crate::config::{MAX_FADE_STEPS, SystemConfig};
use crate::scheduler::Deadline;

/// One beep of the closing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeStep {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeProgress {
    /// Not fading, or the next step is not due yet.
    Waiting,
    /// Played the step with this index.
    Stepped(u8),
    /// Sequence finished; speaker stopped.
    Complete,
}

pub struct FadeOutSequencer {
    schedule: Vec<FadeStep, MAX_FADE_STEPS>,
    step_ms: u32,
    active: bool,
    step_index: u8,
    next_step: Deadline,
}

impl FadeOutSequencer {
    pub fn new(config: &SystemConfig) -> Self {
        let duration_ms = config.fade_step_ms.saturating_sub(config.fade_gap_ms);
        let mut schedule = Vec::new();
        for i in 0..u32::from(config.fade_steps) {
            let frequency_hz = config
                .fade_start_hz
                .saturating_sub(i.saturating_mul(config.fade_step_hz));
            if schedule.push(FadeStep { frequency_hz, duration_ms }).is_err() {
                break;
            }
        }
        Self {
            schedule,
            step_ms: config.fade_step_ms,
            active: false,
            step_index: 0,
            next_step: Deadline::disarmed(),
        }
    }

    /// Start from step 0 with the first beep due at `now_ms`.
    pub fn begin(&mut self, now_ms: u64) {
        self.active = true;
        self.step_index = 0;
        self.next_step.arm(now_ms, 0);
    }

    /// Abort a running fade. Returns the step it was on, or `None` if idle.
    /// The speaker is left alone; the caller's next tone command replaces it.
    pub fn cancel(&mut self) -> Option<u8> {
        if !self.active {
            return None;
        }
        let at = self.step_index;
        self.reset();
        Some(at)
    }

    pub fn tick(&mut self, now_ms: u64, tone: &mut impl TonePort) -> FadeProgress {
        if !self.active || !self.next_step.reached(now_ms) {
            return FadeProgress::Waiting;
        }
        match self.schedule.get(usize::from(self.step_index)) {
            Some(step) => {
                tone.start_tone(step.frequency_hz, Some(step.duration_ms), now_ms);
                self.next_step.arm(now_ms, self.step_ms);
                let played = self.step_index;
                self.step_index += 1;
                FadeProgress::Stepped(played)
            }
            None => {
                tone.stop_tone();
                self.reset();
                FadeProgress::Complete
            }
        }
    }

    fn reset(&mut self) {
        self.active = false;
        self.step_index = 0;
        self.next_step.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn step_index(&self) -> u8 {
        self.step_index
    }

    pub fn schedule(&self) -> &[FadeStep] {
        &self.schedule
    }
}
