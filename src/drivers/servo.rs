//! Hobby servo driver on LEDC channel 1.
//!
//! 50 Hz frame, 14-bit duty. A pulse width in microseconds maps to
//! `width * 2^14 / 20_000` counts. Detaching writes zero duty so the servo
//! receives no pulses and goes limp; the last commanded width is kept and
//! re-asserted on attach.

use crate::drivers::hw_init;
use crate::pins;

const FRAME_US: u32 = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;
const FULL_SCALE: u32 = 1 << pins::SERVO_PWM_RESOLUTION_BITS;

pub struct ServoDriver {
    min_pulse_us: u32,
    max_pulse_us: u32,
    width_us: u32,
    attached: bool,
}

impl ServoDriver {
    pub fn new(min_pulse_us: u32, max_pulse_us: u32) -> Self {
        Self {
            min_pulse_us,
            max_pulse_us,
            width_us: min_pulse_us,
            attached: false,
        }
    }

    pub fn attach(&mut self) {
        self.attached = true;
        self.write_hw();
    }

    pub fn detach(&mut self) {
        self.attached = false;
        hw_init::ledc_set_duty(hw_init::LEDC_CH_SERVO, 0);
    }

    /// Clamped to the range given at construction.
    pub fn set_pulse_width_us(&mut self, width_us: u32) {
        self.width_us = width_us.clamp(self.min_pulse_us, self.max_pulse_us);
        if self.attached {
            self.write_hw();
        }
    }

    fn write_hw(&self) {
        hw_init::ledc_set_duty(hw_init::LEDC_CH_SERVO, duty_counts(self.width_us));
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn pulse_width_us(&self) -> u32 {
        self.width_us
    }
}

fn duty_counts(width_us: u32) -> u32 {
    width_us.min(FRAME_US) * FULL_SCALE / FRAME_US
}
