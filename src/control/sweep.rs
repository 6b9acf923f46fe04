//! Back-and-forth servo sweep.
//!
//! The sweep advances a fixed step every `servo_step_interval_ms` and bounces
//! off both bounds. While an object is close the servo is detached (no
//! pulses) and the position is frozen; on clear it is reattached at the same
//! position rather than re-centred.

use crate::app::ports::ServoPort;
use crate::config::SystemConfig;
use crate::scheduler::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepTransition {
    Detached(i16),
    Reattached(i16),
}

pub struct ActuatorSweeper {
    position: i16,
    direction: i16,
    min_deg: i16,
    max_deg: i16,
    step_deg: i16,
    interval: Interval,
    min_pulse_us: u32,
    max_pulse_us: u32,
    us_per_deg: f32,
    detached: bool,
}

impl ActuatorSweeper {
    pub fn new(config: &SystemConfig) -> Self {
        let min_deg = config.servo_pos_min_deg;
        let max_deg = config.servo_pos_max_deg;
        let span_us = config.servo_max_pulse_us.saturating_sub(config.servo_min_pulse_us);
        Self {
            position: min_deg + (max_deg - min_deg) / 2,
            direction: 1,
            min_deg,
            max_deg,
            step_deg: config.servo_step_deg,
            interval: Interval::new(config.servo_step_interval_ms),
            min_pulse_us: config.servo_min_pulse_us,
            max_pulse_us: config.servo_max_pulse_us,
            us_per_deg: span_us as f32 / config.servo_travel_deg,
            detached: false,
        }
    }

    /// Pulse width for `position_deg`, clamped to the servo's safe range.
    pub fn pulse_width_us(&self, position_deg: i16) -> u32 {
        let width = self.min_pulse_us as f32 + f32::from(position_deg) * self.us_per_deg;
        (width.max(0.0) as u32).clamp(self.min_pulse_us, self.max_pulse_us)
    }

    /// Attach and hold the current position.
    pub fn start(&mut self, now_ms: u64, servo: &mut impl ServoPort) {
        servo.attach();
        servo.set_pulse_width_us(self.pulse_width_us(self.position));
        self.detached = false;
        self.interval.mark(now_ms);
    }

    /// Take one step if attached and due. Returns the new position.
    pub fn tick(&mut self, now_ms: u64, servo: &mut impl ServoPort) -> Option<i16> {
        if self.detached || !self.interval.poll(now_ms) {
            return None;
        }
        self.advance();
        servo.set_pulse_width_us(self.pulse_width_us(self.position));
        Some(self.position)
    }

    fn advance(&mut self) {
        self.position += self.direction * self.step_deg;
        if self.position >= self.max_deg {
            self.position = self.max_deg;
            self.direction = -1;
        } else if self.position <= self.min_deg {
            self.position = self.min_deg;
            self.direction = 1;
        }
    }

    /// Feed the raw proximity verdict. Acts only on a change.
    pub fn set_object_close(
        &mut self,
        close: bool,
        servo: &mut impl ServoPort,
    ) -> Option<SweepTransition> {
        match (close, self.detached) {
            (true, false) => {
                servo.detach();
                self.detached = true;
                Some(SweepTransition::Detached(self.position))
            }
            (false, true) => {
                servo.attach();
                servo.set_pulse_width_us(self.pulse_width_us(self.position));
                self.detached = false;
                Some(SweepTransition::Reattached(self.position))
            }
            _ => None,
        }
    }

    pub fn position(&self) -> i16 {
        self.position
    }

    pub fn direction(&self) -> i16 {
        self.direction
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }
}
