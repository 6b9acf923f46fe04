//! HC-SR04 ultrasonic ranger.
//!
//! A 10 µs trigger pulse makes the module emit a burst and raise its echo
//! line for the round-trip time of the first reflection. The driver times
//! that high level against a monotonic microsecond clock.
//!
//! The whole exchange (stale echo drain, rising edge, falling edge) shares
//! one timeout budget, so a single `measure()` never blocks longer than
//! `timeout_us` plus the 12 µs trigger.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::control::DistanceReading;
use crate::error::SensorError;

/// Monotonic microsecond clock used to time echo pulses.
pub trait MicrosClock {
    fn now_us(&self) -> u64;
}

pub struct Hcsr04<TRIG, ECHO, DELAY, CLOCK> {
    trigger: TRIG,
    echo: ECHO,
    delay: DELAY,
    clock: CLOCK,
    timeout_us: u32,
    us_per_cm: f32,
}

impl<TRIG, ECHO, DELAY, CLOCK> Hcsr04<TRIG, ECHO, DELAY, CLOCK>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    DELAY: DelayNs,
    CLOCK: MicrosClock,
{
    pub fn new(
        trigger: TRIG,
        echo: ECHO,
        delay: DELAY,
        clock: CLOCK,
        timeout_us: u32,
        us_per_cm: f32,
    ) -> Self {
        Self {
            trigger,
            echo,
            delay,
            clock,
            timeout_us,
            us_per_cm,
        }
    }

    /// One trigger/echo exchange.
    pub fn measure(&mut self) -> Result<DistanceReading, SensorError> {
        self.fire_trigger()?;

        let start = self.clock.now_us();
        while self.echo_high()? {
            if self.expired(start) {
                return Ok(DistanceReading::NoEcho);
            }
        }
        while !self.echo_high()? {
            if self.expired(start) {
                return Ok(DistanceReading::NoEcho);
            }
        }
        let rise = self.clock.now_us();
        while self.echo_high()? {
            if self.expired(start) {
                return Ok(DistanceReading::NoEcho);
            }
        }
        let width = self.clock.now_us().saturating_sub(rise);
        let width = u32::try_from(width).unwrap_or(u32::MAX);
        Ok(DistanceReading::from_echo_us(width, self.us_per_cm))
    }

    fn fire_trigger(&mut self) -> Result<(), SensorError> {
        self.trigger.set_low().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_us(2);
        self.trigger.set_high().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_us(10);
        self.trigger.set_low().map_err(|_| SensorError::GpioFailed)
    }

    fn echo_high(&mut self) -> Result<bool, SensorError> {
        self.echo.is_high().map_err(|_| SensorError::GpioFailed)
    }

    fn expired(&self, start_us: u64) -> bool {
        self.clock.now_us().saturating_sub(start_us) >= u64::from(self.timeout_us)
    }
}
