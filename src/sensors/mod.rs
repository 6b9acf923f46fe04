//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns both ultrasonic channels and the delay used for the
//! inter-trigger gap. It never fails: a GPIO error on either channel is
//! logged and reported as "no echo" so one flaky line cannot stop the
//! control loop.

pub mod battery;
pub mod ultrasonic;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::control::{Channel, DistanceReading};
use crate::error::SensorError;
use ultrasonic::{Hcsr04, MicrosClock};

/// Anything that can produce one distance reading on demand.
pub trait Ranger {
    fn measure(&mut self) -> Result<DistanceReading, SensorError>;
}

impl<TRIG, ECHO, DELAY, CLOCK> Ranger for Hcsr04<TRIG, ECHO, DELAY, CLOCK>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    DELAY: DelayNs,
    CLOCK: MicrosClock,
{
    fn measure(&mut self) -> Result<DistanceReading, SensorError> {
        Hcsr04::measure(self)
    }
}

/// Both ranging channels plus the settle delay.
pub struct SensorHub<A, B, D> {
    sensor_a: A,
    sensor_b: B,
    delay: D,
    gpio_faults: u32,
}

impl<A: Ranger, B: Ranger, D: DelayNs> SensorHub<A, B, D> {
    pub fn new(sensor_a: A, sensor_b: B, delay: D) -> Self {
        Self {
            sensor_a,
            sensor_b,
            delay,
            gpio_faults: 0,
        }
    }

    pub fn measure(&mut self, channel: Channel) -> DistanceReading {
        let result = match channel {
            Channel::A => self.sensor_a.measure(),
            Channel::B => self.sensor_b.measure(),
        };
        match result {
            Ok(reading) => reading,
            Err(e) => {
                self.gpio_faults = self.gpio_faults.saturating_add(1);
                warn!("sensor {:?}: {} (reported as no echo)", channel, e);
                DistanceReading::NoEcho
            }
        }
    }

    pub fn settle(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Number of measurements folded into "no echo" because of a GPIO error.
    pub fn gpio_faults(&self) -> u32 {
        self.gpio_faults
    }
}
