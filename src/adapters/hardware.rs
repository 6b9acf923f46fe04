//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`], the speaker and servo drivers and the battery
//! divider, exposing them through [`RangePort`], [`TonePort`],
//! [`ServoPort`], [`BatteryPort`] and [`ClockPort`]. This is the only module in the system
//! that touches actual hardware. On non-espidf targets the underlying
//! drivers use cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;
use log::warn;

use crate::adapters::time::Esp32TimeAdapter;
use crate::app::ports::{BatteryPort, ClockPort, RangePort, ServoPort, TonePort};
use crate::control::{Channel, DistanceReading};
use crate::drivers::servo::ServoDriver;
use crate::drivers::tone::ToneDriver;
use crate::sensors::battery::BatterySense;
use crate::sensors::{Ranger, SensorHub};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<A, B, D> {
    sensor_hub: SensorHub<A, B, D>,
    tone: ToneDriver,
    servo: ServoDriver,
    battery: BatterySense,
    clock: Esp32TimeAdapter,
    last_battery_volts: f32,
}

impl<A: Ranger, B: Ranger, D: DelayNs> HardwareAdapter<A, B, D> {
    pub fn new(
        sensor_hub: SensorHub<A, B, D>,
        tone: ToneDriver,
        servo: ServoDriver,
        battery: BatterySense,
        clock: Esp32TimeAdapter,
    ) -> Self {
        Self {
            sensor_hub,
            tone,
            servo,
            battery,
            clock,
            last_battery_volts: 0.0,
        }
    }

    /// Housekeeping the drivers need every loop iteration: ends bounded
    /// tones whose time is up.
    pub fn poll(&mut self, now_ms: u64) {
        self.tone.poll(now_ms);
    }

    pub fn tone(&self) -> &ToneDriver {
        &self.tone
    }

    pub fn servo(&self) -> &ServoDriver {
        &self.servo
    }
}

// ── RangePort implementation ──────────────────────────────────

impl<A: Ranger, B: Ranger, D: DelayNs> RangePort for HardwareAdapter<A, B, D> {
    fn measure(&mut self, channel: Channel) -> DistanceReading {
        self.sensor_hub.measure(channel)
    }

    fn settle(&mut self, ms: u32) {
        self.sensor_hub.settle(ms);
    }
}

// ── TonePort implementation ───────────────────────────────────

impl<A: Ranger, B: Ranger, D: DelayNs> TonePort for HardwareAdapter<A, B, D> {
    fn start_tone(&mut self, frequency_hz: u32, duration_ms: Option<u32>, now_ms: u64) {
        if let Err(e) = self.tone.start(frequency_hz, duration_ms, now_ms) {
            warn!("tone {} Hz: {}", frequency_hz, e);
        }
    }

    fn stop_tone(&mut self) {
        self.tone.stop();
    }
}

// ── ClockPort implementation ──────────────────────────────────

impl<A: Ranger, B: Ranger, D: DelayNs> ClockPort for HardwareAdapter<A, B, D> {
    fn uptime_ms(&self) -> u64 {
        self.clock.uptime_ms()
    }
}

// ── ServoPort implementation ──────────────────────────────────

impl<A: Ranger, B: Ranger, D: DelayNs> ServoPort for HardwareAdapter<A, B, D> {
    fn attach(&mut self) {
        self.servo.attach();
    }

    fn detach(&mut self) {
        self.servo.detach();
    }

    fn set_pulse_width_us(&mut self, width_us: u32) {
        self.servo.set_pulse_width_us(width_us);
    }
}

// ── BatteryPort implementation ────────────────────────────────

impl<A: Ranger, B: Ranger, D: DelayNs> BatteryPort for HardwareAdapter<A, B, D> {
    /// A failed ADC read repeats the last good value.
    fn sample_voltage_volts(&mut self) -> f32 {
        match self.battery.read() {
            Ok(r) => {
                self.last_battery_volts = r.volts;
                r.volts
            }
            Err(e) => {
                warn!("battery: {}", e);
                self.last_battery_volts
            }
        }
    }
}
