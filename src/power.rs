//! Battery monitoring.
//!
//! Samples the pack once at startup and then every `battery_interval_ms`.
//! A low reading is logged and reported as an event; nothing else in the
//! system reacts to it.

use log::warn;

use crate::app::events::AppEvent;
use crate::app::ports::{BatteryPort, EventSink};
use crate::config::SystemConfig;
use crate::scheduler::Interval;

pub struct BatteryMonitor {
    interval: Interval,
    low_threshold_volts: f32,
    last_volts: Option<f32>,
}

impl BatteryMonitor {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            interval: Interval::new(config.battery_interval_ms),
            low_threshold_volts: config.low_battery_volts,
            last_volts: None,
        }
    }

    /// Take a reading now and restart the interval.
    pub fn sample(&mut self, now_ms: u64, battery: &mut impl BatteryPort, sink: &mut impl EventSink) {
        self.interval.mark(now_ms);
        let volts = battery.sample_voltage_volts();
        let low = volts < self.low_threshold_volts;
        if low {
            warn!("battery low: {:.2} V (threshold {:.2} V)", volts, self.low_threshold_volts);
        }
        self.last_volts = Some(volts);
        sink.emit(&AppEvent::Battery { volts, low });
    }

    /// Sample if the interval has elapsed.
    pub fn poll(&mut self, now_ms: u64, battery: &mut impl BatteryPort, sink: &mut impl EventSink) -> bool {
        if !self.interval.is_due(now_ms) {
            return false;
        }
        self.sample(now_ms, battery, sink);
        true
    }

    pub fn last_volts(&self) -> Option<f32> {
        self.last_volts
    }

    pub fn is_low(&self) -> bool {
        self.last_volts.is_some_and(|v| v < self.low_threshold_volts)
    }
}
