//! Fuzz target: `Controller::tick`
//!
//! Each input byte pair is one sampling cycle's readings (0xFF = no echo,
//! anything else is centimetres). The controller is ticked every millisecond
//! between samples and must uphold:
//! - No panics under any reading sequence
//! - Servo position stays within its configured bounds
//! - No servo pulses are written while detached
//! - A committed sensor only appears while a target is in range
//!
//! cargo fuzz run fuzz_controller

#![no_main]

use libfuzzer_sys::fuzz_target;
use sonar_sentry::app::events::AppEvent;
use sonar_sentry::app::ports::{BatteryPort, ClockPort, EventSink, RangePort, ServoPort, TonePort};
use sonar_sentry::app::service::Controller;
use sonar_sentry::config::SystemConfig;
use sonar_sentry::control::{Channel, DistanceReading, SensorId};

#[derive(Default)]
struct FuzzHw {
    a: Option<u16>,
    b: Option<u16>,
    attached: bool,
    pulses_while_detached: u32,
    now_ms: u64,
}

fn reading(v: Option<u16>) -> DistanceReading {
    v.map_or(DistanceReading::NoEcho, DistanceReading::Cm)
}

impl RangePort for FuzzHw {
    fn measure(&mut self, channel: Channel) -> DistanceReading {
        match channel {
            Channel::A => reading(self.a),
            Channel::B => reading(self.b),
        }
    }

    fn settle(&mut self, _ms: u32) {}
}

impl TonePort for FuzzHw {
    fn start_tone(&mut self, frequency_hz: u32, _duration_ms: Option<u32>, _now_ms: u64) {
        assert!(frequency_hz > 0, "zero-frequency tone requested");
    }

    fn stop_tone(&mut self) {}
}

impl ServoPort for FuzzHw {
    fn attach(&mut self) {
        self.attached = true;
    }

    fn detach(&mut self) {
        self.attached = false;
    }

    fn set_pulse_width_us(&mut self, _width_us: u32) {
        if !self.attached {
            self.pulses_while_detached += 1;
        }
    }
}

impl ClockPort for FuzzHw {
    fn uptime_ms(&self) -> u64 {
        self.now_ms
    }
}

impl BatteryPort for FuzzHw {
    fn sample_voltage_volts(&mut self) -> f32 {
        7.4
    }
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fn decode(byte: u8) -> Option<u16> {
    (byte != 0xFF).then_some(u16::from(byte))
}

fuzz_target!(|data: &[u8]| {
    let config = SystemConfig::default();
    let ceiling = config.max_detect_cm;
    let period = u64::from(config.sample_interval_ms);
    let (pos_min, pos_max) = (config.servo_pos_min_deg, config.servo_pos_max_deg);
    let mut ctrl = Controller::new(config);
    let mut hw = FuzzHw::default();
    let mut sink = NullSink;
    ctrl.start(0, &mut hw, &mut sink);

    let mut now = 0u64;
    for pair in data.chunks_exact(2).take(256) {
        hw.a = decode(pair[0]);
        hw.b = decode(pair[1]);
        for _ in 0..period {
            now += 1;
            hw.now_ms = now;
            ctrl.tick(now, &mut hw, &mut sink);

            let pos = ctrl.servo_position();
            assert!((pos_min..=pos_max).contains(&pos));
            assert_eq!(hw.pulses_while_detached, 0, "pulse written while detached");
        }

        let in_range = [hw.a, hw.b].iter().flatten().any(|&cm| cm <= ceiling);
        if !in_range {
            assert_eq!(ctrl.committed_sensor(), SensorId::None);
        }
    }
});
