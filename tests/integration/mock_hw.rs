//! Mock hardware adapter for integration tests.
//!
//! Serves scripted distance readings and records every actuator call so
//! tests can assert on the full command history without touching real
//! GPIO/PWM registers.

use sonar_sentry::app::events::AppEvent;
use sonar_sentry::app::ports::{BatteryPort, ClockPort, EventSink, RangePort, ServoPort, TonePort};
use sonar_sentry::app::service::Controller;
use sonar_sentry::control::{Channel, DistanceReading};

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwCall {
    StartTone { hz: u32, duration_ms: Option<u32> },
    StopTone,
    Attach,
    Detach,
    Pulse(u32),
    Settle(u32),
}

impl HwCall {
    pub fn is_tone(&self) -> bool {
        matches!(self, Self::StartTone { .. } | Self::StopTone)
    }
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub a: DistanceReading,
    pub b: DistanceReading,
    pub volts: f32,
    pub calls: Vec<(u64, HwCall)>,
    pub measurements: u32,
    /// Let `measure` and `settle` advance the clock the way the real
    /// echo waits and gap delay do.
    pub blocking: bool,
    now_ms: u64,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            a: DistanceReading::NoEcho,
            b: DistanceReading::NoEcho,
            volts: 7.4,
            calls: Vec::new(),
            measurements: 0,
            blocking: false,
            now_ms: 0,
        }
    }

    pub fn set_readings(&mut self, a: DistanceReading, b: DistanceReading) {
        self.a = a;
        self.b = b;
    }

    /// Tone calls recorded at or after `since_ms`.
    pub fn tone_calls_since(&self, since_ms: u64) -> Vec<HwCall> {
        self.calls
            .iter()
            .filter(|(t, c)| *t >= since_ms && c.is_tone())
            .map(|(_, c)| *c)
            .collect()
    }

    pub fn tone_calls(&self) -> Vec<HwCall> {
        self.tone_calls_since(0)
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn advance(&mut self, ms: u64) {
        if self.blocking {
            self.now_ms += ms;
        }
    }

    fn record(&mut self, call: HwCall) {
        self.calls.push((self.now_ms, call));
    }
}

impl RangePort for MockHardware {
    fn measure(&mut self, channel: Channel) -> DistanceReading {
        self.measurements += 1;
        let reading = match channel {
            Channel::A => self.a,
            Channel::B => self.b,
        };
        // An echo returns within a couple of ms; silence waits out the 30 ms timeout.
        self.advance(if reading == DistanceReading::NoEcho { 30 } else { 2 });
        reading
    }

    fn settle(&mut self, ms: u32) {
        self.record(HwCall::Settle(ms));
        self.advance(u64::from(ms));
    }
}

impl TonePort for MockHardware {
    fn start_tone(&mut self, frequency_hz: u32, duration_ms: Option<u32>, _now_ms: u64) {
        self.record(HwCall::StartTone {
            hz: frequency_hz,
            duration_ms,
        });
    }

    fn stop_tone(&mut self) {
        self.record(HwCall::StopTone);
    }
}

impl ServoPort for MockHardware {
    fn attach(&mut self) {
        self.record(HwCall::Attach);
    }

    fn detach(&mut self) {
        self.record(HwCall::Detach);
    }

    fn set_pulse_width_us(&mut self, width_us: u32) {
        self.record(HwCall::Pulse(width_us));
    }
}

impl ClockPort for MockHardware {
    fn uptime_ms(&self) -> u64 {
        self.now_ms
    }
}

impl BatteryPort for MockHardware {
    fn sample_voltage_volts(&mut self) -> f32 {
        self.volts
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<(u64, AppEvent)>,
    now_ms: u64,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            now_ms: 0,
        }
    }

    /// Events other than the per-cycle `Readings`.
    pub fn transitions(&self) -> Vec<AppEvent> {
        self.events
            .iter()
            .filter(|(_, e)| !matches!(e, AppEvent::Readings { .. }))
            .map(|(_, e)| *e)
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|(_, e)| pred(e)).count()
    }

    pub fn first_at(&self, pred: impl Fn(&AppEvent) -> bool) -> Option<u64> {
        self.events.iter().find(|(_, e)| pred(e)).map(|(t, _)| *t)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push((self.now_ms, *event));
    }
}

// ── Driving helpers ───────────────────────────────────────────

/// Tick the controller once per millisecond over `from..=to`.
pub fn run(
    ctrl: &mut Controller,
    hw: &mut MockHardware,
    sink: &mut RecordingSink,
    from: u64,
    to: u64,
) {
    for now in from..=to {
        hw.now_ms = now;
        sink.now_ms = now;
        ctrl.tick(now, hw, sink);
    }
}

/// Main-loop shape: one clock snapshot per iteration, then a 1 ms yield.
/// Time spent inside `measure`/`settle` (with `blocking` set) carries over.
pub fn run_blocking(
    ctrl: &mut Controller,
    hw: &mut MockHardware,
    sink: &mut RecordingSink,
    until_ms: u64,
) {
    while hw.now_ms <= until_ms {
        let now = hw.now_ms;
        sink.now_ms = now;
        ctrl.tick(now, hw, sink);
        hw.now_ms += 1;
    }
}

/// Start the controller at t=0.
pub fn start(ctrl: &mut Controller, hw: &mut MockHardware, sink: &mut RecordingSink) {
    hw.now_ms = 0;
    sink.now_ms = 0;
    ctrl.start(0, hw, sink);
}
