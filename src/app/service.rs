//! Application service: the hexagonal core.
//!
//! [`Controller`] owns the configuration and every piece of decision state.
//! All I/O flows through port traits injected at call sites, making the
//! whole loop testable with mock adapters.
//!
//! ```text
//!    RangePort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  BatteryPort ──▶ │          Controller          │
//!     TonePort ◀── │ arbiter · cadence · fade ·   │
//!    ServoPort ◀── │ sweep · battery              │
//!                  └──────────────────────────────┘
//! ```
//!
//! One tick, with a single `now_ms` snapshot:
//!
//! 1. sampling + decision (when the sampling interval is due)
//! 2. beep toggle (suppressed while fading)
//! 3. fade step
//! 4. sweep step (only while attached)
//! 5. battery poll (when due)
//!
//! The sampling step blocks on the echo waits, so the beep and fade
//! deadlines it arms are taken from a fresh [`ClockPort`] reading instead
//! of the stale snapshot.

use log::info;

use crate::config::SystemConfig;
use crate::control::arbiter::any_within;
use crate::control::{
    ActuatorSweeper, BeepCadenceEngine, BeepParams, CadenceMode, CadenceUpdate, Channel,
    DistanceReading, FadeOutSequencer, FadeProgress, SensorArbiter, SensorId, SweepTransition,
};
use crate::power::BatteryMonitor;
use crate::scheduler::Interval;

use super::events::AppEvent;
use super::ports::{BatteryPort, ClockPort, EventSink, RangePort, ServoPort, TonePort};

/// Every hardware port the controller drives, as one bound.
pub trait ControllerPorts: RangePort + TonePort + ServoPort + BatteryPort + ClockPort {}

impl<T: RangePort + TonePort + ServoPort + BatteryPort + ClockPort> ControllerPorts for T {}

// ───────────────────────────────────────────────────────────────
// State aggregate
// ───────────────────────────────────────────────────────────────

/// All mutable decision state. Mutated only from [`Controller::tick`].
pub struct ControllerState {
    pub sampling: Interval,
    pub arbiter: SensorArbiter,
    pub cadence: BeepCadenceEngine,
    pub fade: FadeOutSequencer,
    pub sweep: ActuatorSweeper,
    pub battery: BatteryMonitor,
    pub last_readings: Option<(DistanceReading, DistanceReading)>,
}

impl ControllerState {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            sampling: Interval::new(config.sample_interval_ms),
            arbiter: SensorArbiter::new(config),
            cadence: BeepCadenceEngine::new(config),
            fade: FadeOutSequencer::new(config),
            sweep: ActuatorSweeper::new(config),
            battery: BatteryMonitor::new(config),
            last_readings: None,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller {
    config: SystemConfig,
    state: ControllerState,
}

impl Controller {
    /// Construct from a validated configuration. Does not touch hardware;
    /// call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let state = ControllerState::new(&config);
        Self { config, state }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Attach the servo at its centre position and take the startup
    /// battery reading.
    pub fn start(&mut self, now_ms: u64, hw: &mut impl ControllerPorts, sink: &mut impl EventSink) {
        let s = &mut self.state;
        s.sampling.mark(now_ms);
        s.sweep.start(now_ms, hw);
        sink.emit(&AppEvent::Started {
            position_deg: s.sweep.position(),
        });
        s.battery.sample(now_ms, hw, sink);
        info!(
            "Controller started: ceiling={}cm hysteresis={} servo={}\u{00b0}",
            self.config.max_detect_cm,
            self.config.hysteresis_count,
            s.sweep.position()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Drain all due work for this loop iteration.
    ///
    /// `hw` satisfies every hardware port at once; this avoids multiple
    /// mutable borrows while keeping the port boundary explicit.
    pub fn tick(&mut self, now_ms: u64, hw: &mut impl ControllerPorts, sink: &mut impl EventSink) {
        if self.state.sampling.poll(now_ms) {
            self.sample_and_decide(now_ms, hw, sink);
        }

        let s = &mut self.state;
        if !s.fade.is_active() {
            s.cadence.toggle(now_ms, hw);
        }

        if s.fade.tick(now_ms, hw) == FadeProgress::Complete {
            info!("Fade-out complete, silent");
            sink.emit(&AppEvent::FadeOutComplete);
        }

        s.sweep.tick(now_ms, hw);

        s.battery.poll(now_ms, hw, sink);
    }

    /// Read both channels, arbitrate, and update beeper and servo.
    fn sample_and_decide(
        &mut self,
        now_ms: u64,
        hw: &mut impl ControllerPorts,
        sink: &mut impl EventSink,
    ) {
        let a = hw.measure(Channel::A);
        hw.settle(self.config.inter_trigger_gap_ms);
        let b = hw.measure(Channel::B);
        sink.emit(&AppEvent::Readings { a, b });

        // Measuring blocked; anything armed from here on starts now.
        let decided_ms = hw.uptime_ms().max(now_ms);

        let s = &mut self.state;
        s.last_readings = Some((a, b));

        match s.arbiter.arbitrate(a, b) {
            Some(arb) => {
                if let Some(at_step) = s.fade.cancel() {
                    info!("Object returned, fade-out cancelled at step {}", at_step);
                    sink.emit(&AppEvent::FadeOutCancelled { at_step });
                }
                if let Some(from) = arb.switched_from {
                    info!("Switched to {:?}", arb.committed);
                    sink.emit(&AppEvent::SensorSwitched {
                        from,
                        to: arb.committed,
                    });
                }
                if let Some(cm) = arb.active_cm {
                    match s.cadence.update(cm, decided_ms, hw) {
                        CadenceUpdate::SteadyTone(frequency_hz) => {
                            sink.emit(&AppEvent::SteadyTone { frequency_hz });
                        }
                        CadenceUpdate::CycleStarted(params) => {
                            sink.emit(&AppEvent::BeepCycleStarted(params));
                        }
                        CadenceUpdate::Deferred(_) | CadenceUpdate::Unchanged => {}
                    }
                }
            }
            None => self.on_target_lost(decided_ms, hw, sink),
        }

        let close = any_within(a, b, self.config.max_detect_cm);
        match self.state.sweep.set_object_close(close, hw) {
            Some(SweepTransition::Detached(position_deg)) => {
                info!("Detaching servo (object close)");
                sink.emit(&AppEvent::ActuatorDetached { position_deg });
            }
            Some(SweepTransition::Reattached(position_deg)) => {
                info!("Reattaching servo (clear)");
                sink.emit(&AppEvent::ActuatorReattached { position_deg });
            }
            None => {}
        }
    }

    /// Nothing within the ceiling on either channel.
    fn on_target_lost(&mut self, now_ms: u64, hw: &mut impl ControllerPorts, sink: &mut impl EventSink) {
        let s = &mut self.state;
        if s.fade.is_active() {
            return;
        }
        if s.cadence.is_sounding() && self.config.fade_on_target_loss {
            s.cadence.clear();
            s.fade.begin(now_ms);
            info!("Target lost, fading out");
            sink.emit(&AppEvent::FadeOutStarted);
        } else if s.cadence.silence(hw) {
            info!("No object detected, silencing");
            sink.emit(&AppEvent::Silenced);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn committed_sensor(&self) -> SensorId {
        self.state.arbiter.state().committed
    }

    pub fn candidate_sensor(&self) -> SensorId {
        self.state.arbiter.state().candidate
    }

    pub fn cadence_mode(&self) -> CadenceMode {
        self.state.cadence.mode()
    }

    pub fn beep_params(&self) -> Option<BeepParams> {
        self.state.cadence.params()
    }

    pub fn is_fading(&self) -> bool {
        self.state.fade.is_active()
    }

    pub fn servo_position(&self) -> i16 {
        self.state.sweep.position()
    }

    pub fn servo_detached(&self) -> bool {
        self.state.sweep.is_detached()
    }

    pub fn last_readings(&self) -> Option<(DistanceReading, DistanceReading)> {
        self.state.last_readings
    }

    pub fn battery_volts(&self) -> Option<f32> {
        self.state.battery.last_volts()
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }
}
