//! Serial-log rendering of controller events.
//!
//! Each [`AppEvent`] becomes one tagged line on the `log` facade, which the
//! binary routes to the USB-CDC console.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// [`EventSink`] that writes one log line per event.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { position_deg } => {
                info!("START | servo at {}\u{00b0}", position_deg);
            }
            AppEvent::Readings { a, b } => {
                debug!("RANGE | A={} B={}", a, b);
            }
            AppEvent::SensorSwitched { from, to } => {
                info!("SENSOR | {:?} -> {:?}", from, to);
            }
            AppEvent::SteadyTone { frequency_hz } => {
                info!("BEEP | steady {} Hz", frequency_hz);
            }
            AppEvent::BeepCycleStarted(p) => {
                info!(
                    "BEEP | pulsed {} Hz on={}ms off={}ms",
                    p.frequency_hz, p.on_ms, p.off_ms
                );
            }
            AppEvent::Silenced => {
                info!("BEEP | silenced");
            }
            AppEvent::FadeOutStarted => {
                info!("FADE | target lost, fading out");
            }
            AppEvent::FadeOutCancelled { at_step } => {
                info!("FADE | cancelled at step {}, target back", at_step);
            }
            AppEvent::FadeOutComplete => {
                info!("FADE | complete");
            }
            AppEvent::ActuatorDetached { position_deg } => {
                info!("SERVO | object close, detached at {}\u{00b0}", position_deg);
            }
            AppEvent::ActuatorReattached { position_deg } => {
                info!("SERVO | clear, reattached at {}\u{00b0}", position_deg);
            }
            AppEvent::Battery { volts, low: false } => {
                info!("BATT | {:.2} V", volts);
            }
            AppEvent::Battery { volts, low: true } => {
                warn!("BATT | {:.2} V LOW", volts);
            }
        }
    }
}
