//! End-to-end controller scenarios against the mock adapters.
//!
//! Time starts at 0 and advances 1 ms per tick. With the default config the
//! sensors are sampled at 120, 240, 360, ... ms.

use crate::mock_hw::{HwCall, MockHardware, RecordingSink, run, run_blocking, start};

use sonar_sentry::app::events::AppEvent;
use sonar_sentry::app::service::Controller;
use sonar_sentry::config::SystemConfig;
use sonar_sentry::control::{BeepMapping, BeepParams, CadenceMode, DistanceReading, SensorId};

use DistanceReading::{Cm, NoEcho};

fn make(config: SystemConfig) -> (Controller, MockHardware, RecordingSink) {
    let mut ctrl = Controller::new(config);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    start(&mut ctrl, &mut hw, &mut sink);
    (ctrl, hw, sink)
}

fn start_tone(hz: u32, duration_ms: Option<u32>) -> HwCall {
    HwCall::StartTone { hz, duration_ms }
}

/// Commit sensor A at 30 cm (third sample, t=360).
fn committed_at_30cm() -> (Controller, MockHardware, RecordingSink) {
    let (mut ctrl, mut hw, mut sink) = make(SystemConfig::default());
    hw.set_readings(Cm(30), NoEcho);
    run(&mut ctrl, &mut hw, &mut sink, 1, 479);
    assert_eq!(ctrl.committed_sensor(), SensorId::SensorA);
    (ctrl, hw, sink)
}

// ── Startup ──────────────────────────────────────────────────

#[test]
fn start_centres_servo_and_reads_battery() {
    let (ctrl, hw, sink) = make(SystemConfig::default());
    assert_eq!(ctrl.servo_position(), 175);
    assert!(!ctrl.servo_detached());
    assert_eq!(hw.calls[0], (0, HwCall::Attach));
    assert_eq!(hw.calls[1], (0, HwCall::Pulse(1796)));
    assert_eq!(
        sink.transitions(),
        vec![
            AppEvent::Started { position_deg: 175 },
            AppEvent::Battery { volts: 7.4, low: false },
        ]
    );
    assert_eq!(ctrl.cadence_mode(), CadenceMode::Idle);
}

#[test]
fn samples_both_channels_with_gap_on_interval() {
    let (mut ctrl, mut hw, mut sink) = make(SystemConfig::default());
    run(&mut ctrl, &mut hw, &mut sink, 1, 119);
    assert_eq!(hw.measurements, 0);
    run(&mut ctrl, &mut hw, &mut sink, 120, 120);
    assert_eq!(hw.measurements, 2);
    assert!(hw.calls.contains(&(120, HwCall::Settle(40))));
    assert_eq!(ctrl.last_readings(), Some((NoEcho, NoEcho)));
    run(&mut ctrl, &mut hw, &mut sink, 121, 480);
    assert_eq!(hw.measurements, 8);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Readings { .. })), 4);
}

// ── Arbitration ──────────────────────────────────────────────

#[test]
fn beeping_waits_for_hysteresis_then_starts_cycle() {
    let (mut ctrl, mut hw, mut sink) = make(SystemConfig::default());
    hw.set_readings(Cm(30), NoEcho);

    run(&mut ctrl, &mut hw, &mut sink, 1, 359);
    assert_eq!(ctrl.candidate_sensor(), SensorId::SensorA);
    assert_eq!(ctrl.committed_sensor(), SensorId::None);
    assert!(hw.tone_calls().is_empty());

    run(&mut ctrl, &mut hw, &mut sink, 360, 360);
    assert_eq!(ctrl.committed_sensor(), SensorId::SensorA);
    let params = BeepParams { frequency_hz: 1014, on_ms: 83, off_ms: 146 };
    assert_eq!(ctrl.beep_params(), Some(params));
    assert_eq!(hw.tone_calls(), vec![start_tone(1014, None)]);
    assert!(sink.transitions().contains(&AppEvent::SensorSwitched {
        from: SensorId::None,
        to: SensorId::SensorA,
    }));
    assert!(sink.transitions().contains(&AppEvent::BeepCycleStarted(params)));
}

#[test]
fn pulsed_cycle_toggles_on_its_own_deadlines() {
    let (mut ctrl, mut hw, mut sink) = make(SystemConfig::default());
    hw.set_readings(Cm(30), NoEcho);
    run(&mut ctrl, &mut hw, &mut sink, 1, 650);
    // on at 360, off at 443, on at 589
    let toggles: Vec<(u64, HwCall)> =
        hw.calls.iter().filter(|(_, c)| c.is_tone()).copied().collect();
    assert_eq!(
        toggles,
        vec![
            (360, start_tone(1014, None)),
            (443, HwCall::StopTone),
            (589, start_tone(1014, None)),
        ]
    );
}

#[test]
fn readings_beyond_ceiling_are_no_target() {
    let (mut ctrl, mut hw, mut sink) = make(SystemConfig::default());
    hw.set_readings(Cm(61), Cm(200));
    run(&mut ctrl, &mut hw, &mut sink, 1, 1000);
    assert_eq!(ctrl.candidate_sensor(), SensorId::None);
    assert!(hw.tone_calls().is_empty());
    assert!(!ctrl.servo_detached());
}

#[test]
fn single_sample_blip_does_not_switch() {
    let (mut ctrl, mut hw, mut sink) = committed_at_30cm();
    hw.set_readings(Cm(40), Cm(20));
    run(&mut ctrl, &mut hw, &mut sink, 480, 480);
    assert_eq!(ctrl.candidate_sensor(), SensorId::SensorB);
    assert_eq!(ctrl.committed_sensor(), SensorId::SensorA);
    hw.set_readings(Cm(30), Cm(40));
    run(&mut ctrl, &mut hw, &mut sink, 481, 1000);
    assert_eq!(ctrl.committed_sensor(), SensorId::SensorA);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SensorSwitched { .. })),
        1,
        "only the initial commit"
    );
}

#[test]
fn sustained_closer_sensor_takes_over() {
    let (mut ctrl, mut hw, mut sink) = committed_at_30cm();
    hw.set_readings(Cm(40), Cm(20));
    run(&mut ctrl, &mut hw, &mut sink, 480, 719);
    assert_eq!(ctrl.committed_sensor(), SensorId::SensorA);
    run(&mut ctrl, &mut hw, &mut sink, 720, 720);
    assert_eq!(ctrl.committed_sensor(), SensorId::SensorB);
    assert_eq!(
        sink.first_at(|e| *e == AppEvent::SensorSwitched {
            from: SensorId::SensorA,
            to: SensorId::SensorB,
        }),
        Some(720)
    );
}

#[test]
fn closer_reading_on_committed_sensor_keeps_it_and_updates_params() {
    let config = SystemConfig::default();
    let mapping = BeepMapping::new(&config);
    let (mut ctrl, mut hw, mut sink) = make(config);
    hw.set_readings(Cm(55), Cm(58));
    run(&mut ctrl, &mut hw, &mut sink, 1, 360);
    assert_eq!(ctrl.committed_sensor(), SensorId::SensorA);
    assert_eq!(ctrl.beep_params(), Some(mapping.params(55)));

    hw.set_readings(Cm(12), Cm(58));
    run(&mut ctrl, &mut hw, &mut sink, 361, 480);
    assert_eq!(ctrl.committed_sensor(), SensorId::SensorA);
    assert_eq!(ctrl.beep_params(), Some(mapping.params(12)));

    run(&mut ctrl, &mut hw, &mut sink, 481, 720);
    assert_eq!(ctrl.committed_sensor(), SensorId::SensorA);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SensorSwitched { .. })), 1);
}

// ── Target loss ──────────────────────────────────────────────

#[test]
fn loss_resets_arbitration_on_the_same_sample() {
    let (mut ctrl, mut hw, mut sink) = committed_at_30cm();
    hw.set_readings(NoEcho, Cm(70));
    run(&mut ctrl, &mut hw, &mut sink, 480, 480);
    assert_eq!(ctrl.committed_sensor(), SensorId::None);
    assert_eq!(ctrl.candidate_sensor(), SensorId::None);
    assert_eq!(ctrl.cadence_mode(), CadenceMode::Idle);
    assert!(ctrl.is_fading());
}

#[test]
fn fade_out_plays_descending_steps_then_stops() {
    let (mut ctrl, mut hw, mut sink) = committed_at_30cm();
    hw.set_readings(NoEcho, NoEcho);
    run(&mut ctrl, &mut hw, &mut sink, 480, 1200);

    assert_eq!(
        hw.tone_calls_since(480),
        vec![
            start_tone(1200, Some(80)),
            start_tone(1000, Some(80)),
            start_tone(800, Some(80)),
            start_tone(600, Some(80)),
            HwCall::StopTone,
        ]
    );
    let steps: Vec<u64> = hw
        .calls
        .iter()
        .filter(|(t, c)| *t >= 480 && c.is_tone())
        .map(|(t, _)| *t)
        .collect();
    assert_eq!(steps, vec![480, 580, 680, 780, 880]);

    assert_eq!(sink.first_at(|e| *e == AppEvent::FadeOutStarted), Some(480));
    assert_eq!(sink.first_at(|e| *e == AppEvent::FadeOutComplete), Some(880));
    assert_eq!(sink.count(|e| *e == AppEvent::FadeOutComplete), 1);
    assert!(!ctrl.is_fading());
    assert_eq!(ctrl.cadence_mode(), CadenceMode::Idle);
}

#[test]
fn returning_target_cancels_fade() {
    let (mut ctrl, mut hw, mut sink) = committed_at_30cm();
    hw.set_readings(NoEcho, NoEcho);
    run(&mut ctrl, &mut hw, &mut sink, 480, 599);
    hw.set_readings(Cm(30), NoEcho);
    run(&mut ctrl, &mut hw, &mut sink, 600, 600);

    assert!(!ctrl.is_fading());
    assert!(sink.transitions().contains(&AppEvent::FadeOutCancelled { at_step: 2 }));

    // Remaining fade steps never play; the beep restarts once re-committed.
    run(&mut ctrl, &mut hw, &mut sink, 601, 900);
    assert_eq!(
        hw.tone_calls_since(480),
        vec![
            start_tone(1200, Some(80)),
            start_tone(1000, Some(80)),
            start_tone(1014, None),
        ]
    );
    assert_eq!(sink.first_at(|e| matches!(e, AppEvent::BeepCycleStarted(_))), Some(360));
    assert_eq!(ctrl.committed_sensor(), SensorId::SensorA);
    assert_eq!(ctrl.cadence_mode(), CadenceMode::Pulsed);
}

#[test]
fn loss_without_fade_silences_immediately() {
    let config = SystemConfig {
        fade_on_target_loss: false,
        ..SystemConfig::default()
    };
    let (mut ctrl, mut hw, mut sink) = make(config);
    hw.set_readings(Cm(30), NoEcho);
    run(&mut ctrl, &mut hw, &mut sink, 1, 479);
    hw.set_readings(NoEcho, NoEcho);
    run(&mut ctrl, &mut hw, &mut sink, 480, 1000);

    assert_eq!(hw.tone_calls_since(480), vec![HwCall::StopTone]);
    assert_eq!(sink.first_at(|e| *e == AppEvent::Silenced), Some(480));
    assert_eq!(sink.count(|e| *e == AppEvent::Silenced), 1);
    assert!(!ctrl.is_fading());
}

#[test]
fn nothing_to_silence_when_idle() {
    let (mut ctrl, mut hw, mut sink) = make(SystemConfig::default());
    run(&mut ctrl, &mut hw, &mut sink, 1, 1000);
    assert!(hw.tone_calls().is_empty());
    assert_eq!(sink.count(|e| *e == AppEvent::Silenced), 0);
    assert_eq!(sink.count(|e| *e == AppEvent::FadeOutStarted), 0);
}

// ── Continuous tone ──────────────────────────────────────────

#[test]
fn near_field_holds_one_steady_tone() {
    let (mut ctrl, mut hw, mut sink) = make(SystemConfig::default());
    hw.set_readings(Cm(4), Cm(50));
    run(&mut ctrl, &mut hw, &mut sink, 1, 1500);

    assert_eq!(ctrl.cadence_mode(), CadenceMode::Continuous);
    assert_eq!(
        hw.tone_calls(),
        vec![HwCall::StopTone, start_tone(1373, None)]
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SteadyTone { .. })), 1);
}

#[test]
fn leaving_near_field_restarts_pulsed_cycle() {
    let (mut ctrl, mut hw, mut sink) = make(SystemConfig::default());
    hw.set_readings(Cm(4), NoEcho);
    run(&mut ctrl, &mut hw, &mut sink, 1, 479);
    hw.set_readings(Cm(30), NoEcho);
    run(&mut ctrl, &mut hw, &mut sink, 480, 480);
    assert_eq!(ctrl.cadence_mode(), CadenceMode::Pulsed);
    assert_eq!(hw.tone_calls_since(480), vec![start_tone(1014, None)]);
}

#[test]
fn moving_target_defers_new_params_to_next_toggle() {
    let (mut ctrl, mut hw, mut sink) = committed_at_30cm();
    // Tone went on at 360 and off at 443; the off phase runs until 589.
    hw.set_readings(Cm(10), NoEcho);
    run(&mut ctrl, &mut hw, &mut sink, 480, 480);
    let near = BeepParams { frequency_hz: 1290, on_ms: 45, off_ms: 70 };
    assert_eq!(ctrl.beep_params(), Some(near));
    assert!(hw.tone_calls_since(480).is_empty(), "running phase is not restarted");

    // Off phase started at 443 with the old 146 ms; next on at 589 uses the new pitch.
    run(&mut ctrl, &mut hw, &mut sink, 481, 589);
    assert_eq!(hw.tone_calls_since(480), vec![start_tone(1290, None)]);
}

// ── Servo ────────────────────────────────────────────────────

#[test]
fn sweep_steps_every_interval_while_clear() {
    let (mut ctrl, mut hw, mut sink) = make(SystemConfig::default());
    run(&mut ctrl, &mut hw, &mut sink, 1, 100);
    assert_eq!(ctrl.servo_position(), 185);
}

#[test]
fn object_close_detaches_without_waiting_for_hysteresis() {
    let (mut ctrl, mut hw, mut sink) = make(SystemConfig::default());
    hw.set_readings(NoEcho, Cm(45));
    run(&mut ctrl, &mut hw, &mut sink, 1, 120);

    assert!(ctrl.servo_detached());
    assert_eq!(ctrl.committed_sensor(), SensorId::None);
    let frozen = ctrl.servo_position();
    assert_eq!(
        sink.first_at(|e| *e == AppEvent::ActuatorDetached { position_deg: frozen }),
        Some(120)
    );

    run(&mut ctrl, &mut hw, &mut sink, 121, 1000);
    assert_eq!(ctrl.servo_position(), frozen);
    assert!(!hw.calls.iter().any(|(t, c)| *t > 120 && matches!(c, HwCall::Pulse(_))));
}

#[test]
fn clear_path_reattaches_at_preserved_position() {
    let (mut ctrl, mut hw, mut sink) = make(SystemConfig::default());
    hw.set_readings(Cm(45), NoEcho);
    run(&mut ctrl, &mut hw, &mut sink, 1, 239);
    let frozen = ctrl.servo_position();
    hw.set_readings(NoEcho, NoEcho);
    run(&mut ctrl, &mut hw, &mut sink, 240, 240);

    assert!(!ctrl.servo_detached());
    assert!(sink.transitions().contains(&AppEvent::ActuatorReattached { position_deg: frozen }));

    let after: Vec<HwCall> = hw
        .calls
        .iter()
        .filter(|(t, c)| *t == 240 && !matches!(c, HwCall::Settle(_)) && !c.is_tone())
        .map(|(_, c)| *c)
        .collect();
    let expected = ctrl.state().sweep.pulse_width_us(frozen);
    assert_eq!(after[0], HwCall::Attach);
    assert_eq!(after[1], HwCall::Pulse(expected));
}

// ── Battery ──────────────────────────────────────────────────

#[test]
fn battery_polled_every_ten_seconds() {
    let (mut ctrl, mut hw, mut sink) = make(SystemConfig::default());
    hw.volts = 4.3;
    run(&mut ctrl, &mut hw, &mut sink, 1, 20_000);
    let batt: Vec<(u64, AppEvent)> = sink
        .events
        .iter()
        .filter(|(_, e)| matches!(e, AppEvent::Battery { .. }))
        .copied()
        .collect();
    assert_eq!(
        batt,
        vec![
            (0, AppEvent::Battery { volts: 7.4, low: false }),
            (10_000, AppEvent::Battery { volts: 4.3, low: true }),
            (20_000, AppEvent::Battery { volts: 4.3, low: true }),
        ]
    );
    assert_eq!(ctrl.battery_volts(), Some(4.3));
}

// ── Blocking sample timing ───────────────────────────────────

#[test]
fn deadlines_armed_after_blocking_sample_keep_their_length() {
    let config = SystemConfig::default();
    let near = BeepMapping::new(&config).params(8);
    let (mut ctrl, mut hw, mut sink) = make(config);
    hw.blocking = true;
    hw.set_readings(Cm(8), NoEcho);

    // Third sample starts at 360 and returns at 360 + 2 + 40 + 30.
    run_blocking(&mut ctrl, &mut hw, &mut sink, 599);
    let beeps: Vec<(u64, HwCall)> =
        hw.calls.iter().filter(|(_, c)| c.is_tone()).copied().collect();
    assert_eq!(beeps[0], (432, start_tone(near.frequency_hz, None)));
    assert_eq!(beeps[1], (432 + u64::from(near.on_ms), HwCall::StopTone));

    // Loss sample starts at 600 and returns at 700.
    hw.set_readings(NoEcho, NoEcho);
    run_blocking(&mut ctrl, &mut hw, &mut sink, 1300);
    let fade: Vec<(u64, HwCall)> = hw
        .calls
        .iter()
        .filter(|(t, c)| *t >= 700 && c.is_tone())
        .copied()
        .collect();
    assert_eq!(
        fade.iter().map(|(_, c)| *c).collect::<Vec<_>>(),
        vec![
            start_tone(1200, Some(80)),
            start_tone(1000, Some(80)),
            start_tone(800, Some(80)),
            start_tone(600, Some(80)),
            HwCall::StopTone,
        ]
    );
    assert_eq!(fade[0].0, 701, "first step plays on the tick after the sample");
    for pair in fade.windows(2) {
        assert!(pair[1].0 - pair[0].0 >= 100, "step cut short: {pair:?}");
    }
}
