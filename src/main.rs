//! SonarSentry Firmware: main entry point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter                    LogEventSink   Esp32Time   │
//! │  (Range + Tone + Servo + Battery)   (EventSink)    (clock)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  arbiter · cadence · fade · sweep · battery            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use log::info;

use sonar_sentry::adapters::hardware::HardwareAdapter;
use sonar_sentry::adapters::log_sink::LogEventSink;
use sonar_sentry::adapters::time::Esp32TimeAdapter;
use sonar_sentry::app::service::Controller;
use sonar_sentry::config::SystemConfig;
use sonar_sentry::drivers::hw_init;
use sonar_sentry::drivers::servo::ServoDriver;
use sonar_sentry::drivers::tone::ToneDriver;
use sonar_sentry::error::Error;
use sonar_sentry::pins;
use sonar_sentry::sensors::SensorHub;
use sonar_sentry::sensors::battery::BatterySense;
use sonar_sentry::sensors::ultrasonic::Hcsr04;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SonarSentry v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config.validate().map_err(Error::from)?;
    info!("Config: {}", serde_json::to_string(&config)?);
    info!(
        "Sampling blocks for at most {} ms every {} ms",
        config.sampling_latency_ms(),
        config.sample_interval_ms
    );

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;
    let peripherals = Peripherals::take()?;
    let clock = Esp32TimeAdapter::new();

    let sensor_a = Hcsr04::new(
        PinDriver::output(peripherals.pins.gpio10)?,
        PinDriver::input(peripherals.pins.gpio11)?,
        Ets,
        clock,
        config.echo_timeout_us,
        config.echo_us_per_cm,
    );
    let sensor_b = Hcsr04::new(
        PinDriver::output(peripherals.pins.gpio2)?,
        PinDriver::input(peripherals.pins.gpio3)?,
        Ets,
        clock,
        config.echo_timeout_us,
        config.echo_us_per_cm,
    );
    info!(
        "HC-SR04 A on trig={} echo={}, B on trig={} echo={}",
        pins::TRIG_A_GPIO,
        pins::ECHO_A_GPIO,
        pins::TRIG_B_GPIO,
        pins::ECHO_B_GPIO
    );

    let mut hw = HardwareAdapter::new(
        SensorHub::new(sensor_a, sensor_b, FreeRtos),
        ToneDriver::new(),
        ServoDriver::new(config.servo_min_pulse_us, config.servo_max_pulse_us),
        BatterySense::new(pins::BATTERY_ADC_CHANNEL, &config),
        clock,
    );
    let mut log_sink = LogEventSink::new();

    // ── 4. Controller ─────────────────────────────────────────
    let mut controller = Controller::new(config);
    controller.start(clock.uptime_ms(), &mut hw, &mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();
        hw.poll(now_ms);
        controller.tick(now_ms, &mut hw, &mut log_sink);
        FreeRtos::delay_ms(1);
    }
}
