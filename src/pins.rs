//! GPIO / peripheral pin assignments for the SonarSentry rig.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Ultrasonic rangers (HC-SR04)
// ---------------------------------------------------------------------------

/// Sensor A trigger (digital output, 10 µs pulse).
pub const TRIG_A_GPIO: i32 = 10;
/// Sensor A echo (digital input, high for the round-trip time).
pub const ECHO_A_GPIO: i32 = 11;
/// Sensor B trigger.
pub const TRIG_B_GPIO: i32 = 2;
/// Sensor B echo.
pub const ECHO_B_GPIO: i32 = 3;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Positional servo signal (LEDC, 50 Hz).
pub const SERVO_PWM_GPIO: i32 = 12;
/// Piezo speaker (LEDC, square wave at the tone frequency).
pub const SPEAKER_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Battery divider (ADC1)
// ---------------------------------------------------------------------------

/// Pack voltage through a 100k / 47k divider. ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const BATTERY_ADC_CHANNEL: u32 = 0;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// Servo timer resolution (bits). 14-bit gives ~1.2 µs per count at 50 Hz.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// Speaker timer resolution (bits). The duty is fixed at 50 %.
pub const SPEAKER_PWM_RESOLUTION_BITS: u32 = 10;
/// Speaker timer frequency before the first tone is requested.
pub const SPEAKER_IDLE_FREQ_HZ: u32 = 1_000;
