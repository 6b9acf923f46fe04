//! System configuration parameters
//!
//! All tunable parameters for the SonarSentry rig. Values are fixed at
//! startup; there is no persistence and no runtime reload.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Upper bound on fade-out steps; the fade schedule lives in a fixed-capacity
/// buffer sized by this constant.
pub const MAX_FADE_STEPS: usize = 8;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Sampling ---
    /// Time between dual-sensor sampling cycles (milliseconds)
    pub sample_interval_ms: u32,
    /// Pause between triggering sensor A and sensor B (acoustic crosstalk)
    pub inter_trigger_gap_ms: u32,
    /// Upper bound on a single echo wait (microseconds)
    pub echo_timeout_us: u32,
    /// Round-trip echo time per centimetre (speed-of-sound divisor)
    pub echo_us_per_cm: f32,

    // --- Detection ---
    /// Closest distance the beep mapping distinguishes (cm)
    pub min_detect_cm: u16,
    /// Detection ceiling: readings above this count as "no target" (cm)
    pub max_detect_cm: u16,
    /// Consecutive ticks a new candidate must win before it is committed
    pub hysteresis_count: u8,
    /// At or below this distance the beeper holds a steady tone (cm)
    pub continuous_tone_cm: u16,

    // --- Beep mapping (near value first, far value second) ---
    pub freq_near_hz: u32,
    pub freq_far_hz: u32,
    pub on_near_ms: u32,
    pub on_far_ms: u32,
    pub off_near_ms: u32,
    pub off_far_ms: u32,

    // --- Fade-out ---
    /// Fade after losing a tracked target; `false` silences immediately
    pub fade_on_target_loss: bool,
    pub fade_steps: u8,
    /// Interval between fade beeps (milliseconds)
    pub fade_step_ms: u32,
    /// Silence left at the end of each fade beep (milliseconds)
    pub fade_gap_ms: u32,
    pub fade_start_hz: u32,
    /// Pitch drop per fade step (Hz)
    pub fade_step_hz: u32,

    // --- Servo sweep ---
    pub servo_step_interval_ms: u32,
    /// Degrees advanced per sweep step
    pub servo_step_deg: i16,
    pub servo_pos_min_deg: i16,
    pub servo_pos_max_deg: i16,
    /// Shortest pulse the servo accepts (microseconds)
    pub servo_min_pulse_us: u32,
    /// Longest pulse the servo accepts (microseconds)
    pub servo_max_pulse_us: u32,
    /// Mechanical travel covered by the pulse range (degrees)
    pub servo_travel_deg: f32,

    // --- Battery ---
    pub battery_interval_ms: u32,
    /// Pack voltage below which a low-battery warning is logged
    pub low_battery_volts: f32,
    /// Divider output / pack voltage
    pub battery_divider_ratio: f32,
    /// ADC full-scale reference voltage
    pub adc_reference_volts: f32,
    /// ADC count at full scale
    pub adc_full_scale: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Sampling
            sample_interval_ms: 120,
            inter_trigger_gap_ms: 40,
            echo_timeout_us: 30_000,
            echo_us_per_cm: 58.0,

            // Detection
            min_detect_cm: 2,
            max_detect_cm: 60,
            hysteresis_count: 3,
            continuous_tone_cm: 5,

            // Beep mapping: closer => higher pitch, shorter on/off
            freq_near_hz: 1400,
            freq_far_hz: 600,
            on_near_ms: 30,
            on_far_ms: 140,
            off_near_ms: 40,
            off_far_ms: 260,

            // Fade-out
            fade_on_target_loss: true,
            fade_steps: 4,
            fade_step_ms: 100,
            fade_gap_ms: 20,
            fade_start_hz: 1200,
            fade_step_hz: 200,

            // Servo
            servo_step_interval_ms: 20,
            servo_step_deg: 2,
            servo_pos_min_deg: 90,
            servo_pos_max_deg: 260,
            servo_min_pulse_us: 500,
            servo_max_pulse_us: 2500,
            servo_travel_deg: 270.0,

            // Battery
            battery_interval_ms: 10_000,
            low_battery_volts: 4.5,
            battery_divider_ratio: 47.0 / 147.0,
            adc_reference_volts: 3.3,
            adc_full_scale: 4095,
        }
    }
}

impl SystemConfig {
    /// Worst-case time the sampling step blocks the loop (milliseconds).
    /// Saturates at `u32::MAX`, which no sampling interval can satisfy.
    pub fn sampling_latency_ms(&self) -> u32 {
        self.echo_timeout_us
            .div_ceil(1000)
            .saturating_mul(2)
            .saturating_add(self.inter_trigger_gap_ms)
    }

    /// Check cross-field invariants. Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval_ms == 0 || self.servo_step_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("intervals must be non-zero"));
        }
        if self.sampling_latency_ms() >= self.sample_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "sample_interval_ms must exceed two echo timeouts plus the trigger gap",
            ));
        }
        if !self.echo_us_per_cm.is_finite() || self.echo_us_per_cm <= 0.0 {
            return Err(ConfigError::ValidationFailed("echo_us_per_cm must be positive"));
        }
        if self.min_detect_cm >= self.max_detect_cm {
            return Err(ConfigError::ValidationFailed("min_detect_cm must be below max_detect_cm"));
        }
        if self.continuous_tone_cm >= self.max_detect_cm {
            return Err(ConfigError::ValidationFailed(
                "continuous_tone_cm must be below max_detect_cm",
            ));
        }
        if self.hysteresis_count == 0 {
            return Err(ConfigError::ValidationFailed("hysteresis_count must be at least 1"));
        }
        if self.freq_near_hz < self.freq_far_hz
            || self.on_near_ms > self.on_far_ms
            || self.off_near_ms > self.off_far_ms
        {
            return Err(ConfigError::ValidationFailed(
                "beep mapping must rise in pitch and shorten as targets get closer",
            ));
        }
        if self.fade_steps == 0 || self.fade_steps as usize > MAX_FADE_STEPS {
            return Err(ConfigError::ValidationFailed("fade_steps out of range"));
        }
        let last_drop = u32::from(self.fade_steps - 1).checked_mul(self.fade_step_hz);
        if self.fade_step_hz == 0 || last_drop.is_none_or(|drop| drop >= self.fade_start_hz) {
            return Err(ConfigError::ValidationFailed(
                "fade pitch must strictly fall and stay above 0 Hz",
            ));
        }
        if self.fade_gap_ms >= self.fade_step_ms {
            return Err(ConfigError::ValidationFailed("fade_gap_ms must be below fade_step_ms"));
        }
        if self.servo_step_deg <= 0 || self.servo_pos_min_deg >= self.servo_pos_max_deg {
            return Err(ConfigError::ValidationFailed("servo sweep bounds invalid"));
        }
        if !self.servo_travel_deg.is_finite()
            || self.servo_pos_min_deg < 0
            || f32::from(self.servo_pos_max_deg) > self.servo_travel_deg
        {
            return Err(ConfigError::ValidationFailed("servo sweep exceeds mechanical travel"));
        }
        if self.servo_min_pulse_us >= self.servo_max_pulse_us {
            return Err(ConfigError::ValidationFailed("servo pulse range invalid"));
        }
        if !self.battery_divider_ratio.is_finite()
            || self.battery_divider_ratio <= 0.0
            || self.adc_full_scale == 0
        {
            return Err(ConfigError::ValidationFailed("battery divider invalid"));
        }
        Ok(())
    }
}
