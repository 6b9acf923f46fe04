//! Battery pack voltage through a resistive divider.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the battery ADC1 channel via the oneshot API
//! (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::config::SystemConfig;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorError;

#[cfg(not(target_os = "espidf"))]
static SIM_BATTERY_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_battery_adc(raw: u16) {
    SIM_BATTERY_ADC.store(raw, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy)]
pub struct BatteryReading {
    pub raw: u16,
    pub volts: f32,
}

pub struct BatterySense {
    divider_ratio: f32,
    reference_volts: f32,
    full_scale: f32,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    adc_channel: u32,
}

impl BatterySense {
    pub fn new(adc_channel: u32, config: &SystemConfig) -> Self {
        Self {
            divider_ratio: config.battery_divider_ratio,
            reference_volts: config.adc_reference_volts,
            full_scale: f32::from(config.adc_full_scale),
            adc_channel,
        }
    }

    pub fn read(&self) -> Result<BatteryReading, SensorError> {
        let raw = self.read_adc()?;
        Ok(BatteryReading {
            raw,
            volts: self.adc_to_volts(raw),
        })
    }

    /// Pack volts for a raw count: `raw × vref / full_scale / ratio`.
    pub fn adc_to_volts(&self, raw: u16) -> f32 {
        f32::from(raw) * self.reference_volts / self.full_scale / self.divider_ratio
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Result<u16, SensorError> {
        hw_init::adc1_read(self.adc_channel).ok_or(SensorError::AdcReadFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Result<u16, SensorError> {
        Ok(SIM_BATTERY_ADC.load(Ordering::Relaxed))
    }
}
