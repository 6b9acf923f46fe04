//! ESP32 time adapter.
//!
//! Provides the monotonic clock the control loop snapshots once per tick,
//! and the microsecond clock the HC-SR04 driver times echoes with.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   64-bit esp_timer, which counts microseconds since boot.
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for
//!   host tests; time starts at construction.

use crate::sensors::ultrasonic::MicrosClock;

/// Time adapter for the ESP32-S3 platform. Cheap to copy; every copy reads
/// the same underlying clock.
#[derive(Clone, Copy)]
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    /// Milliseconds since boot (monotonic).
    pub fn uptime_ms(&self) -> u64 {
        self.uptime_us() / 1_000
    }
}

impl MicrosClock for Esp32TimeAdapter {
    fn now_us(&self) -> u64 {
        self.uptime_us()
    }
}
