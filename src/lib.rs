//! SonarSentry firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod power;
pub mod scheduler;

// Hardware-facing modules. The ESP-IDF paths are cfg-gated inside; on the
// host they fall back to in-memory simulation.
pub mod adapters;
pub mod drivers;
pub mod pins;
pub mod sensors;
