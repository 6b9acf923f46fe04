//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                     |
//! |------------|--------------|---------------------------------|
//! | `hardware` | RangePort    | HC-SR04 pair (GPIO)             |
//! |            | TonePort     | Piezo speaker (LEDC)            |
//! |            | ServoPort    | Hobby servo (LEDC)              |
//! |            | BatteryPort  | Battery divider (ADC1)          |
//! |            | ClockPort    | ESP32 high-resolution timer     |
//! | `log_sink` | EventSink    | Serial log output               |
//! | `time`     | MicrosClock  | ESP32 high-resolution timer     |

pub mod hardware;
pub mod log_sink;
pub mod time;
