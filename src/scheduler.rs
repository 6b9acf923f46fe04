//! Level-triggered timing primitives.
//!
//! Nothing in the firmware schedules callbacks. Every component keeps its
//! own [`Interval`] or [`Deadline`] and compares it against the single
//! clock snapshot taken at the top of each loop iteration.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    loop iteration                            │
//! │                                                              │
//! │   now = clock.uptime_ms()        (read once)                 │
//! │        │                                                     │
//! │        ├──▶ sampling Interval   ──▶ arbitrate + decide       │
//! │        ├──▶ beep Deadline        ──▶ toggle tone             │
//! │        ├──▶ fade Deadline        ──▶ next fade step          │
//! │        ├──▶ sweep Interval       ──▶ step servo              │
//! │        └──▶ battery Interval     ──▶ sample + report         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A late iteration is absorbed by the next comparison; drift never
//! accumulates beyond one iteration's jitter.

/// Fires once every `period_ms`, measured from the last time it was marked.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period_ms: u64,
    last_ms: u64,
}

impl Interval {
    /// An interval whose first period ends `period_ms` after boot.
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms: period_ms as u64,
            last_ms: 0,
        }
    }

    /// True once at least one period has elapsed since the last mark.
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_ms) >= self.period_ms
    }

    /// Restart the period at `now_ms`.
    pub fn mark(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
    }

    /// `is_due` followed by `mark` when it fires.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.is_due(now_ms) {
            self.mark(now_ms);
            true
        } else {
            false
        }
    }
}

/// An optional point in time. Disarmed deadlines never fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline {
    at_ms: Option<u64>,
}

impl Deadline {
    pub const fn disarmed() -> Self {
        Self { at_ms: None }
    }

    /// Arm to fire `after_ms` past `now_ms`.
    pub fn arm(&mut self, now_ms: u64, after_ms: u32) {
        self.at_ms = Some(now_ms + u64::from(after_ms));
    }

    pub fn clear(&mut self) {
        self.at_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.at_ms.is_some()
    }

    /// True if armed and `now_ms` has reached the deadline.
    pub fn reached(&self, now_ms: u64) -> bool {
        self.at_ms.is_some_and(|at| now_ms >= at)
    }

    pub fn at_ms(&self) -> Option<u64> {
        self.at_ms
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
