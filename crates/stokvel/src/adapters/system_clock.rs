// Rust guideline compliant 2026-10-19

//! `Clock` adapter reading the system time in UTC.

use chrono::{DateTime, Utc};
use domain::Clock;

/// Concrete adapter for the `domain::Clock` port.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
