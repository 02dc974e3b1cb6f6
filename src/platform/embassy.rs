//! Clock backend built on embassy-time

use crate::platform::traits::ClockInterface;

/// Monotonic clock reading `embassy_time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl ClockInterface for EmbassyClock {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }
}
