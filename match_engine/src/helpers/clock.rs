use chrono::{DateTime, Utc};

/// A source of "now". Every timestamp the engine writes comes from a `Clock`, so that time-based rules (cooldown,
/// daily quota, grace window and match expiry) are evaluated against one consistent reading.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
