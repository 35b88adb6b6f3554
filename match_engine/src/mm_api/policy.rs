use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use mm_common::Credits;

use crate::{
    db_types::DailyQuota,
    helpers::{next_local_midnight, start_of_local_day},
};

pub const DEFAULT_COOLDOWN_DAYS: i64 = 14;
pub const DEFAULT_DAILY_LIMIT: u32 = 10;
pub const DEFAULT_GRACE_HOURS: i64 = 24;
pub const DEFAULT_INTEREST_COST: i64 = 1;
pub const DEFAULT_OPERATION_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// The tunable rules of the matching economy.
#[derive(Debug, Clone)]
pub struct MatchPolicy {
    /// Minimum time between two signals from the same user toward the same target in the same group.
    pub cooldown: Duration,
    /// Interests a non-premium user may send per local calendar day.
    pub daily_limit: u32,
    /// How long after sending an interest the sender may still withdraw it.
    pub grace_window: Duration,
    /// What a non-premium user pays per interest.
    pub interest_cost: Credits,
    /// The zone whose midnight resets the daily quota.
    pub timezone: Tz,
    /// Upper bound on a single submission or withdrawal.
    pub operation_timeout: std::time::Duration,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::days(DEFAULT_COOLDOWN_DAYS),
            daily_limit: DEFAULT_DAILY_LIMIT,
            grace_window: Duration::hours(DEFAULT_GRACE_HOURS),
            interest_cost: Credits::from(DEFAULT_INTEREST_COST),
            timezone: Tz::UTC,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl MatchPolicy {
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_daily_limit(mut self, limit: u32) -> Self {
        self.daily_limit = limit;
        self
    }

    pub fn with_grace_window(mut self, window: Duration) -> Self {
        self.grace_window = window;
        self
    }

    pub fn with_interest_cost(mut self, cost: Credits) -> Self {
        self.interest_cost = cost;
        self
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// The quota window that contains `now`.
    pub fn daily_quota(&self, now: DateTime<Utc>) -> DailyQuota {
        DailyQuota {
            limit: self.daily_limit,
            window_start: start_of_local_day(now, &self.timezone),
            resets_at: next_local_midnight(now, &self.timezone),
        }
    }
}
