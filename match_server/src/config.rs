use std::{env, fmt::Display, str::FromStr};

use chrono::Duration;
use chrono_tz::Tz;
use log::*;
use match_engine::MatchPolicy;
use mm_common::{parse_boolean_flag, Credits};

const DEFAULT_MM_HOST: &str = "127.0.0.1";
const DEFAULT_MM_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/match_store.db";
const DEFAULT_MATCH_TTL_DAYS: i64 = 30;
const DEFAULT_EXPIRY_INTERVAL_SECS: u64 = 300;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Cooldown, quota, grace window, cost, timezone and operation timeout for the matching flow.
    pub policy: MatchPolicy,
    /// Active matches older than this are expired. `None` disables the expiry worker.
    pub match_ttl: Option<Duration>,
    /// How often the expiry worker runs.
    pub expiry_interval: std::time::Duration,
    /// If set, notifications are POSTed to this URL. Otherwise they are only logged.
    pub notification_webhook_url: Option<String>,
    /// Apply pending database migrations on start-up.
    pub run_migrations: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MM_HOST.to_string(),
            port: DEFAULT_MM_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            policy: MatchPolicy::default(),
            match_ttl: Some(Duration::days(DEFAULT_MATCH_TTL_DAYS)),
            expiry_interval: std::time::Duration::from_secs(DEFAULT_EXPIRY_INTERVAL_SECS),
            notification_webhook_url: None,
            run_migrations: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let defaults = Self::default();
        let host = env::var("MM_HOST").ok().unwrap_or_else(|| DEFAULT_MM_HOST.into());
        let port = parse_env("MM_PORT", DEFAULT_MM_PORT);
        let database_url = env::var("MM_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ MM_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let policy = policy_from_env();
        let match_ttl = match parse_env("MM_MATCH_TTL_DAYS", DEFAULT_MATCH_TTL_DAYS) {
            days if days > 0 => Some(Duration::days(days)),
            _ => {
                info!("🪛️ Match expiry is disabled. Set MM_MATCH_TTL_DAYS to a positive number of days to enable it.");
                None
            },
        };
        let expiry_interval = match parse_env("MM_EXPIRY_INTERVAL_SECS", DEFAULT_EXPIRY_INTERVAL_SECS) {
            0 => {
                warn!("🪛️ MM_EXPIRY_INTERVAL_SECS cannot be zero. Using the default, {DEFAULT_EXPIRY_INTERVAL_SECS}s.");
                defaults.expiry_interval
            },
            secs => std::time::Duration::from_secs(secs),
        };
        let notification_webhook_url = env::var("MM_NOTIFICATION_WEBHOOK_URL").ok().filter(|s| !s.trim().is_empty());
        if notification_webhook_url.is_none() {
            info!("🪛️ MM_NOTIFICATION_WEBHOOK_URL is not set. Notifications will be logged, not delivered.");
        }
        let run_migrations = parse_boolean_flag(env::var("MM_RUN_MIGRATIONS").ok(), true);
        Self {
            host,
            port,
            database_url,
            policy,
            match_ttl,
            expiry_interval,
            notification_webhook_url,
            run_migrations,
        }
    }
}

fn policy_from_env() -> MatchPolicy {
    let mut policy = MatchPolicy::default();
    if let Some(limit) = parse_optional_env::<u32>("MM_DAILY_LIMIT") {
        policy = policy.with_daily_limit(limit);
    }
    match parse_optional_env::<i64>("MM_COOLDOWN_DAYS") {
        Some(days) if days >= 0 => policy = policy.with_cooldown(Duration::days(days)),
        Some(days) => warn!("🪛️ MM_COOLDOWN_DAYS cannot be negative ({days}). Using the default."),
        None => {},
    }
    match parse_optional_env::<i64>("MM_GRACE_HOURS") {
        Some(hours) if hours >= 0 => policy = policy.with_grace_window(Duration::hours(hours)),
        Some(hours) => warn!("🪛️ MM_GRACE_HOURS cannot be negative ({hours}). Using the default."),
        None => {},
    }
    match parse_optional_env::<i64>("MM_INTEREST_COST") {
        Some(cost) if cost >= 0 => policy = policy.with_interest_cost(Credits::from(cost)),
        Some(cost) => warn!("🪛️ MM_INTEREST_COST cannot be negative ({cost}). Using the default."),
        None => {},
    }
    if let Some(tz) = parse_optional_env::<Tz>("MM_TIMEZONE") {
        policy = policy.with_timezone(tz);
    }
    match parse_optional_env::<u64>("MM_OPERATION_TIMEOUT_SECS") {
        Some(0) => warn!("🪛️ MM_OPERATION_TIMEOUT_SECS cannot be zero. Using the default."),
        Some(secs) => policy = policy.with_operation_timeout(std::time::Duration::from_secs(secs)),
        None => {},
    }
    policy
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    parse_optional_env(name).unwrap_or(default)
}

/// Reads and parses `name`. Invalid values are logged and treated as unset.
fn parse_optional_env<T>(name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let s = env::var(name).ok()?;
    s.trim()
        .parse::<T>()
        .map_err(|e| error!("🪛️ {s} is not a valid value for {name}. {e} Using the default instead."))
        .ok()
}
