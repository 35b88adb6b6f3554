use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// The instant at which the local calendar day containing `now` began, in the given time zone.
pub fn start_of_local_day(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let today = now.with_timezone(tz).date_naive();
    local_midnight(today, tz).unwrap_or(now)
}

/// The instant at which the next local calendar day begins, in the given time zone.
pub fn next_local_midnight(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let today = now.with_timezone(tz).date_naive();
    today.succ_opt().and_then(|tomorrow| local_midnight(tomorrow, tz)).unwrap_or_else(|| now + Duration::days(1))
}

// Some zones skip midnight when daylight saving starts. The day then begins at the first valid local instant.
fn local_midnight(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|t| t.with_timezone(&Utc))
}
