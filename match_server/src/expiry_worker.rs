use chrono::Duration;
use log::*;
use match_engine::{db_types::Match, events::EventProducers, InterestFlowApi, MatchPolicy, SqliteDatabase};
use tokio::task::JoinHandle;

/// Starts the match expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Every `interval`, active matches older than `ttl` are marked as expired, and a `MatchEndedEvent` is published for
/// each of them.
pub fn start_expiry_worker(
    db: SqliteDatabase,
    producers: EventProducers,
    policy: MatchPolicy,
    ttl: Duration,
    interval: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        let api = InterestFlowApi::new(db, producers).with_policy(policy);
        info!("🕰️ Match expiry worker started. Matches expire after {} days", ttl.num_days());
        loop {
            timer.tick().await;
            debug!("🕰️ Running match expiry job");
            match api.expire_matches(ttl).await {
                Ok(expired) if expired.is_empty() => trace!("🕰️ No matches expired"),
                Ok(expired) => {
                    info!("🕰️ {} matches expired", expired.len());
                    debug!("🕰️ Expired matches: {}", match_list(&expired));
                },
                Err(e) => {
                    error!("🕰️ Error running match expiry job: {e}");
                },
            }
        }
    })
}

fn match_list(matches: &[Match]) -> String {
    matches
        .iter()
        .map(|m| format!("[{}] {} & {} in {}", m.id, m.user_a, m.user_b, m.group_id))
        .collect::<Vec<String>>()
        .join(", ")
}
