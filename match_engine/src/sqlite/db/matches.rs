use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{GroupId, Match, MatchId, PairKey, UserId},
    sqlite::db::is_unique_violation,
    traits::InterestError,
};

/// Creates the match record for the pair. If a non-deleted match for the pair already exists, the store is in a
/// state this unit of work cannot resolve, and the whole unit must be rolled back.
pub async fn insert_match(
    pair: &PairKey,
    group: &GroupId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Match, InterestError> {
    let new_match: Match = sqlx::query_as(
        r#"
            INSERT INTO matches (user_a, user_b, group_id, created_at, status) VALUES ($1, $2, $3, $4, 'ACTIVE')
            RETURNING *;
        "#,
    )
    .bind(pair.low().as_str())
    .bind(pair.high().as_str())
    .bind(group.as_str())
    .bind(now)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            InterestError::TransientStore(format!("A match for {pair} in {group} already exists"))
        } else {
            InterestError::from(e)
        }
    })?;
    debug!("🗃️ Match {} created for {pair} in {group}", new_match.id);
    Ok(new_match)
}

/// Marks the current (non-deleted) match for the pair as deleted. Returns the updated record, or `None` if the pair
/// had no current match.
pub async fn delete_current_match(
    pair: &PairKey,
    group: &GroupId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Match>, sqlx::Error> {
    let ended: Option<Match> = sqlx::query_as(
        r#"
            UPDATE matches SET status = 'DELETED', ended_at = COALESCE(ended_at, $1)
            WHERE user_a = $2 AND user_b = $3 AND group_id = $4 AND status <> 'DELETED'
            RETURNING *;
        "#,
    )
    .bind(now)
    .bind(pair.low().as_str())
    .bind(pair.high().as_str())
    .bind(group.as_str())
    .fetch_optional(conn)
    .await?;
    if let Some(m) = &ended {
        debug!("🗃️ Match {} for {pair} in {group} deleted", m.id);
    }
    Ok(ended)
}

/// Expires every active match created before `cutoff`.
pub async fn expire_matches(
    cutoff: DateTime<Utc>,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Match>, sqlx::Error> {
    let expired: Vec<Match> = sqlx::query_as(
        r#"
            UPDATE matches SET status = 'EXPIRED', ended_at = $1
            WHERE status = 'ACTIVE' AND created_at < $2
            RETURNING *;
        "#,
    )
    .bind(now)
    .bind(cutoff)
    .fetch_all(conn)
    .await?;
    Ok(expired)
}

pub async fn fetch_match(id: MatchId, conn: &mut SqliteConnection) -> Result<Option<Match>, sqlx::Error> {
    let m = sqlx::query_as("SELECT * FROM matches WHERE id = $1").bind(id.0).fetch_optional(conn).await?;
    Ok(m)
}

pub async fn fetch_current_match(
    pair: &PairKey,
    group: &GroupId,
    conn: &mut SqliteConnection,
) -> Result<Option<Match>, sqlx::Error> {
    let m = sqlx::query_as(
        "SELECT * FROM matches WHERE user_a = $1 AND user_b = $2 AND group_id = $3 AND status <> 'DELETED'",
    )
    .bind(pair.low().as_str())
    .bind(pair.high().as_str())
    .bind(group.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(m)
}

pub async fn fetch_active_matches_for_user(
    user: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Match>, sqlx::Error> {
    let matches = sqlx::query_as(
        r#"
            SELECT * FROM matches
            WHERE (user_a = $1 OR user_b = $1) AND status = 'ACTIVE'
            ORDER BY created_at DESC, id DESC;
        "#,
    )
    .bind(user.as_str())
    .fetch_all(conn)
    .await?;
    Ok(matches)
}
