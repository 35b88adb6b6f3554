use chrono::{DateTime, Utc};
use log::{debug, trace};
use mm_common::Credits;
use sqlx::SqliteConnection;

use crate::{
    db_types::{GroupId, InterestEdge, InterestId, InterestStats, NewInterest, ReceivedInterest, UserId},
    sqlite::db::is_unique_violation,
    traits::InterestError,
};

/// Inserts a new, uncharged and unmatched interest edge. If a live edge for the same ordered pair and group already
/// exists, the partial unique index rejects the insert and [`InterestError::DuplicateInterest`] is returned.
///
/// Inside a transaction this is the first write, so it also acquires SQLite's write lock for the unit of work.
pub async fn insert_interest(
    interest: &NewInterest,
    conn: &mut SqliteConnection,
) -> Result<InterestEdge, InterestError> {
    let edge = sqlx::query_as(
        r#"
            INSERT INTO interests (from_user_id, to_user_id, group_id, created_at, is_match, credits_charged)
            VALUES ($1, $2, $3, $4, FALSE, 0)
            RETURNING *;
        "#,
    )
    .bind(interest.from_user_id.as_str())
    .bind(interest.to_user_id.as_str())
    .bind(interest.group_id.as_str())
    .bind(interest.created_at)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            InterestError::DuplicateInterest
        } else {
            InterestError::from(e)
        }
    })?;
    Ok(edge)
}

/// Records the final state of a freshly inserted edge.
pub async fn finalise_interest(
    id: InterestId,
    is_match: bool,
    charged: Credits,
    conn: &mut SqliteConnection,
) -> Result<InterestEdge, sqlx::Error> {
    let edge = sqlx::query_as("UPDATE interests SET is_match = $1, credits_charged = $2 WHERE id = $3 RETURNING *")
        .bind(is_match)
        .bind(charged.value())
        .bind(id.0)
        .fetch_one(conn)
        .await?;
    trace!("🗃️ Interest {id} finalised. Match: {is_match}, charged: {charged}");
    Ok(edge)
}

pub async fn set_match_flag(
    id: InterestId,
    is_match: bool,
    conn: &mut SqliteConnection,
) -> Result<InterestEdge, sqlx::Error> {
    let edge = sqlx::query_as("UPDATE interests SET is_match = $1 WHERE id = $2 RETURNING *")
        .bind(is_match)
        .bind(id.0)
        .fetch_one(conn)
        .await?;
    Ok(edge)
}

/// Marks a live edge as cancelled. The match flag is left as it was, so the cancelled edge still records whether it
/// was part of a match. Returns `None` if the edge does not exist or has already been cancelled.
pub async fn cancel_interest(
    id: InterestId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<InterestEdge>, sqlx::Error> {
    let edge: Option<InterestEdge> = sqlx::query_as(
        r#"
            UPDATE interests SET cancelled_at = $1
            WHERE id = $2 AND cancelled_at IS NULL
            RETURNING *;
        "#,
    )
    .bind(now)
    .bind(id.0)
    .fetch_optional(conn)
    .await?;
    if edge.is_some() {
        debug!("🗃️ Interest {id} cancelled");
    }
    Ok(edge)
}

pub async fn fetch_interest(id: InterestId, conn: &mut SqliteConnection) -> Result<Option<InterestEdge>, sqlx::Error> {
    let edge = sqlx::query_as("SELECT * FROM interests WHERE id = $1").bind(id.0).fetch_optional(conn).await?;
    Ok(edge)
}

pub async fn fetch_active_interest(
    from: &UserId,
    to: &UserId,
    group: &GroupId,
    conn: &mut SqliteConnection,
) -> Result<Option<InterestEdge>, sqlx::Error> {
    let edge = sqlx::query_as(
        r#"
            SELECT * FROM interests
            WHERE from_user_id = $1 AND to_user_id = $2 AND group_id = $3 AND cancelled_at IS NULL;
        "#,
    )
    .bind(from.as_str())
    .bind(to.as_str())
    .bind(group.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(edge)
}

pub async fn last_interest_for_pair(
    from: &UserId,
    to: &UserId,
    group: &GroupId,
    conn: &mut SqliteConnection,
) -> Result<Option<InterestEdge>, sqlx::Error> {
    let edge = sqlx::query_as(
        r#"
            SELECT * FROM interests
            WHERE from_user_id = $1 AND to_user_id = $2 AND group_id = $3
            ORDER BY created_at DESC, id DESC
            LIMIT 1;
        "#,
    )
    .bind(from.as_str())
    .bind(to.as_str())
    .bind(group.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(edge)
}

/// Counts the live edges sent by `user` at or after `since`, across all groups.
pub async fn count_interests_since(
    user: &UserId,
    since: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar(
        "SELECT COUNT(*) FROM interests WHERE from_user_id = $1 AND created_at >= $2 AND cancelled_at IS NULL",
    )
    .bind(user.as_str())
    .bind(since)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

pub async fn stats_for_user(user: &UserId, conn: &mut SqliteConnection) -> Result<InterestStats, sqlx::Error> {
    let stats = sqlx::query_as(
        r#"
            SELECT
                (SELECT COUNT(*) FROM interests WHERE from_user_id = $1 AND cancelled_at IS NULL) AS sent,
                (SELECT COUNT(*) FROM interests WHERE to_user_id = $1 AND cancelled_at IS NULL) AS received,
                (SELECT COUNT(*) FROM matches WHERE (user_a = $1 OR user_b = $1) AND status = 'ACTIVE') AS matches;
        "#,
    )
    .bind(user.as_str())
    .fetch_one(conn)
    .await?;
    Ok(stats)
}

/// Pending interests addressed to `user`. The sender column is deliberately not selected.
pub async fn interests_received(
    user: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<ReceivedInterest>, sqlx::Error> {
    let received = sqlx::query_as(
        r#"
            SELECT group_id, created_at FROM interests
            WHERE to_user_id = $1 AND cancelled_at IS NULL AND is_match = FALSE
            ORDER BY created_at DESC;
        "#,
    )
    .bind(user.as_str())
    .fetch_all(conn)
    .await?;
    Ok(received)
}
