use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{GroupId, GroupMembership, MembershipStatus, UserId};

pub async fn is_active_member(user: &UserId, group: &GroupId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let is_member: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM group_memberships WHERE user_id = $1 AND group_id = $2 AND status = 'ACTIVE')",
    )
    .bind(user.as_str())
    .bind(group.as_str())
    .fetch_one(conn)
    .await?;
    Ok(is_member)
}

pub async fn memberships_for(user: &UserId, conn: &mut SqliteConnection) -> Result<Vec<GroupMembership>, sqlx::Error> {
    let memberships = sqlx::query_as("SELECT * FROM group_memberships WHERE user_id = $1 ORDER BY group_id")
        .bind(user.as_str())
        .fetch_all(conn)
        .await?;
    Ok(memberships)
}

/// Creates or replaces the membership record. The group subsystem owns this data; this is only used to mirror it.
pub async fn upsert_membership(
    user: &UserId,
    group: &GroupId,
    status: MembershipStatus,
    conn: &mut SqliteConnection,
) -> Result<GroupMembership, sqlx::Error> {
    let membership = sqlx::query_as(
        r#"
            INSERT INTO group_memberships (user_id, group_id, status) VALUES ($1, $2, $3)
            ON CONFLICT (user_id, group_id) DO UPDATE SET status = excluded.status
            RETURNING *;
        "#,
    )
    .bind(user.as_str())
    .bind(group.as_str())
    .bind(status.to_string())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Membership of {user} in {group} is now {status}");
    Ok(membership)
}
