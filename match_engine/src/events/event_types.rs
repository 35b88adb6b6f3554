use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{GroupId, Match, UserId};

/// Emitted after the atomic unit that created a match has committed. Both members of the pair are notified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCreatedEvent {
    pub matched: Match,
}

impl MatchCreatedEvent {
    pub fn new(matched: Match) -> Self {
        Self { matched }
    }
}

/// Emitted when an interest is recorded without creating a match. The sender is intentionally absent: only the
/// target and the group are ever revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestReceivedEvent {
    pub target: UserId,
    pub group_id: GroupId,
    pub received_at: DateTime<Utc>,
}

impl InterestReceivedEvent {
    pub fn new(target: UserId, group_id: GroupId, received_at: DateTime<Utc>) -> Self {
        Self { target, group_id, received_at }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchEndReason {
    /// One of the pair withdrew their interest inside the grace window.
    Withdrawn,
    /// The match outlived its time to live.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEndedEvent {
    pub matched: Match,
    pub reason: MatchEndReason,
}

impl MatchEndedEvent {
    pub fn new(matched: Match, reason: MatchEndReason) -> Self {
        Self { matched, reason }
    }
}
