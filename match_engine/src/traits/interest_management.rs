use chrono::{DateTime, Utc};

use crate::{
    db_types::{GroupId, InterestEdge, InterestId, InterestStats, Match, MatchId, PairKey, ReceivedInterest, UserId},
    traits::InterestError,
};

/// Read-only queries over interest edges and matches.
///
/// None of these methods take part in an atomic unit of work, so callers must treat their results as a snapshot
/// that may be stale by the time they act on it.
#[allow(async_fn_in_trait)]
pub trait InterestManagement {
    async fn fetch_interest(&self, id: InterestId) -> Result<Option<InterestEdge>, InterestError>;

    /// Fetches the non-cancelled edge for the ordered pair `from -> to` in the group, if there is one.
    async fn fetch_active_interest(
        &self,
        from: &UserId,
        to: &UserId,
        group: &GroupId,
    ) -> Result<Option<InterestEdge>, InterestError>;

    /// Fetches the most recent edge for the ordered pair `from -> to` in the group, cancelled or not.
    async fn last_interest_for_pair(
        &self,
        from: &UserId,
        to: &UserId,
        group: &GroupId,
    ) -> Result<Option<InterestEdge>, InterestError>;

    /// Counts the non-cancelled edges the user created at or after `since`.
    async fn count_interests_since(&self, user: &UserId, since: DateTime<Utc>) -> Result<i64, InterestError>;

    async fn fetch_match(&self, id: MatchId) -> Result<Option<Match>, InterestError>;

    /// Fetches the non-deleted match for the pair in the group, if one exists.
    async fn fetch_current_match(&self, pair: &PairKey, group: &GroupId) -> Result<Option<Match>, InterestError>;

    /// Fetches all active matches the user is part of, most recent first.
    async fn fetch_matches_for_user(&self, user: &UserId) -> Result<Vec<Match>, InterestError>;

    async fn stats_for_user(&self, user: &UserId) -> Result<InterestStats, InterestError>;

    /// Lists the pending (non-cancelled, unmatched) interests addressed to the user. Sender identities are never
    /// part of the result.
    async fn interests_received(&self, user: &UserId) -> Result<Vec<ReceivedInterest>, InterestError>;
}
