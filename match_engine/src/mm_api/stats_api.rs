use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{InterestStats, Match, ReceivedInterest, UserId},
    traits::{InterestError, InterestManagement},
};

/// Read-only views of a user's matching activity.
pub struct StatsApi<B> {
    db: B,
}

impl<B> Debug for StatsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StatsApi")
    }
}

impl<B> StatsApi<B>
where B: InterestManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Live interests sent, live interests received and active matches for the user.
    pub async fn stats_for(&self, user: &UserId) -> Result<InterestStats, InterestError> {
        let stats = self.db.stats_for_user(user).await?;
        trace!("📊️ Stats for {user}: {stats:?}");
        Ok(stats)
    }

    pub async fn matches_for(&self, user: &UserId) -> Result<Vec<Match>, InterestError> {
        self.db.fetch_matches_for_user(user).await
    }

    /// Pending interests addressed to the user. Senders are never revealed before a match.
    pub async fn inbox_for(&self, user: &UserId) -> Result<Vec<ReceivedInterest>, InterestError> {
        self.db.interests_received(user).await
    }
}
