//! `SqliteDatabase` is a concrete implementation of a match engine backend.
//!
//! It uses SQLite as the store and implements all the traits defined in the [`traits`](crate::traits) module.
//!
//! Every atomic unit of work runs inside one SQLite transaction whose first statement is a write, so the write lock
//! is taken before anything is read. Decisions for a single pair are also serialised in-process with [`PairLocks`].
use std::{fmt::Debug, sync::Arc};

use chrono::{DateTime, Utc};
use log::*;
use mm_common::Credits;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{credits, interests, matches, memberships, new_pool};
use crate::{
    db_types::{
        CancelInterest,
        CreditAccount,
        GroupId,
        GroupMembership,
        InterestEdge,
        InterestId,
        InterestStats,
        Match,
        MatchId,
        MembershipStatus,
        NewInterest,
        PairKey,
        ReceivedInterest,
        UserId,
    },
    helpers::{Clock, PairLocks, SystemClock},
    traits::{
        CreditManagement,
        InterestCancelled,
        InterestError,
        InterestManagement,
        InterestRecorded,
        MatchingDatabase,
        MembershipOracle,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
    pair_locks: PairLocks,
    clock: Arc<dyn Clock>,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool, pair_locks: PairLocks::new(), clock: Arc::new(SystemClock) })
    }

    /// Replaces the clock used to timestamp administrative writes (credit grants, premium changes).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Mirrors a membership record from the group subsystem.
    pub async fn upsert_membership(
        &self,
        user: &UserId,
        group: &GroupId,
        status: MembershipStatus,
    ) -> Result<GroupMembership, InterestError> {
        let mut conn = self.pool.acquire().await?;
        let membership = memberships::upsert_membership(user, group, status, &mut conn).await?;
        Ok(membership)
    }

    /// Mirrors the credit fields of an account from the account subsystem.
    pub async fn upsert_credit_account(&self, account: &CreditAccount) -> Result<CreditAccount, InterestError> {
        if account.credit_balance.is_negative() {
            return Err(InterestError::InvalidRequest("Credit balances cannot be negative".into()));
        }
        let mut conn = self.pool.acquire().await?;
        let account = credits::upsert_credit_account(account, &mut conn).await?;
        Ok(account)
    }
}

impl MatchingDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn record_interest(&self, interest: NewInterest) -> Result<InterestRecorded, InterestError> {
        let pair = interest.pair_key();
        let group = interest.group_id.clone();
        let _guard = self.pair_locks.lock(&pair, &group).await;
        let mut tx = self.pool.begin().await?;
        let edge = interests::insert_interest(&interest, &mut tx).await?;
        trace!("🗃️ Interest {} from {} inserted for {pair} in {group}", edge.id, interest.from_user_id);
        let reciprocal =
            interests::fetch_active_interest(&interest.to_user_id, &interest.from_user_id, &group, &mut tx).await?;
        let charge =
            credits::charge_for_interest(&interest.from_user_id, interest.cost, interest.created_at, &mut tx).await?;
        let charged = charge.amount;
        if !charge.premium {
            let quota = interest.daily_quota;
            let sent_today = interests::count_interests_since(&interest.from_user_id, quota.window_start, &mut tx).await?;
            if sent_today > i64::from(quota.limit) {
                debug!("🗃️ {} has already sent {} interests today. Rolling back.", interest.from_user_id, sent_today - 1);
                return Err(InterestError::DailyLimitExceeded { limit: quota.limit, resets_at: quota.resets_at });
            }
        }
        let result = match reciprocal {
            Some(other) => {
                let edge = interests::finalise_interest(edge.id, true, charged, &mut tx).await?;
                let other = interests::set_match_flag(other.id, true, &mut tx).await?;
                let new_match = matches::insert_match(&pair, &group, interest.created_at, &mut tx).await?;
                InterestRecorded { interest: edge, reciprocal: Some(other), new_match: Some(new_match), charged }
            },
            None => {
                let edge = interests::finalise_interest(edge.id, false, charged, &mut tx).await?;
                InterestRecorded { interest: edge, reciprocal: None, new_match: None, charged }
            },
        };
        tx.commit().await?;
        debug!(
            "🗃️ Interest {} committed for {pair} in {group}. Match: {}",
            result.interest.id,
            result.new_match.as_ref().map(|m| m.id.to_string()).unwrap_or_else(|| "none".into())
        );
        Ok(result)
    }

    async fn cancel_interest(&self, request: CancelInterest) -> Result<InterestCancelled, InterestError> {
        let id = request.interest_id;
        let known = self
            .fetch_interest(id)
            .await?
            .ok_or_else(|| InterestError::NotFound(format!("Interest {id}")))?;
        let pair = known.pair_key();
        let _guard = self.pair_locks.lock(&pair, &known.group_id).await;
        let now = request.requested_at;
        let mut tx = self.pool.begin().await?;
        // Returning early drops `tx`, which rolls the cancellation back.
        let Some(edge) = interests::cancel_interest(id, now, &mut tx).await? else {
            return match interests::fetch_interest(id, &mut tx).await? {
                Some(stale) if stale.from_user_id != request.requester => Err(InterestError::Unauthorized),
                _ => Err(InterestError::NotFound(format!("Interest {id}"))),
            };
        };
        if edge.from_user_id != request.requester {
            return Err(InterestError::Unauthorized);
        }
        if !edge.is_within(request.grace_window, now) {
            return Err(InterestError::ReversalWindowExpired { hours: request.grace_window.num_hours() });
        }
        let (ended_match, restored) = if edge.is_match {
            let ended = matches::delete_current_match(&pair, &edge.group_id, now, &mut tx).await?;
            let restored =
                match interests::fetch_active_interest(&edge.to_user_id, &edge.from_user_id, &edge.group_id, &mut tx)
                    .await?
                {
                    Some(other) => Some(interests::set_match_flag(other.id, false, &mut tx).await?),
                    None => None,
                };
            (ended, restored)
        } else {
            (None, None)
        };
        let refunded = edge.credits_charged;
        if !refunded.is_zero() {
            credits::credit(&edge.from_user_id, refunded, now, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Interest {id} for {pair} withdrawn. {refunded} refunded.");
        Ok(InterestCancelled { interest: edge, ended_match, restored, refunded })
    }

    async fn expire_matches(&self, cutoff: DateTime<Utc>, now: DateTime<Utc>) -> Result<Vec<Match>, InterestError> {
        let mut tx = self.pool.begin().await?;
        let expired = matches::expire_matches(cutoff, now, &mut tx).await?;
        tx.commit().await?;
        if !expired.is_empty() {
            info!("🗃️ {} matches created before {cutoff} have expired", expired.len());
        }
        Ok(expired)
    }

    async fn close(&mut self) -> Result<(), InterestError> {
        self.pool.close().await;
        Ok(())
    }
}

impl InterestManagement for SqliteDatabase {
    async fn fetch_interest(&self, id: InterestId) -> Result<Option<InterestEdge>, InterestError> {
        let mut conn = self.pool.acquire().await?;
        let edge = interests::fetch_interest(id, &mut conn).await?;
        Ok(edge)
    }

    async fn fetch_active_interest(
        &self,
        from: &UserId,
        to: &UserId,
        group: &GroupId,
    ) -> Result<Option<InterestEdge>, InterestError> {
        let mut conn = self.pool.acquire().await?;
        let edge = interests::fetch_active_interest(from, to, group, &mut conn).await?;
        Ok(edge)
    }

    async fn last_interest_for_pair(
        &self,
        from: &UserId,
        to: &UserId,
        group: &GroupId,
    ) -> Result<Option<InterestEdge>, InterestError> {
        let mut conn = self.pool.acquire().await?;
        let edge = interests::last_interest_for_pair(from, to, group, &mut conn).await?;
        Ok(edge)
    }

    async fn count_interests_since(&self, user: &UserId, since: DateTime<Utc>) -> Result<i64, InterestError> {
        let mut conn = self.pool.acquire().await?;
        let count = interests::count_interests_since(user, since, &mut conn).await?;
        Ok(count)
    }

    async fn fetch_match(&self, id: MatchId) -> Result<Option<Match>, InterestError> {
        let mut conn = self.pool.acquire().await?;
        let m = matches::fetch_match(id, &mut conn).await?;
        Ok(m)
    }

    async fn fetch_current_match(&self, pair: &PairKey, group: &GroupId) -> Result<Option<Match>, InterestError> {
        let mut conn = self.pool.acquire().await?;
        let m = matches::fetch_current_match(pair, group, &mut conn).await?;
        Ok(m)
    }

    async fn fetch_matches_for_user(&self, user: &UserId) -> Result<Vec<Match>, InterestError> {
        let mut conn = self.pool.acquire().await?;
        let found = matches::fetch_active_matches_for_user(user, &mut conn).await?;
        Ok(found)
    }

    async fn stats_for_user(&self, user: &UserId) -> Result<InterestStats, InterestError> {
        let mut conn = self.pool.acquire().await?;
        let stats = interests::stats_for_user(user, &mut conn).await?;
        Ok(stats)
    }

    async fn interests_received(&self, user: &UserId) -> Result<Vec<ReceivedInterest>, InterestError> {
        let mut conn = self.pool.acquire().await?;
        let received = interests::interests_received(user, &mut conn).await?;
        Ok(received)
    }
}

impl CreditManagement for SqliteDatabase {
    async fn fetch_credit_account(&self, user: &UserId) -> Result<Option<CreditAccount>, InterestError> {
        let mut conn = self.pool.acquire().await?;
        let account = credits::fetch_credit_account(user, &mut conn).await?;
        Ok(account)
    }

    async fn grant_credits(&self, user: &UserId, amount: Credits) -> Result<CreditAccount, InterestError> {
        if amount <= Credits::ZERO {
            return Err(InterestError::InvalidRequest(format!("Cannot grant {amount}. The amount must be positive.")));
        }
        let mut conn = self.pool.acquire().await?;
        let account = credits::credit(user, amount, self.clock.now(), &mut conn).await?;
        info!("🗃️ {user} was granted {amount}. Balance is now {}", account.credit_balance);
        Ok(account)
    }

    async fn set_premium(
        &self,
        user: &UserId,
        is_premium: bool,
        until: Option<DateTime<Utc>>,
    ) -> Result<CreditAccount, InterestError> {
        let mut conn = self.pool.acquire().await?;
        let account = credits::set_premium(user, is_premium, until, self.clock.now(), &mut conn).await?;
        Ok(account)
    }
}

impl MembershipOracle for SqliteDatabase {
    async fn is_active_member(&self, user: &UserId, group: &GroupId) -> Result<bool, InterestError> {
        let mut conn = self.pool.acquire().await?;
        let is_member = memberships::is_active_member(user, group, &mut conn).await?;
        Ok(is_member)
    }

    async fn memberships_for(&self, user: &UserId) -> Result<Vec<GroupMembership>, InterestError> {
        let mut conn = self.pool.acquire().await?;
        let memberships = memberships::memberships_for(user, &mut conn).await?;
        Ok(memberships)
    }
}
