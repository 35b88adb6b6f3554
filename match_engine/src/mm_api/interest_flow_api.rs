use std::{fmt::Debug, future::Future, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use log::*;

use crate::{
    db_types::{CancelInterest, CreditAccount, GroupId, InterestId, Match, NewInterest, UserId},
    events::{EventProducers, InterestReceivedEvent, MatchCreatedEvent, MatchEndReason, MatchEndedEvent},
    helpers::{Clock, SystemClock},
    mm_api::{
        eligibility::EligibilitySnapshot,
        interest_objects::{CancelInterestResult, SubmitInterestResult},
        policy::MatchPolicy,
    },
    traits::{InterestCancelled, InterestError, InterestRecorded, MatchingDatabase},
};

/// `InterestFlowApi` is the primary API for the matching flow: signalling interest, withdrawing it, and expiring old
/// matches.
///
/// Every mutating call runs as a single atomic unit of work on the backend. Events are only published once that
/// unit has committed, and publishing never fails the call.
pub struct InterestFlowApi<B> {
    db: B,
    producers: EventProducers,
    policy: MatchPolicy,
    clock: Arc<dyn Clock>,
}

impl<B> Debug for InterestFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InterestFlowApi ({:?})", self.policy)
    }
}

impl<B> InterestFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, policy: MatchPolicy::default(), clock: Arc::new(SystemClock) }
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> InterestFlowApi<B>
where B: MatchingDatabase
{
    /// Signals interest from `from` toward `to` within `group`.
    ///
    /// The eligibility gate runs first, and a denial is returned without anything being written. Otherwise the edge is
    /// recorded, the sender charged and, if `to` had already signalled `from`, the match created, all in one atomic
    /// unit. On [`InterestError::Timeout`] the unit may or may not have committed.
    pub async fn submit_interest(
        &self,
        from: &UserId,
        to: &UserId,
        group: &GroupId,
    ) -> Result<SubmitInterestResult, InterestError> {
        let recorded = self.bounded(self.gate_and_record(from, to, group)).await?;
        let result = SubmitInterestResult::from(&recorded);
        match &recorded.new_match {
            Some(m) => {
                info!("🔄️💞️ {from} and {to} matched in {group}. Match {}", m.id);
                self.producers.publish_match_created(MatchCreatedEvent::new(m.clone())).await;
            },
            None => {
                debug!("🔄️💌️ Interest {} recorded from {from} toward {to} in {group}", result.like_id);
                let ev = InterestReceivedEvent::new(to.clone(), group.clone(), recorded.interest.created_at);
                self.producers.publish_interest_received(ev).await;
            },
        }
        Ok(result)
    }

    /// Runs the eligibility gate without writing anything.
    pub async fn check_eligibility(&self, from: &UserId, to: &UserId, group: &GroupId) -> Result<(), InterestError> {
        let now = self.clock.now();
        self.gate(from, to, group, now).await
    }

    /// Withdraws the interest with id `like_id`. Only the sender may withdraw, and only inside the grace window. A
    /// match the interest was part of is deleted, and the original charge is refunded.
    pub async fn cancel_interest(
        &self,
        like_id: InterestId,
        requester: &UserId,
    ) -> Result<CancelInterestResult, InterestError> {
        let request = CancelInterest {
            interest_id: like_id,
            requester: requester.clone(),
            requested_at: self.clock.now(),
            grace_window: self.policy.grace_window,
        };
        let cancelled = self.bounded(self.db.cancel_interest(request)).await?;
        self.after_cancel(&cancelled).await;
        Ok(CancelInterestResult::from(&cancelled))
    }

    /// Withdraws the live interest from `from` toward `to` in `group`. `requester` must be `from`.
    pub async fn cancel_interest_for_pair(
        &self,
        from: &UserId,
        to: &UserId,
        group: &GroupId,
        requester: &UserId,
    ) -> Result<CancelInterestResult, InterestError> {
        let edge = self
            .db
            .fetch_active_interest(from, to, group)
            .await?
            .ok_or_else(|| InterestError::NotFound(format!("Interest from {from} toward {to} in {group}")))?;
        self.cancel_interest(edge.id, requester).await
    }

    /// Expires every active match older than `ttl`.
    pub async fn expire_matches(&self, ttl: Duration) -> Result<Vec<Match>, InterestError> {
        let now = self.clock.now();
        let expired = self.db.expire_matches(now - ttl, now).await?;
        for m in &expired {
            info!("🔄️🕰️ Match {} between {} and {} has expired", m.id, m.user_a, m.user_b);
            self.producers.publish_match_ended(MatchEndedEvent::new(m.clone(), MatchEndReason::Expired)).await;
        }
        Ok(expired)
    }

    async fn gate_and_record(
        &self,
        from: &UserId,
        to: &UserId,
        group: &GroupId,
    ) -> Result<InterestRecorded, InterestError> {
        let now = self.clock.now();
        self.gate(from, to, group, now).await?;
        let interest = NewInterest {
            from_user_id: from.clone(),
            to_user_id: to.clone(),
            group_id: group.clone(),
            created_at: now,
            cost: self.policy.interest_cost,
            daily_quota: self.policy.daily_quota(now),
        };
        self.db.record_interest(interest).await
    }

    async fn gate(&self, from: &UserId, to: &UserId, group: &GroupId, now: DateTime<Utc>) -> Result<(), InterestError> {
        if from == to {
            return Err(InterestError::SelfTarget);
        }
        let snapshot = self.snapshot(from, to, group, now).await?;
        self.policy.evaluate(&snapshot).map_err(|e| {
            debug!("🔄️🚫️ Interest from {from} toward {to} in {group} denied. {e}");
            e
        })
    }

    async fn snapshot(
        &self,
        from: &UserId,
        to: &UserId,
        group: &GroupId,
        now: DateTime<Utc>,
    ) -> Result<EligibilitySnapshot, InterestError> {
        let from_is_member = self.db.is_active_member(from, group).await?;
        let to_is_member = self.db.is_active_member(to, group).await?;
        let has_pending_interest =
            self.db.fetch_active_interest(from, to, group).await?.map_or(false, |edge| !edge.is_match);
        let last_signalled_at = self.db.last_interest_for_pair(from, to, group).await?.map(|e| e.created_at);
        let account =
            self.db.fetch_credit_account(from).await?.unwrap_or_else(|| CreditAccount::empty(from.clone(), now));
        let window_start = self.policy.daily_quota(now).window_start;
        let sent_today = self.db.count_interests_since(from, window_start).await?;
        Ok(EligibilitySnapshot {
            from: from.clone(),
            to: to.clone(),
            group: group.clone(),
            now,
            from_is_member,
            to_is_member,
            has_pending_interest,
            last_signalled_at,
            account,
            sent_today,
        })
    }

    async fn after_cancel(&self, cancelled: &InterestCancelled) {
        let edge = &cancelled.interest;
        debug!(
            "🔄️↩️ Interest {} from {} toward {} withdrawn. {} refunded",
            edge.id, edge.from_user_id, edge.to_user_id, cancelled.refunded
        );
        if let Some(m) = &cancelled.ended_match {
            info!("🔄️💔️ Match {} ended because interest {} was withdrawn", m.id, edge.id);
            self.producers.publish_match_ended(MatchEndedEvent::new(m.clone(), MatchEndReason::Withdrawn)).await;
        }
    }

    /// Bounds `fut` by the policy's operation timeout. When the deadline passes, `fut` is dropped, which rolls back
    /// any transaction it still has open.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, InterestError>
    where F: Future<Output = Result<T, InterestError>> {
        match tokio::time::timeout(self.policy.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("🔄️⏳️ Operation did not complete within {:?}", self.policy.operation_timeout);
                Err(InterestError::Timeout)
            },
        }
    }
}
