//! The eligibility gate.
//!
//! Before anything is written, a submission must pass six checks, which short-circuit in this order:
//!
//! 1. The sender is not the target ([`InterestError::SelfTarget`]).
//! 2. Both users are active members of the group ([`InterestError::NotCoMember`]).
//! 3. No pending edge (live and not yet matched) from sender to target exists in the group
//!    ([`InterestError::DuplicateInterest`]). A matched edge falls through to the cooldown check, so a user repeating
//!    a signal toward a match sees the cooldown. The store still refuses a second live edge.
//! 4. The sender has not signalled the target in this group within the cooldown, cancelled signals included
//!    ([`InterestError::Cooldown`]).
//! 5. The sender can pay, or holds active premium ([`InterestError::InsufficientCredit`]).
//! 6. A non-premium sender has not exhausted today's quota ([`InterestError::DailyLimitExceeded`]).
//!
//! Evaluation is pure. The caller gathers an [`EligibilitySnapshot`] and [`MatchPolicy::evaluate`] decides. Checks 3,
//! 5 and 6 are repeated inside the atomic unit of work, since the snapshot may be stale by the time the write happens.
use chrono::{DateTime, Utc};

use crate::{
    db_types::{CreditAccount, GroupId, UserId},
    mm_api::policy::MatchPolicy,
    traits::InterestError,
};

/// Everything the gate needs to know about a submission, read before the atomic unit starts.
#[derive(Debug, Clone)]
pub struct EligibilitySnapshot {
    pub from: UserId,
    pub to: UserId,
    pub group: GroupId,
    pub now: DateTime<Utc>,
    pub from_is_member: bool,
    pub to_is_member: bool,
    /// The sender has a live, unmatched edge toward the target.
    pub has_pending_interest: bool,
    /// When the sender last signalled the target in this group, cancelled or not.
    pub last_signalled_at: Option<DateTime<Utc>>,
    pub account: CreditAccount,
    /// Live edges the sender has created since the start of the current local day.
    pub sent_today: i64,
}

impl MatchPolicy {
    pub fn evaluate(&self, snapshot: &EligibilitySnapshot) -> Result<(), InterestError> {
        let s = snapshot;
        if s.from == s.to {
            return Err(InterestError::SelfTarget);
        }
        if !(s.from_is_member && s.to_is_member) {
            return Err(InterestError::NotCoMember(s.group.clone()));
        }
        if s.has_pending_interest {
            return Err(InterestError::DuplicateInterest);
        }
        if let Some(last) = s.last_signalled_at {
            let retry_after = last + self.cooldown;
            if s.now < retry_after {
                return Err(InterestError::Cooldown { retry_after });
            }
        }
        let required = s.account.cost_of_interest(self.interest_cost, s.now);
        if s.account.credit_balance < required {
            return Err(InterestError::InsufficientCredit { required, available: s.account.credit_balance });
        }
        if !s.account.has_active_premium(s.now) && s.sent_today >= i64::from(self.daily_limit) {
            let quota = self.daily_quota(s.now);
            return Err(InterestError::DailyLimitExceeded { limit: quota.limit, resets_at: quota.resets_at });
        }
        Ok(())
    }
}
