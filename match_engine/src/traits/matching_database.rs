use chrono::{DateTime, Utc};
use mm_common::Credits;
use thiserror::Error;

use crate::{
    db_types::{CancelInterest, GroupId, Match, NewInterest},
    traits::{
        data_objects::{InterestCancelled, InterestRecorded},
        CreditManagement,
        InterestManagement,
        MembershipOracle,
    },
};

/// Every failure the matching engine can report. Each variant maps to a distinct, user-facing outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterestError {
    #[error("You cannot signal interest in yourself.")]
    SelfTarget,
    #[error("Both users must be active members of group {0}.")]
    NotCoMember(GroupId),
    #[error("You have already signalled interest in this user in this group.")]
    DuplicateInterest,
    #[error("You signalled interest in this user recently. You can try again after {retry_after}.")]
    Cooldown { retry_after: DateTime<Utc> },
    #[error("Not enough credits. Signalling interest costs {required}, but you have {available}.")]
    InsufficientCredit { required: Credits, available: Credits },
    #[error("You have reached your limit of {limit} interests for today. The limit resets at {resets_at}.")]
    DailyLimitExceeded { limit: u32, resets_at: DateTime<Utc> },
    #[error("Interests can only be withdrawn within {hours} hours of being sent.")]
    ReversalWindowExpired { hours: i64 },
    #[error("{0} does not exist.")]
    NotFound(String),
    #[error("Only the user that signalled an interest may withdraw it.")]
    Unauthorized,
    #[error("Invalid request. {0}")]
    InvalidRequest(String),
    #[error("The data store could not complete the request. No changes were made. {0}")]
    TransientStore(String),
    #[error("The request did not complete in time. Check the current state before trying again.")]
    Timeout,
}

impl InterestError {
    /// A stable, machine-readable code for the error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SelfTarget => "SELF_TARGET",
            Self::NotCoMember(_) => "NOT_CO_MEMBER",
            Self::DuplicateInterest => "DUPLICATE_INTEREST",
            Self::Cooldown { .. } => "COOLDOWN",
            Self::InsufficientCredit { .. } => "INSUFFICIENT_CREDIT",
            Self::DailyLimitExceeded { .. } => "DAILY_LIMIT_EXCEEDED",
            Self::ReversalWindowExpired { .. } => "REVERSAL_WINDOW_EXPIRED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::TransientStore(_) => "TRANSIENT_STORE",
            Self::Timeout => "TIMEOUT",
        }
    }

    /// True if the request may be repeated unchanged. Every other error is a business rejection that will keep
    /// failing until the state of the system changes.
    ///
    /// A [`InterestError::Timeout`] is *not* retryable as-is: the atomic unit may have committed before the deadline
    /// fired, so the caller must re-query first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStore(_))
    }
}

impl From<sqlx::Error> for InterestError {
    fn from(e: sqlx::Error) -> Self {
        InterestError::TransientStore(e.to_string())
    }
}

/// This trait defines the highest level of behaviour for backends supporting the match engine.
///
/// The two mutating operations, [`record_interest`](MatchingDatabase::record_interest) and
/// [`cancel_interest`](MatchingDatabase::cancel_interest), are each a single atomic unit of work. Either every write
/// in the unit is committed, or none is. Implementations must also serialise decisions for a given unordered pair in
/// a group, so that two users signalling interest in each other at the same moment produce exactly one match.
#[allow(async_fn_in_trait)]
pub trait MatchingDatabase: Clone + InterestManagement + CreditManagement + MembershipOracle {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Records a new interest edge, in a single atomic unit of work:
    /// * Inserts the edge. If an active edge for the same ordered pair and group already exists,
    ///   [`InterestError::DuplicateInterest`] is returned.
    /// * Looks up the reciprocal edge.
    /// * Charges the sender, unless they hold active premium. A charged sender may not exceed the daily quota.
    /// * If the reciprocal edge exists, flags both edges as matched and creates the [`Match`].
    ///
    /// Eligibility checks that do not need the atomic unit (membership, cooldown and so on) are the caller's
    /// responsibility.
    async fn record_interest(&self, interest: NewInterest) -> Result<InterestRecorded, InterestError>;

    /// Withdraws an interest edge, in a single atomic unit of work:
    /// * The requester must be the sender of the edge, and the edge must still be inside the grace window.
    /// * The edge is marked cancelled.
    /// * If the edge was matched, the match is deleted and the reciprocal edge returns to the pending state.
    /// * The credits charged for the edge are refunded.
    async fn cancel_interest(&self, request: CancelInterest) -> Result<InterestCancelled, InterestError>;

    /// Marks every active match created before `cutoff` as expired. Returns the matches that were changed.
    async fn expire_matches(&self, cutoff: DateTime<Utc>, now: DateTime<Utc>) -> Result<Vec<Match>, InterestError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), InterestError> {
        Ok(())
    }
}
