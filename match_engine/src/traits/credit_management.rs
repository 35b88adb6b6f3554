use chrono::{DateTime, Utc};
use mm_common::Credits;

use crate::{
    db_types::{CreditAccount, UserId},
    traits::InterestError,
};

/// The `CreditManagement` trait exposes the credit fields of user accounts.
///
/// Charges for interest signals are *not* part of this trait. They only ever happen inside the atomic unit of
/// [`MatchingDatabase::record_interest`](crate::traits::MatchingDatabase::record_interest), and refunds inside
/// [`MatchingDatabase::cancel_interest`](crate::traits::MatchingDatabase::cancel_interest).
#[allow(async_fn_in_trait)]
pub trait CreditManagement {
    /// Fetches the credit account for the user. Users that have never been funded have no account, and `None` is
    /// returned.
    async fn fetch_credit_account(&self, user: &UserId) -> Result<Option<CreditAccount>, InterestError>;

    /// Adds purchased credits to the user's balance, creating the account if necessary. `amount` must be positive.
    async fn grant_credits(&self, user: &UserId, amount: Credits) -> Result<CreditAccount, InterestError>;

    /// Sets the premium tier flag for the user. A `None` expiry grants premium without a time limit.
    async fn set_premium(
        &self,
        user: &UserId,
        is_premium: bool,
        until: Option<DateTime<Utc>>,
    ) -> Result<CreditAccount, InterestError>;
}
