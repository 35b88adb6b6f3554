//! Match Engine
//!
//! The match engine is the core of an anonymous, group-scoped matching service. Users signal one-directional
//! interest in other members of a group they share. When two users have each signalled interest in the other, the
//! engine recognises the match exactly once, persists it, and notifies both parties. Submissions are metered by a
//! credit balance and a daily quota, with premium users exempt from both, and are guarded by a re-signal cooldown.
//!
//! The library is divided into these sections:
//! 1. Backend contracts ([`mod@traits`]) and the SQLite backend ([`SqliteDatabase`]). You should not need to call the
//!    backend directly. Use the public API instead. The data types stored by the backend are public, in [`db_types`].
//! 2. The public API ([`mod@mm_api`]). [`InterestFlowApi`] handles submissions, withdrawals and match expiry.
//!    [`StatsApi`] provides read-only views.
//! 3. Events ([`mod@events`]). Matching outcomes are published after they commit. A [`events::Notifier`] can be
//!    plugged in with a [`events::NotificationDispatcher`] to tell users about them.
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod mm_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use mm_api::{
    eligibility::EligibilitySnapshot,
    interest_flow_api::InterestFlowApi,
    interest_objects::{CancelInterestResult, SubmitInterestResult},
    policy::MatchPolicy,
    stats_api::StatsApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{CreditManagement, InterestError, InterestManagement, MatchingDatabase, MembershipOracle};
