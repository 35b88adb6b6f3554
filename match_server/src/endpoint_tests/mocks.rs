use chrono::{DateTime, Utc};
use match_engine::{
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
        NewInterest,
        PairKey,
        ReceivedInterest,
        UserId,
    },
    traits::{InterestCancelled, InterestRecorded},
    CreditManagement,
    InterestError,
    InterestManagement,
    MatchingDatabase,
    MembershipOracle,
};
use mm_common::Credits;
use mockall::mock;

mock! {
    pub InterestManager {}
    impl InterestManagement for InterestManager {
        async fn fetch_interest(&self, id: InterestId) -> Result<Option<InterestEdge>, InterestError>;
        async fn fetch_active_interest(&self, from: &UserId, to: &UserId, group: &GroupId) -> Result<Option<InterestEdge>, InterestError>;
        async fn last_interest_for_pair(&self, from: &UserId, to: &UserId, group: &GroupId) -> Result<Option<InterestEdge>, InterestError>;
        async fn count_interests_since(&self, user: &UserId, since: DateTime<Utc>) -> Result<i64, InterestError>;
        async fn fetch_match(&self, id: MatchId) -> Result<Option<Match>, InterestError>;
        async fn fetch_current_match(&self, pair: &PairKey, group: &GroupId) -> Result<Option<Match>, InterestError>;
        async fn fetch_matches_for_user(&self, user: &UserId) -> Result<Vec<Match>, InterestError>;
        async fn stats_for_user(&self, user: &UserId) -> Result<InterestStats, InterestError>;
        async fn interests_received(&self, user: &UserId) -> Result<Vec<ReceivedInterest>, InterestError>;
    }
}

mock! {
    pub MatchStore {}
    impl Clone for MatchStore {
        fn clone(&self) -> Self;
    }
    impl InterestManagement for MatchStore {
        async fn fetch_interest(&self, id: InterestId) -> Result<Option<InterestEdge>, InterestError>;
        async fn fetch_active_interest(&self, from: &UserId, to: &UserId, group: &GroupId) -> Result<Option<InterestEdge>, InterestError>;
        async fn last_interest_for_pair(&self, from: &UserId, to: &UserId, group: &GroupId) -> Result<Option<InterestEdge>, InterestError>;
        async fn count_interests_since(&self, user: &UserId, since: DateTime<Utc>) -> Result<i64, InterestError>;
        async fn fetch_match(&self, id: MatchId) -> Result<Option<Match>, InterestError>;
        async fn fetch_current_match(&self, pair: &PairKey, group: &GroupId) -> Result<Option<Match>, InterestError>;
        async fn fetch_matches_for_user(&self, user: &UserId) -> Result<Vec<Match>, InterestError>;
        async fn stats_for_user(&self, user: &UserId) -> Result<InterestStats, InterestError>;
        async fn interests_received(&self, user: &UserId) -> Result<Vec<ReceivedInterest>, InterestError>;
    }
    impl CreditManagement for MatchStore {
        async fn fetch_credit_account(&self, user: &UserId) -> Result<Option<CreditAccount>, InterestError>;
        async fn grant_credits(&self, user: &UserId, amount: Credits) -> Result<CreditAccount, InterestError>;
        async fn set_premium(&self, user: &UserId, is_premium: bool, until: Option<DateTime<Utc>>) -> Result<CreditAccount, InterestError>;
    }
    impl MembershipOracle for MatchStore {
        async fn is_active_member(&self, user: &UserId, group: &GroupId) -> Result<bool, InterestError>;
        async fn memberships_for(&self, user: &UserId) -> Result<Vec<GroupMembership>, InterestError>;
    }
    impl MatchingDatabase for MatchStore {
        fn url(&self) -> &str;
        async fn record_interest(&self, interest: NewInterest) -> Result<InterestRecorded, InterestError>;
        async fn cancel_interest(&self, request: CancelInterest) -> Result<InterestCancelled, InterestError>;
        async fn expire_matches(&self, cutoff: DateTime<Utc>, now: DateTime<Utc>) -> Result<Vec<Match>, InterestError>;
    }
}
