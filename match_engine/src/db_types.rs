use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use mm_common::Credits;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------        UserId         ---------------------------------------------------------
/// An opaque user identifier, owned by the account subsystem.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------        GroupId        ---------------------------------------------------------
/// An opaque group identifier, owned by the group subsystem.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------   InterestId/MatchId  ---------------------------------------------------------
/// The primary key of an interest edge. This is the `likeId` handed back to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct InterestId(pub i64);

impl Display for InterestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for InterestId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_start_matches('#').parse::<i64>().map(Self).map_err(|e| ConversionError(format!("{s}: {e}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct MatchId(pub i64);

impl Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------       PairKey         ---------------------------------------------------------
/// The canonical key for an unordered pair of users. The lexicographically smaller id is always stored first, so
/// `PairKey::new(a, b) == PairKey::new(b, a)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    low: UserId,
    high: UserId,
}

impl PairKey {
    pub fn new(a: &UserId, b: &UserId) -> Self {
        if a <= b {
            Self { low: a.clone(), high: b.clone() }
        } else {
            Self { low: b.clone(), high: a.clone() }
        }
    }

    pub fn low(&self) -> &UserId {
        &self.low
    }

    pub fn high(&self) -> &UserId {
        &self.high
    }
}

impl Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}|{}]", self.low, self.high)
    }
}

//--------------------------------------   MembershipStatus    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MembershipStatus {
    Active,
    Pending,
    Removed,
}

impl Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MembershipStatus::Active => write!(f, "ACTIVE"),
            MembershipStatus::Pending => write!(f, "PENDING"),
            MembershipStatus::Removed => write!(f, "REMOVED"),
        }
    }
}

impl FromStr for MembershipStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "PENDING" => Ok(Self::Pending),
            "REMOVED" => Ok(Self::Removed),
            s => Err(ConversionError(format!("Invalid membership status: {s}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct GroupMembership {
    pub user_id: UserId,
    pub group_id: GroupId,
    pub status: MembershipStatus,
}

//--------------------------------------     MatchStatus       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchStatus {
    /// Both users have signalled interest in each other and neither has withdrawn.
    Active,
    /// The match was ended by the time-based cleanup job.
    Expired,
    /// The match was torn down because one of its interest edges was cancelled.
    Deleted,
}

impl Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Active => write!(f, "ACTIVE"),
            MatchStatus::Expired => write!(f, "EXPIRED"),
            MatchStatus::Deleted => write!(f, "DELETED"),
        }
    }
}

impl FromStr for MatchStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "EXPIRED" => Ok(Self::Expired),
            "DELETED" => Ok(Self::Deleted),
            s => Err(ConversionError(format!("Invalid match status: {s}"))),
        }
    }
}

//--------------------------------------     InterestEdge      ---------------------------------------------------------
/// A directed interest signal from one user to another, scoped to a group.
///
/// Edges are never physically deleted. Cancelling an edge sets `cancelled_at`, which keeps the record available for
/// audit and notification history.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct InterestEdge {
    pub id: InterestId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub is_match: bool,
    /// The amount taken from the sender's balance when this edge was created.
    pub credits_charged: Credits,
}

impl InterestEdge {
    pub fn is_active(&self) -> bool {
        self.cancelled_at.is_none()
    }

    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.from_user_id, &self.to_user_id)
    }

    /// True if `now` is still inside the window that started when this edge was created.
    pub fn is_within(&self, window: Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at <= window
    }
}

//--------------------------------------         Match         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    /// The lexicographically smaller user id of the pair.
    pub user_a: UserId,
    /// The lexicographically larger user id of the pair.
    pub user_b: UserId,
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: MatchStatus,
}

impl Match {
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.user_a, &self.user_b)
    }

    pub fn involves(&self, user: &UserId) -> bool {
        &self.user_a == user || &self.user_b == user
    }

    pub fn partner_of(&self, user: &UserId) -> Option<&UserId> {
        if &self.user_a == user {
            Some(&self.user_b)
        } else if &self.user_b == user {
            Some(&self.user_a)
        } else {
            None
        }
    }
}

//--------------------------------------     CreditAccount     ---------------------------------------------------------
/// The credit fields of a user account. The account subsystem owns the user; this engine only reads and mutates
/// the balance.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CreditAccount {
    pub user_id: UserId,
    pub credit_balance: Credits,
    pub is_premium: bool,
    pub premium_until: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl CreditAccount {
    /// An account that has never been funded. Users without a credit record are treated as having this account.
    pub fn empty(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self { user_id, credit_balance: Credits::ZERO, is_premium: false, premium_until: None, updated_at: now }
    }

    /// Premium tier is only honoured while `premium_until` lies in the future. A premium flag without an expiry
    /// date never lapses.
    pub fn has_active_premium(&self, now: DateTime<Utc>) -> bool {
        self.is_premium && self.premium_until.map_or(true, |until| until > now)
    }

    /// The amount a new interest signal costs this user.
    pub fn cost_of_interest(&self, cost: Credits, now: DateTime<Utc>) -> Credits {
        if self.has_active_premium(now) {
            Credits::ZERO
        } else {
            cost
        }
    }
}

//--------------------------------------   Atomic-unit inputs  ---------------------------------------------------------
/// The daily quota that applies to non-premium submissions. `window_start` is the most recent local
/// midnight and `resets_at` the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyQuota {
    pub limit: u32,
    pub window_start: DateTime<Utc>,
    pub resets_at: DateTime<Utc>,
}

/// A validated interest submission, ready to be recorded in a single atomic unit of work.
#[derive(Debug, Clone)]
pub struct NewInterest {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
    /// The non-premium cost of the interest.
    pub cost: Credits,
    pub daily_quota: DailyQuota,
}

impl NewInterest {
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.from_user_id, &self.to_user_id)
    }
}

/// A request to withdraw an interest edge.
#[derive(Debug, Clone)]
pub struct CancelInterest {
    pub interest_id: InterestId,
    pub requester: UserId,
    pub requested_at: DateTime<Utc>,
    pub grace_window: Duration,
}

//--------------------------------------     Read models       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct InterestStats {
    /// Non-cancelled interest edges sent by the user.
    pub sent: i64,
    /// Non-cancelled interest edges addressed to the user.
    pub received: i64,
    /// Active matches involving the user.
    pub matches: i64,
}

/// An interest addressed to a user, with the sender's identity withheld.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ReceivedInterest {
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn pair_key_is_canonical() {
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");
        let k1 = PairKey::new(&alice, &bob);
        let k2 = PairKey::new(&bob, &alice);
        assert_eq!(k1, k2);
        assert_eq!(k1.low(), &alice);
        assert_eq!(k1.high(), &bob);
        assert_eq!(k1.to_string(), "[alice|bob]");
    }

    #[test]
    fn premium_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut account = CreditAccount::empty(UserId::from("alice"), now);
        assert!(!account.has_active_premium(now));
        assert_eq!(account.cost_of_interest(Credits::from(1i64), now), Credits::from(1i64));
        account.is_premium = true;
        assert!(account.has_active_premium(now));
        account.premium_until = Some(now - Duration::minutes(1));
        assert!(!account.has_active_premium(now));
        account.premium_until = Some(now + Duration::days(3));
        assert!(account.has_active_premium(now));
        assert_eq!(account.cost_of_interest(Credits::from(1i64), now), Credits::ZERO);
    }

    #[test]
    fn statuses_round_trip_through_strings() {
        assert_eq!("active".parse::<MatchStatus>().unwrap(), MatchStatus::Active);
        assert_eq!(MatchStatus::Deleted.to_string(), "DELETED");
        assert_eq!("REMOVED".parse::<MembershipStatus>().unwrap(), MembershipStatus::Removed);
        assert!("gone".parse::<MembershipStatus>().is_err());
        assert_eq!("#42".parse::<InterestId>().unwrap(), InterestId(42));
    }
}
