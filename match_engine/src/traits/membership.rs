use crate::{
    db_types::{GroupId, GroupMembership, UserId},
    traits::InterestError,
};

/// Answers membership questions against the group subsystem's data. Implementations must be pure queries.
#[allow(async_fn_in_trait)]
pub trait MembershipOracle {
    /// Returns true only if the user holds an `ACTIVE` membership in the group. Pending and removed members are not
    /// members for matching purposes.
    async fn is_active_member(&self, user: &UserId, group: &GroupId) -> Result<bool, InterestError>;

    /// Fetches every membership record for the user, regardless of status.
    async fn memberships_for(&self, user: &UserId) -> Result<Vec<GroupMembership>, InterestError>;
}
