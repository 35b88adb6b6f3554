use mm_common::Credits;
use serde::{Deserialize, Serialize};

use crate::db_types::{InterestEdge, Match};

/// The outcome of a committed [`record_interest`](crate::traits::MatchingDatabase::record_interest) call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRecorded {
    /// The newly created edge.
    pub interest: InterestEdge,
    /// The reciprocal edge, if one existed. It has been promoted to `is_match = true`.
    pub reciprocal: Option<InterestEdge>,
    /// The match created for the pair, if the reciprocal edge existed.
    pub new_match: Option<Match>,
    pub charged: Credits,
}

impl InterestRecorded {
    pub fn is_match(&self) -> bool {
        self.new_match.is_some()
    }
}

/// The outcome of a committed [`cancel_interest`](crate::traits::MatchingDatabase::cancel_interest) call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestCancelled {
    /// The cancelled edge.
    pub interest: InterestEdge,
    /// The match that was torn down, if the edge was matched.
    pub ended_match: Option<Match>,
    /// The reciprocal edge, returned to the "interest pending" state.
    pub restored: Option<InterestEdge>,
    pub refunded: Credits,
}
