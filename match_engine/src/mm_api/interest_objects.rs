use mm_common::Credits;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{InterestId, MatchId},
    traits::{InterestCancelled, InterestRecorded},
};

/// The reply to an interest submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitInterestResult {
    pub like_id: InterestId,
    pub is_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<MatchId>,
}

impl From<&InterestRecorded> for SubmitInterestResult {
    fn from(recorded: &InterestRecorded) -> Self {
        Self {
            like_id: recorded.interest.id,
            is_match: recorded.is_match(),
            match_id: recorded.new_match.as_ref().map(|m| m.id),
        }
    }
}

/// The reply to an interest withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelInterestResult {
    pub message: String,
    pub refunded: Credits,
    pub match_ended: bool,
}

impl From<&InterestCancelled> for CancelInterestResult {
    fn from(cancelled: &InterestCancelled) -> Self {
        let match_ended = cancelled.ended_match.is_some();
        let message = match (match_ended, cancelled.refunded.is_zero()) {
            (true, true) => "Interest withdrawn. The match has ended.".to_string(),
            (true, false) => format!("Interest withdrawn. The match has ended and {} refunded.", cancelled.refunded),
            (false, true) => "Interest withdrawn.".to_string(),
            (false, false) => format!("Interest withdrawn. {} refunded.", cancelled.refunded),
        };
        Self { message, refunded: cancelled.refunded, match_ended }
    }
}
