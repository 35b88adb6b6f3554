use std::fmt::Display;

use match_engine::db_types::{GroupId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// Names the target of an interest. The sender is always the requester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestTarget {
    pub to_user_id: UserId,
    pub group_id: GroupId,
}
