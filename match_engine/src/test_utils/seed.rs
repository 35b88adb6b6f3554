use chrono::{DateTime, Utc};
use mm_common::Credits;

use crate::{
    db_types::{CreditAccount, GroupId, MembershipStatus, UserId},
    SqliteDatabase,
};

/// Makes every user in `users` an active member of `group`.
pub async fn seed_group(db: &SqliteDatabase, group: &str, users: &[&str]) {
    let group = GroupId::from(group);
    for user in users {
        db.upsert_membership(&UserId::from(*user), &group, MembershipStatus::Active)
            .await
            .expect("Error seeding group membership");
    }
}

/// Sets the user's balance and premium state.
pub async fn seed_account(
    db: &SqliteDatabase,
    user: &str,
    credits: i64,
    premium_until: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> CreditAccount {
    let account = CreditAccount {
        user_id: UserId::from(user),
        credit_balance: Credits::from(credits),
        is_premium: premium_until.is_some(),
        premium_until,
        updated_at: now,
    };
    db.upsert_credit_account(&account).await.expect("Error seeding credit account")
}
