use chrono::{DateTime, Utc};
use log::{debug, trace};
use mm_common::Credits;
use sqlx::SqliteConnection;

use crate::{
    db_types::{CreditAccount, UserId},
    traits::InterestError,
};

pub async fn fetch_credit_account(
    user: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Option<CreditAccount>, sqlx::Error> {
    let account = sqlx::query_as("SELECT * FROM credit_accounts WHERE user_id = $1")
        .bind(user.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(account)
}

/// Adds `amount` to the user's balance, creating the account if it does not exist yet.
pub async fn credit(
    user: &UserId,
    amount: Credits,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<CreditAccount, sqlx::Error> {
    let account = sqlx::query_as(
        r#"
            INSERT INTO credit_accounts (user_id, credit_balance, is_premium, updated_at) VALUES ($1, $2, FALSE, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                credit_balance = credit_balance + excluded.credit_balance,
                updated_at = excluded.updated_at
            RETURNING *;
        "#,
    )
    .bind(user.as_str())
    .bind(amount.value())
    .bind(now)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ {amount} added to the balance of {user}");
    Ok(account)
}

/// Removes `amount` from the user's balance, but only if the balance covers it. Returns the updated account, or
/// `None` if the balance was too low (or the account does not exist). Nothing is changed in that case.
pub async fn debit(
    user: &UserId,
    amount: Credits,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<CreditAccount>, sqlx::Error> {
    let account = sqlx::query_as(
        r#"
            UPDATE credit_accounts SET credit_balance = credit_balance - $1, updated_at = $2
            WHERE user_id = $3 AND credit_balance >= $1
            RETURNING *;
        "#,
    )
    .bind(amount.value())
    .bind(now)
    .bind(user.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(account)
}

/// What a new interest cost its sender, and whether the sender held premium when it was charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestCharge {
    pub amount: Credits,
    pub premium: bool,
}

/// Charges the user for a new interest, taking the premium tier into account. Premium users are never charged.
pub async fn charge_for_interest(
    user: &UserId,
    cost: Credits,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<InterestCharge, InterestError> {
    let account = fetch_credit_account(user, conn).await?.unwrap_or_else(|| CreditAccount::empty(user.clone(), now));
    let premium = account.has_active_premium(now);
    let amount = account.cost_of_interest(cost, now);
    if amount.is_zero() {
        trace!("🗃️ No charge to {user} for this interest. Premium: {premium}");
        return Ok(InterestCharge { amount, premium });
    }
    match debit(user, amount, now, conn).await? {
        Some(account) => {
            debug!("🗃️ Charged {user} {amount}. {} remaining.", account.credit_balance);
            Ok(InterestCharge { amount, premium })
        },
        None => Err(InterestError::InsufficientCredit { required: amount, available: account.credit_balance }),
    }
}

pub async fn set_premium(
    user: &UserId,
    is_premium: bool,
    until: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<CreditAccount, sqlx::Error> {
    let account = sqlx::query_as(
        r#"
            INSERT INTO credit_accounts (user_id, credit_balance, is_premium, premium_until, updated_at)
            VALUES ($1, 0, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                is_premium = excluded.is_premium,
                premium_until = excluded.premium_until,
                updated_at = excluded.updated_at
            RETURNING *;
        "#,
    )
    .bind(user.as_str())
    .bind(is_premium)
    .bind(until)
    .bind(now)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Premium tier for {user} set to {is_premium} (until {until:?})");
    Ok(account)
}

/// Overwrites the whole credit account. Used to mirror the account subsystem's state.
pub async fn upsert_credit_account(
    account: &CreditAccount,
    conn: &mut SqliteConnection,
) -> Result<CreditAccount, sqlx::Error> {
    let account = sqlx::query_as(
        r#"
            INSERT INTO credit_accounts (user_id, credit_balance, is_premium, premium_until, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                credit_balance = excluded.credit_balance,
                is_premium = excluded.is_premium,
                premium_until = excluded.premium_until,
                updated_at = excluded.updated_at
            RETURNING *;
        "#,
    )
    .bind(account.user_id.as_str())
    .bind(account.credit_balance.value())
    .bind(account.is_premium)
    .bind(account.premium_until)
    .bind(account.updated_at)
    .fetch_one(conn)
    .await?;
    Ok(account)
}
