use chrono::Duration;
use cucumber::{then, when};
use match_engine::{
    db_types::{GroupId, MatchStatus, PairKey, UserId},
    CreditManagement,
    InterestFlowApi,
    InterestManagement,
    SqliteDatabase,
};
use mm_common::Credits;

use crate::cucumber::MatchWorld;

#[when(expr = "{word} signals interest in {word} in '{word}'")]
async fn signal_interest(world: &mut MatchWorld, from: String, to: String, group: String) {
    let result = world.api().submit_interest(&UserId::from(from), &UserId::from(to), &GroupId::from(group)).await;
    world.last_submission = Some(result);
}

#[when(expr = "{word} and {word} signal interest in each other in '{word}' at the same time")]
async fn simultaneous(world: &mut MatchWorld, a: String, b: String, group: String) {
    let (a, b, group) = (UserId::from(a), UserId::from(b), GroupId::from(group));
    let api: &InterestFlowApi<SqliteDatabase> = world.api();
    let (first, second) = tokio::join!(api.submit_interest(&a, &b, &group), api.submit_interest(&b, &a, &group));
    first.expect("first submission failed");
    second.expect("second submission failed");
}

#[when(expr = "{word} withdraws the interest in {word} in '{word}'")]
async fn withdraw(world: &mut MatchWorld, from: String, to: String, group: String) {
    let like_id = world.like_id(&from, &to, &group).await;
    let result = world.api().cancel_interest(like_id, &UserId::from(from)).await;
    world.last_cancellation = Some(result);
}

#[when(expr = "{int} minutes pass")]
async fn minutes_pass(world: &mut MatchWorld, minutes: i64) {
    world.clock().advance(Duration::minutes(minutes));
}

#[when(expr = "{int} hour(s) pass")]
async fn hours_pass(world: &mut MatchWorld, hours: i64) {
    world.clock().advance(Duration::hours(hours));
}

#[when(expr = "{int} days pass")]
async fn days_pass(world: &mut MatchWorld, days: i64) {
    world.clock().advance(Duration::days(days));
}

#[when(expr = "matches older than {int} days are expired")]
async fn expire(world: &mut MatchWorld, days: i64) {
    world.api().expire_matches(Duration::days(days)).await.expect("Error expiring matches");
}

#[then("the interest is recorded without a match")]
async fn recorded_without_match(world: &mut MatchWorld) {
    let result = world.submission().as_ref().expect("Submission failed");
    assert!(!result.is_match);
    assert!(result.match_id.is_none());
}

#[then("the interest creates a match")]
async fn recorded_with_match(world: &mut MatchWorld) {
    let result = world.submission().as_ref().expect("Submission failed");
    assert!(result.is_match);
    assert!(result.match_id.is_some());
}

#[then(expr = "the submission is refused with {word}")]
async fn refused(world: &mut MatchWorld, code: String) {
    match world.submission() {
        Ok(r) => panic!("Submission unexpectedly succeeded: {r:?}"),
        Err(e) => assert_eq!(e.code(), code, "Unexpected error: {e}"),
    }
}

#[then("the withdrawal succeeds")]
async fn withdrawal_succeeds(world: &mut MatchWorld) {
    let result = world.last_cancellation.as_ref().expect("Nothing was withdrawn");
    assert!(result.is_ok(), "{result:?}");
}

#[then(expr = "the withdrawal is refused with {word}")]
async fn withdrawal_refused(world: &mut MatchWorld, code: String) {
    match world.last_cancellation.as_ref().expect("Nothing was withdrawn") {
        Ok(r) => panic!("Withdrawal unexpectedly succeeded: {r:?}"),
        Err(e) => assert_eq!(e.code(), code, "Unexpected error: {e}"),
    }
}

#[then(expr = "{word} has a balance of {int} credit(s)")]
async fn check_balance(world: &mut MatchWorld, user: String, credits: i64) {
    let account = world.api().db().fetch_credit_account(&UserId::from(user.as_str())).await.expect("Error fetching");
    let balance = account.map(|a| a.credit_balance).unwrap_or_default();
    assert_eq!(balance, Credits::from(credits), "Balance for {user} is incorrect");
}

async fn current_match_status(world: &MatchWorld, a: &str, b: &str, group: &str) -> Option<MatchStatus> {
    let pair = PairKey::new(&UserId::from(a), &UserId::from(b));
    let group = GroupId::from(group);
    world.api().db().fetch_current_match(&pair, &group).await.expect("Error fetching match").map(|m| m.status)
}

#[then(expr = "{word} and {word} have an active match in '{word}'")]
async fn active_match(world: &mut MatchWorld, a: String, b: String, group: String) {
    assert_eq!(current_match_status(world, &a, &b, &group).await, Some(MatchStatus::Active));
}

#[then(expr = "{word} and {word} have an expired match in '{word}'")]
async fn expired_match(world: &mut MatchWorld, a: String, b: String, group: String) {
    assert_eq!(current_match_status(world, &a, &b, &group).await, Some(MatchStatus::Expired));
}

#[then(expr = "{word} and {word} have no match in '{word}'")]
async fn no_match(world: &mut MatchWorld, a: String, b: String, group: String) {
    assert_eq!(current_match_status(world, &a, &b, &group).await, None);
}

#[then(expr = "{word} has {int} active match(es)")]
async fn match_count(world: &mut MatchWorld, user: String, count: usize) {
    let matches = world.api().db().fetch_matches_for_user(&UserId::from(user)).await.expect("Error fetching matches");
    assert_eq!(matches.len(), count);
}
