use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{Duration, TimeZone, Utc};
use match_engine::{
    db_types::{CreditAccount, GroupId, InterestEdge, InterestId, UserId},
    events::EventProducers,
    traits::InterestRecorded,
    InterestError,
    InterestFlowApi,
};
use mm_common::Credits;
use serde_json::{json, Value};

use super::{helpers::send_request, mocks::MockMatchStore};
use crate::routes::{CancelInterestRoute, EligibilityRoute, SubmitInterestRoute};

fn edge(id: i64) -> InterestEdge {
    InterestEdge {
        id: InterestId(id),
        from_user_id: UserId::from("alice"),
        to_user_id: UserId::from("bob"),
        group_id: GroupId::from("hikers"),
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        cancelled_at: None,
        is_match: false,
        credits_charged: Credits::from(1i64),
    }
}

/// A store in which alice and bob share a group and alice can afford an interest.
fn eligible_store() -> MockMatchStore {
    store_with_last_interest(None)
}

/// As [`eligible_store`], but alice last signalled bob with `last`.
fn store_with_last_interest(last: Option<InterestEdge>) -> MockMatchStore {
    let mut store = MockMatchStore::new();
    store.expect_is_active_member().times(2).returning(|_, _| Ok(true));
    store.expect_fetch_active_interest().returning(|_, _, _| Ok(None));
    store.expect_last_interest_for_pair().returning(move |_, _, _| Ok(last.clone()));
    store.expect_fetch_credit_account().returning(|user| {
        let mut account = CreditAccount::empty(user.clone(), Utc::now());
        account.credit_balance = Credits::from(5i64);
        Ok(Some(account))
    });
    store.expect_count_interests_since().returning(|_, _| Ok(0));
    store
}

fn configure_with(store: MockMatchStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = InterestFlowApi::new(store, EventProducers::default());
        cfg.service(SubmitInterestRoute::<MockMatchStore>::new())
            .service(CancelInterestRoute::<MockMatchStore>::new())
            .service(EligibilityRoute::<MockMatchStore>::new())
            .app_data(web::Data::new(api));
    }
}

fn submission() -> TestRequest {
    TestRequest::post().uri("/interests").set_json(json!({ "to_user_id": "bob", "group_id": "hikers" }))
}

#[actix_web::test]
async fn submit_requires_a_requester() {
    let (status, body) = send_request(submission(), None, configure_with(MockMatchStore::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

#[actix_web::test]
async fn submit_interest() {
    let mut store = eligible_store();
    store.expect_record_interest().times(1).returning(|interest| {
        assert_eq!(interest.from_user_id.as_str(), "alice");
        assert_eq!(interest.cost, Credits::from(1i64));
        Ok(InterestRecorded { interest: edge(12), reciprocal: None, new_match: None, charged: Credits::from(1i64) })
    });
    let (status, body) = send_request(submission(), Some("alice"), configure_with(store)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({ "like_id": 12, "is_match": false }));
}

#[actix_web::test]
async fn non_members_are_forbidden() {
    let mut store = MockMatchStore::new();
    store.expect_is_active_member().returning(|user, _| Ok(user.as_str() == "alice"));
    store.expect_fetch_active_interest().returning(|_, _, _| Ok(None));
    store.expect_last_interest_for_pair().returning(|_, _, _| Ok(None));
    store.expect_fetch_credit_account().returning(|_| Ok(None));
    store.expect_count_interests_since().returning(|_, _| Ok(0));
    store.expect_record_interest().never();
    let (status, body) = send_request(submission(), Some("alice"), configure_with(store)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "NOT_CO_MEMBER");
    assert_eq!(body["retryable"], false);
}

#[actix_web::test]
async fn self_target_is_a_bad_request() {
    let store = MockMatchStore::new();
    let req = TestRequest::post().uri("/interests").set_json(json!({ "to_user_id": "alice", "group_id": "hikers" }));
    let (status, body) = send_request(req, Some("alice"), configure_with(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("SELF_TARGET"), "{body}");
}

#[actix_web::test]
async fn cooldown_reports_when_to_retry() {
    let mut last = edge(3);
    last.created_at = Utc::now() - Duration::days(2);
    last.cancelled_at = Some(last.created_at);
    let store = store_with_last_interest(Some(last));
    let (status, body) = send_request(submission(), Some("alice"), configure_with(store)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "COOLDOWN");
    assert!(body["details"]["retry_after"].is_string());
}

#[actix_web::test]
async fn store_contention_is_retryable() {
    let mut store = eligible_store();
    store.expect_record_interest().returning(|_| Err(InterestError::TransientStore("database is locked".into())));
    let (status, body) = send_request(submission(), Some("alice"), configure_with(store)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["retryable"], true);
}

#[actix_web::test]
async fn late_withdrawals_are_gone() {
    let mut store = MockMatchStore::new();
    store.expect_cancel_interest().times(1).returning(|request| {
        assert_eq!(request.interest_id, InterestId(12));
        assert_eq!(request.requester.as_str(), "alice");
        Err(InterestError::ReversalWindowExpired { hours: 24 })
    });
    let req = TestRequest::delete().uri("/interests/12");
    let (status, body) = send_request(req, Some("alice"), configure_with(store)).await;
    assert_eq!(status, StatusCode::GONE);
    assert!(body.contains("REVERSAL_WINDOW_EXPIRED"), "{body}");
}

#[actix_web::test]
async fn withdrawal_needs_a_numeric_like_id() {
    let req = TestRequest::delete().uri("/interests/abc");
    let (status, _) = send_request(req, Some("alice"), configure_with(MockMatchStore::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn eligibility_check_writes_nothing() {
    let mut store = eligible_store();
    store.expect_record_interest().never();
    let req = TestRequest::get().uri("/eligibility?to_user_id=bob&group_id=hikers");
    let (status, body) = send_request(req, Some("alice"), configure_with(store)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], true);
}
