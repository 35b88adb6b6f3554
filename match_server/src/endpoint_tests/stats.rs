use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use match_engine::{
    db_types::{GroupId, InterestStats, ReceivedInterest},
    StatsApi,
};
use serde_json::{json, Value};

use super::{helpers::send_request, mocks::MockInterestManager};
use crate::routes::{MyInboxRoute, MyMatchesRoute, MyStatsRoute};

fn configure_with(manager: MockInterestManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = StatsApi::new(manager);
        cfg.service(MyStatsRoute::<MockInterestManager>::new())
            .service(MyMatchesRoute::<MockInterestManager>::new())
            .service(MyInboxRoute::<MockInterestManager>::new())
            .app_data(web::Data::new(api));
    }
}

#[actix_web::test]
async fn stats_for_the_requester() {
    let mut manager = MockInterestManager::new();
    manager
        .expect_stats_for_user()
        .withf(|user| user.as_str() == "alice")
        .times(1)
        .returning(|_| Ok(InterestStats { sent: 3, received: 2, matches: 1 }));
    let req = TestRequest::get().uri("/stats");
    let (status, body) = send_request(req, Some("alice"), configure_with(manager)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({ "sent": 3, "received": 2, "matches": 1 }));
}

#[actix_web::test]
async fn stats_require_a_requester() {
    let mut manager = MockInterestManager::new();
    manager.expect_stats_for_user().never();
    let (status, _) = send_request(TestRequest::get().uri("/stats"), None, configure_with(manager)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn inbox_never_names_the_sender() {
    let mut manager = MockInterestManager::new();
    manager.expect_interests_received().returning(|_| {
        Ok(vec![ReceivedInterest {
            group_id: GroupId::from("hikers"),
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        }])
    });
    let (status, body) = send_request(TestRequest::get().uri("/inbox"), Some("bob"), configure_with(manager)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!([{ "group_id": "hikers", "created_at": "2024-06-01T12:00:00Z" }]));
}

#[actix_web::test]
async fn store_failures_are_reported() {
    let mut manager = MockInterestManager::new();
    manager
        .expect_fetch_matches_for_user()
        .returning(|_| Err(match_engine::InterestError::TransientStore("disk I/O error".into())));
    let (status, body) = send_request(TestRequest::get().uri("/matches"), Some("bob"), configure_with(manager)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("TRANSIENT_STORE"), "{body}");
}
