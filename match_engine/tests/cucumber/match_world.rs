use std::sync::Arc;

use cucumber::World;
use log::*;
use match_engine::{
    db_types::{GroupId, InterestId, UserId},
    events::EventProducers,
    test_utils::{
        clock::ManualClock,
        prepare_env::{prepare_test_env, random_db_path},
    },
    CancelInterestResult,
    InterestError,
    InterestFlowApi,
    SqliteDatabase,
    SubmitInterestResult,
};

#[derive(Default, Debug, World)]
pub struct MatchWorld {
    pub system: Option<MatchSystem>,
    pub last_submission: Option<Result<SubmitInterestResult, InterestError>>,
    pub last_cancellation: Option<Result<CancelInterestResult, InterestError>>,
}

#[derive(Debug)]
pub struct MatchSystem {
    pub db_path: String,
    pub clock: ManualClock,
    pub api: InterestFlowApi<SqliteDatabase>,
}

impl MatchWorld {
    pub fn system(&self) -> &MatchSystem {
        self.system.as_ref().expect("Matching system not initialised")
    }

    pub fn api(&self) -> &InterestFlowApi<SqliteDatabase> {
        &self.system().api
    }

    pub fn clock(&self) -> &ManualClock {
        &self.system().clock
    }

    pub fn submission(&self) -> &Result<SubmitInterestResult, InterestError> {
        self.last_submission.as_ref().expect("No interest has been submitted")
    }

    /// The id of the live interest from `from` toward `to` in `group`.
    pub async fn like_id(&self, from: &str, to: &str, group: &str) -> InterestId {
        use match_engine::InterestManagement;
        let (from, to, group) = (UserId::from(from), UserId::from(to), GroupId::from(group));
        self.api()
            .db()
            .fetch_active_interest(&from, &to, &group)
            .await
            .expect("Error fetching interest")
            .unwrap_or_else(|| panic!("No live interest from {from} toward {to} in {group}"))
            .id
    }
}

impl MatchSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let clock = ManualClock::default();
        let db = SqliteDatabase::new_with_url(&url, 5)
            .await
            .expect("Error creating connection to database")
            .with_clock(Arc::new(clock.clone()));
        debug!("Created database: {url}");
        let api = InterestFlowApi::new(db, EventProducers::default()).with_clock(Arc::new(clock.clone()));
        Self { db_path: url, clock, api }
    }
}
