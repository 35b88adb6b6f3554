//! # Match engine public API
//!
//! The `mm_api` module exposes the programmatic API for the match engine.
//!
//! * [`interest_flow_api`] is the primary API. It accepts interest submissions and withdrawals, runs the eligibility
//!   gate, drives the atomic units of work on the backend and publishes matching events.
//! * [`stats_api`] provides read-only views: interest counters, active matches and the anonymised inbox.
//! * [`policy`] holds the deployment-tunable rules (cooldown, quota, grace window, cost, time zone).
//! * [`eligibility`] is the pure, side-effect free eligibility gate.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits the API needs.
//!
//! ```rust,ignore
//! use match_engine::{InterestFlowApi, SqliteDatabase, events::EventProducers};
//! let db = SqliteDatabase::new_with_url("sqlite://data/match_store.db", 25).await?;
//! let api = InterestFlowApi::new(db, EventProducers::default());
//! let result = api.submit_interest(&alice, &bob, &hikers).await?;
//! ```
pub mod eligibility;
pub mod interest_flow_api;
pub mod interest_objects;
pub mod policy;
pub mod stats_api;
