//! # Backend contracts
//!
//! This module defines the behaviour a persistence collaborator must expose in order to act as a backend for the
//! match engine.
//!
//! * [`MembershipOracle`] answers "is user U an active member of group G?". It owns no state; group membership is
//!   read-only input owned by the group subsystem.
//! * [`CreditManagement`] exposes the credit fields of a user account (balance and premium tier).
//! * [`InterestManagement`] provides read-only queries over interest edges and matches.
//! * [`MatchingDatabase`] is the highest level of behaviour. It supplies the atomic units of work that record and
//!   cancel interest edges, and the time-based match expiry sweep.
//!
//! All failures are reported with [`InterestError`], which carries the full error taxonomy of the engine.
mod credit_management;
mod data_objects;
mod interest_management;
mod matching_database;
mod membership;

pub use credit_management::CreditManagement;
pub use data_objects::{InterestCancelled, InterestRecorded};
pub use interest_management::InterestManagement;
pub use matching_database::{InterestError, MatchingDatabase};
pub use membership::MembershipOracle;
