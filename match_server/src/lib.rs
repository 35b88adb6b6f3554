//! # Match server
//! This module hosts the HTTP front end of the match engine. It is responsible for:
//! * Accepting interest submissions and withdrawals on behalf of authenticated users.
//! * Serving read-only stats, matches and the anonymised inbox.
//! * Expiring old matches in the background.
//! * Handing match events to the notification service.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /api/interests`: Signal interest in another member of a shared group.
//! * `DELETE /api/interests/{like_id}`: Withdraw an interest within the grace window.
//! * `POST /api/withdrawals`: Withdraw an interest by naming its target.
//! * `GET /api/eligibility`: Check whether an interest would be accepted.
//! * `GET /api/stats`, `GET /api/matches`, `GET /api/inbox`: Read-only views for the requester.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod notifier;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
