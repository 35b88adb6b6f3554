//! Helpers for tests that need a real database. Enabled with the `test_utils` feature.
pub mod clock;
pub mod prepare_env;
pub mod seed;
