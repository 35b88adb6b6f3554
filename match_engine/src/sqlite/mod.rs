//! SQLite backend for the match engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
