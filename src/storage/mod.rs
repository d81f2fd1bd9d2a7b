//! Local storage module for Schedule Board
//!
//! Provides SQLite-based persistence for schedules. The analytics engine
//! never touches this layer directly; it receives snapshots fetched here.

mod database;
mod error;
mod repository;

pub use database::Database;
pub use error::StorageError;
