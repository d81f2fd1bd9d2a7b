//! Repository layer for database CRUD operations
//!
//! Provides high-level database operations for schedules.

mod schedule;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

pub use super::error::StorageError;

/// Formats a timestamp the way it is stored
///
/// Fixed-width UTC RFC 3339 with milliseconds, so stored values sort and
/// range-compare correctly as plain text.
pub(super) fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a stored timestamp
pub(super) fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::CorruptRecord(format!("{} '{}': {}", column, raw, e)))
}

/// Drops sub-millisecond precision so returned records match stored ones
pub(super) fn to_stored_precision(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(3)
}

#[cfg(test)]
mod tests;
