//! Incoming timestamp parsing
//!
//! Request payloads may carry RFC 3339 timestamps with an offset, or local
//! date-times without one (`2026-03-20T09:00`, `2026-03-20T09:00:00.000`).
//! Values without an offset are taken as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer};

/// Parse a request timestamp to DateTime<Utc>
pub fn parse_utc(timestamp: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f").map(|ndt| ndt.and_utc())
        })
        .or_else(|_| NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M").map(|ndt| ndt.and_utc()))
}

/// `deserialize_with` for required timestamp fields
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_utc(&raw).map_err(|e| de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}

/// `deserialize_with` for optional timestamp fields
pub mod option {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                parse_utc(&raw)
                    .map_err(|e| de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
            })
            .transpose()
    }
}
