//! Schedule data models
//!
//! Defines the schedule record, its lifecycle status and engagement mode,
//! and the payloads used to create, replace, patch and filter schedules.

pub mod schedule;
pub mod timestamp;

pub use schedule::*;
