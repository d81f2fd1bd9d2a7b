//! Schedule data models
//!
//! Defines the Schedule record together with its status/mode lifecycle
//! enums, the create/update payloads accepted by the store, and the
//! time-span validation applied before any write.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::timestamp;

/// Owner assigned when a request does not carry one
pub const DEFAULT_OWNER: &str = "default_user";

/// Maximum length of `task_name`, in characters
pub const MAX_TASK_NAME_LEN: usize = 255;

/// Maximum length of the owner identifier, in characters
pub const MAX_OWNER_LEN: usize = 100;

/// Progress status of a schedule
///
/// Any value may be set on update; there is no enforced transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ScheduleStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Cancelled")]
    Cancelled,
}

impl ScheduleStatus {
    /// All statuses, in declaration order
    pub const ALL: [ScheduleStatus; 4] = [
        ScheduleStatus::NotStarted,
        ScheduleStatus::InProgress,
        ScheduleStatus::Completed,
        ScheduleStatus::Cancelled,
    ];

    /// Wire/storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::NotStarted => "Not Started",
            ScheduleStatus::InProgress => "In Progress",
            ScheduleStatus::Completed => "Completed",
            ScheduleStatus::Cancelled => "Cancelled",
        }
    }

    /// Parse the wire representation; returns None for unknown values
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engagement mode of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ScheduleMode {
    #[default]
    #[serde(rename = "Online")]
    Online,
    #[serde(rename = "In-Person")]
    InPerson,
}

impl ScheduleMode {
    pub const ALL: [ScheduleMode; 2] = [ScheduleMode::Online, ScheduleMode::InPerson];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleMode::Online => "Online",
            ScheduleMode::InPerson => "In-Person",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == s)
    }
}

impl fmt::Display for ScheduleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single bookable task/appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Schedule unique ID (UUID), assigned by the store
    pub id: String,
    /// Opaque identifier of the requesting user
    #[serde(rename = "user_id")]
    pub owner: String,
    /// Free-text label
    pub task_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ScheduleStatus,
    pub mode: ScheduleMode,
    /// Server-assigned, immutable
    pub created_at: DateTime<Utc>,
    /// Server-assigned, refreshed on every mutation
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.task_name,
            self.start_time.format("%Y-%m-%d %H:%M")
        )
    }
}

fn default_owner() -> String {
    DEFAULT_OWNER.to_string()
}

/// Payload for creating a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSchedule {
    #[serde(rename = "user_id", default = "default_owner")]
    pub owner: String,
    pub task_name: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub start_time: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub status: ScheduleStatus,
    #[serde(default)]
    pub mode: ScheduleMode,
}

impl NewSchedule {
    /// Creates a payload with default owner, status and mode
    pub fn new(task_name: impl Into<String>, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            owner: default_owner(),
            task_name: task_name.into(),
            start_time,
            end_time,
            status: ScheduleStatus::default(),
            mode: ScheduleMode::default(),
        }
    }

    pub fn with_status(mut self, status: ScheduleStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_mode(mut self, mode: ScheduleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.owner, &self.task_name, self.start_time, self.end_time)
    }
}

/// Full update of a schedule (PUT)
///
/// `task_name` and both times are required. Owner, status and mode keep
/// their stored value when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    #[serde(rename = "user_id", default)]
    pub owner: Option<String>,
    pub task_name: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub start_time: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<ScheduleStatus>,
    #[serde(default)]
    pub mode: Option<ScheduleMode>,
}

impl ScheduleUpdate {
    pub fn new(task_name: impl Into<String>, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            owner: None,
            task_name: task_name.into(),
            start_time,
            end_time,
            status: None,
            mode: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_status(mut self, status: ScheduleStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_mode(mut self, mode: ScheduleMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Writes the update onto `schedule`; validation is left to the caller
    pub fn apply_to(self, schedule: &mut Schedule) {
        schedule.task_name = self.task_name;
        schedule.start_time = self.start_time;
        schedule.end_time = self.end_time;
        if let Some(owner) = self.owner {
            schedule.owner = owner;
        }
        if let Some(status) = self.status {
            schedule.status = status;
        }
        if let Some(mode) = self.mode {
            schedule.mode = mode;
        }
    }
}

/// Partial update of a schedule (PATCH); absent fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulePatch {
    #[serde(rename = "user_id", default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<ScheduleStatus>,
    #[serde(default)]
    pub mode: Option<ScheduleMode>,
}

impl SchedulePatch {
    /// Applies the present fields onto `schedule`
    ///
    /// Validation is left to the caller so it runs against the merged record.
    pub fn apply_to(self, schedule: &mut Schedule) {
        if let Some(owner) = self.owner {
            schedule.owner = owner;
        }
        if let Some(task_name) = self.task_name {
            schedule.task_name = task_name;
        }
        if let Some(start_time) = self.start_time {
            schedule.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            schedule.end_time = end_time;
        }
        if let Some(status) = self.status {
            schedule.status = status;
        }
        if let Some(mode) = self.mode {
            schedule.mode = mode;
        }
    }
}

impl Schedule {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.owner, &self.task_name, self.start_time, self.end_time)
    }
}

/// Record-level validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("End time must be after start time.")]
    EndNotAfterStart,

    #[error("task_name may not be blank.")]
    EmptyTaskName,

    #[error("task_name must be at most {max} characters.")]
    TaskNameTooLong { max: usize },

    #[error("user_id may not be blank.")]
    EmptyOwner,

    #[error("user_id must be at most {max} characters.")]
    OwnerTooLong { max: usize },
}

/// Enforces `end_time > start_time`
pub fn validate_time_span(
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if end_time <= start_time {
        return Err(ValidationError::EndNotAfterStart);
    }
    Ok(())
}

fn validate_fields(
    owner: &str,
    task_name: &str,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if task_name.trim().is_empty() {
        return Err(ValidationError::EmptyTaskName);
    }
    if task_name.chars().count() > MAX_TASK_NAME_LEN {
        return Err(ValidationError::TaskNameTooLong {
            max: MAX_TASK_NAME_LEN,
        });
    }
    if owner.trim().is_empty() {
        return Err(ValidationError::EmptyOwner);
    }
    if owner.chars().count() > MAX_OWNER_LEN {
        return Err(ValidationError::OwnerTooLong { max: MAX_OWNER_LEN });
    }
    validate_time_span(start_time, end_time)
}

/// Query filter over schedules; every constraint is optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleFilter {
    /// Calendar year of `start_time`
    pub year: Option<i32>,
    /// Calendar month (1-12) of `start_time`
    pub month: Option<u32>,
    pub status: Option<ScheduleStatus>,
    pub mode: Option<ScheduleMode>,
}

impl ScheduleFilter {
    /// Schedules starting anywhere in `year`
    pub fn for_year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Default::default()
        }
    }

    /// Schedules starting in `month` of `year`
    pub fn for_month(year: i32, month: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            ..Default::default()
        }
    }
}
