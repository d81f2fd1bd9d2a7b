//! Schedule CRUD operations
//!
//! Provides schedule management methods for the Database. Every write
//! validates the record first; a rejected record never reaches SQLite.

use chrono::Utc;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, to_stored_precision, StorageError};
use crate::models::{
    NewSchedule, Schedule, ScheduleFilter, ScheduleMode, SchedulePatch, ScheduleStatus,
    ScheduleUpdate,
};
use crate::storage::Database;

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, task_name, start_time, end_time, status, mode, created_at, updated_at FROM schedules";

/// Raw column values of a schedules row
struct ScheduleRow {
    id: String,
    user_id: String,
    task_name: String,
    start_time: String,
    end_time: String,
    status: String,
    mode: String,
    created_at: String,
    updated_at: String,
}

impl ScheduleRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            task_name: row.get(2)?,
            start_time: row.get(3)?,
            end_time: row.get(4)?,
            status: row.get(5)?,
            mode: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

impl TryFrom<ScheduleRow> for Schedule {
    type Error = StorageError;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        let status = ScheduleStatus::parse(&row.status).ok_or_else(|| {
            StorageError::CorruptRecord(format!("unknown status '{}' for {}", row.status, row.id))
        })?;
        let mode = ScheduleMode::parse(&row.mode).ok_or_else(|| {
            StorageError::CorruptRecord(format!("unknown mode '{}' for {}", row.mode, row.id))
        })?;

        Ok(Schedule {
            start_time: parse_timestamp("start_time", &row.start_time)?,
            end_time: parse_timestamp("end_time", &row.end_time)?,
            created_at: parse_timestamp("created_at", &row.created_at)?,
            updated_at: parse_timestamp("updated_at", &row.updated_at)?,
            id: row.id,
            owner: row.user_id,
            task_name: row.task_name,
            status,
            mode,
        })
    }
}

/// Last year whose timestamps keep the fixed-width text layout
const MAX_STORED_YEAR: i32 = 9999;

fn month_start(year: i32, month: u32) -> String {
    format!("{:04}-{:02}-01T00:00:00.000Z", year, month)
}

/// Builds the WHERE clause and bound values for a filter
fn filter_clause(filter: &ScheduleFilter) -> (String, Vec<String>) {
    let mut conditions: Vec<&str> = Vec::new();
    let mut values: Vec<String> = Vec::new();

    match (filter.year, filter.month) {
        (Some(year), Some(month)) => {
            let (next_year, next_month) = if month >= 12 { (year + 1, 1) } else { (year, month + 1) };
            conditions.push("start_time >= ?");
            values.push(month_start(year, month));
            if next_year <= MAX_STORED_YEAR {
                conditions.push("start_time < ?");
                values.push(month_start(next_year, next_month));
            }
        }
        (Some(year), None) => {
            conditions.push("start_time >= ?");
            values.push(month_start(year, 1));
            if year < MAX_STORED_YEAR {
                conditions.push("start_time < ?");
                values.push(month_start(year + 1, 1));
            }
        }
        (None, Some(month)) => {
            conditions.push("substr(start_time, 6, 2) = ?");
            values.push(format!("{:02}", month));
        }
        (None, None) => {}
    }

    if let Some(status) = filter.status {
        conditions.push("status = ?");
        values.push(status.as_str().to_string());
    }
    if let Some(mode) = filter.mode {
        conditions.push("mode = ?");
        values.push(mode.as_str().to_string());
    }

    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), values)
    }
}

impl Database {
    /// List schedules matching a filter
    ///
    /// # Arguments
    /// * `filter` - Year / month / status / mode constraints, all optional
    ///
    /// # Returns
    /// Matching schedules ordered by start_time ascending
    pub fn list_schedules(&self, filter: &ScheduleFilter) -> Result<Vec<Schedule>, StorageError> {
        let (where_clause, values) = filter_clause(filter);
        let sql = format!(
            "{}{} ORDER BY start_time ASC, created_at ASC",
            SELECT_COLUMNS, where_clause
        );

        let mut stmt = self.connection().prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), ScheduleRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Schedule::try_from).collect()
    }

    /// Get a schedule by ID
    ///
    /// # Returns
    /// The schedule, or None if it does not exist
    pub fn get_schedule(&self, id: &str) -> Result<Option<Schedule>, StorageError> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let row = self
            .connection()
            .query_row(&sql, params![id], ScheduleRow::from_row)
            .optional()?;

        row.map(Schedule::try_from).transpose()
    }

    /// Create a schedule
    ///
    /// Validates the payload, assigns a new ID and server timestamps.
    pub fn create_schedule(&self, new: NewSchedule) -> Result<Schedule, StorageError> {
        new.validate()?;

        let now = to_stored_precision(Utc::now());
        let schedule = Schedule {
            id: Uuid::new_v4().to_string(),
            owner: new.owner,
            task_name: new.task_name,
            start_time: to_stored_precision(new.start_time),
            end_time: to_stored_precision(new.end_time),
            status: new.status,
            mode: new.mode,
            created_at: now,
            updated_at: now,
        };

        self.connection().execute(
            "INSERT INTO schedules (id, user_id, task_name, start_time, end_time, status, mode, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                schedule.id,
                schedule.owner,
                schedule.task_name,
                format_timestamp(&schedule.start_time),
                format_timestamp(&schedule.end_time),
                schedule.status.as_str(),
                schedule.mode.as_str(),
                format_timestamp(&schedule.created_at),
                format_timestamp(&schedule.updated_at),
            ],
        )?;

        Ok(schedule)
    }

    /// Full update of a schedule
    ///
    /// Task name and times are replaced; owner, status and mode are replaced
    /// only when the update carries them.
    ///
    /// # Errors
    /// `NotFound` if the ID does not exist, `Validation` if the new values
    /// are rejected.
    pub fn update_schedule(&self, id: &str, update: ScheduleUpdate) -> Result<Schedule, StorageError> {
        let mut schedule = self
            .get_schedule(id)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        update.apply_to(&mut schedule);
        self.save_existing(schedule)
    }

    /// Merge the present fields of `patch` into a schedule (partial update)
    ///
    /// The merged record is validated as a whole.
    pub fn patch_schedule(&self, id: &str, patch: SchedulePatch) -> Result<Schedule, StorageError> {
        let mut schedule = self
            .get_schedule(id)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        patch.apply_to(&mut schedule);
        self.save_existing(schedule)
    }

    /// Validate and write back an existing record, refreshing updated_at
    fn save_existing(&self, mut schedule: Schedule) -> Result<Schedule, StorageError> {
        schedule.validate()?;

        schedule.start_time = to_stored_precision(schedule.start_time);
        schedule.end_time = to_stored_precision(schedule.end_time);
        schedule.updated_at = to_stored_precision(Utc::now());

        let changed = self.connection().execute(
            "UPDATE schedules
             SET user_id = ?2, task_name = ?3, start_time = ?4, end_time = ?5, status = ?6, mode = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                schedule.id,
                schedule.owner,
                schedule.task_name,
                format_timestamp(&schedule.start_time),
                format_timestamp(&schedule.end_time),
                schedule.status.as_str(),
                schedule.mode.as_str(),
                format_timestamp(&schedule.updated_at),
            ],
        )?;

        // Deleted between read and write
        if changed == 0 {
            return Err(StorageError::NotFound(schedule.id));
        }

        tracing::debug!(id = %schedule.id, "Schedule updated");
        Ok(schedule)
    }

    /// Delete a schedule
    ///
    /// # Returns
    /// true if a row was removed
    pub fn delete_schedule(&self, id: &str) -> Result<bool, StorageError> {
        let removed = self
            .connection()
            .execute("DELETE FROM schedules WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Total number of stored schedules
    pub fn count_schedules(&self) -> Result<u32, StorageError> {
        let count: i64 = self
            .connection()
            .query_row("SELECT COUNT(*) FROM schedules", [], |row| row.get(0))?;
        Ok(count as u32)
    }
}
