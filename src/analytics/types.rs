//! Analytics type definitions
//!
//! Contains the report structures returned by the analytics engine and the
//! dashboard summary.

use serde::{Deserialize, Serialize};

use crate::models::{ScheduleMode, ScheduleStatus};

/// Standard three-letter month labels, January first
pub const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Three-letter label of a 1-based month
///
/// Returns None for months outside 1-12.
pub fn month_abbr(month: u32) -> Option<&'static str> {
    MONTH_ABBR.get(month.checked_sub(1)? as usize).copied()
}

/// Temporal position of a schedule relative to "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalStatus {
    /// Ended before today
    Past,
    /// Today lies within the schedule's date span (boundaries included)
    Current,
    /// Starts after today
    Future,
}

/// Past / current / future counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub past: u32,
    pub current: u32,
    pub future: u32,
}

impl StatusBreakdown {
    pub fn record(&mut self, status: TemporalStatus) {
        match status {
            TemporalStatus::Past => self.past += 1,
            TemporalStatus::Current => self.current += 1,
            TemporalStatus::Future => self.future += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.past + self.current + self.future
    }
}

/// Schedule count per progress status; every status is always present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTally {
    pub cancelled: u32,
    pub completed: u32,
    pub in_progress: u32,
    pub not_started: u32,
}

impl ProgressTally {
    pub fn record(&mut self, status: ScheduleStatus) {
        match status {
            ScheduleStatus::Cancelled => self.cancelled += 1,
            ScheduleStatus::Completed => self.completed += 1,
            ScheduleStatus::InProgress => self.in_progress += 1,
            ScheduleStatus::NotStarted => self.not_started += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.cancelled + self.completed + self.in_progress + self.not_started
    }
}

/// Schedule count per engagement mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementTally {
    pub online: u32,
    pub in_person: u32,
}

impl EngagementTally {
    pub fn record(&mut self, mode: ScheduleMode) {
        match mode {
            ScheduleMode::Online => self.online += 1,
            ScheduleMode::InPerson => self.in_person += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.online + self.in_person
    }
}

/// Bookings starting in one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBooked {
    /// Month label ("Jan".."Dec")
    pub month: String,
    pub count: u32,
}

/// Bookings starting on one calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBooked {
    /// Date string (YYYY-MM-DD)
    pub date: String,
    pub count: u32,
}

/// Booked vs. free days for one month
///
/// A day counts as booked as soon as one schedule starts on it; there is no
/// per-day capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableDays {
    pub month: String,
    pub total_days: u32,
    pub booked_days: u32,
    pub available: u32,
}

/// Aggregated analytics for one year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub year: i32,
    pub status_breakdown: StatusBreakdown,
    pub progress: ProgressTally,
    pub engagement: EngagementTally,
    /// Always 12 entries, Jan..Dec
    pub monthly_booked: Vec<MonthlyBooked>,
    /// Only dates with at least one booking, ascending
    pub daily_booked: Vec<DailyBooked>,
    /// Always 12 entries, Jan..Dec
    pub available_days: Vec<AvailableDays>,
}

// === Dashboard summary ===

/// Online / in-person / total counts for one cell group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeCounts {
    pub online: u32,
    pub in_person: u32,
    pub total: u32,
}

impl ModeCounts {
    pub fn record(&mut self, mode: ScheduleMode) {
        match mode {
            ScheduleMode::Online => self.online += 1,
            ScheduleMode::InPerson => self.in_person += 1,
        }
        self.total += 1;
    }

    fn add(&mut self, other: &ModeCounts) {
        self.online += other.online;
        self.in_person += other.in_person;
        self.total += other.total;
    }
}

/// Period x mode counts for one progress status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTableRow {
    /// Status label, or "Total" for the totals row
    pub status: String,
    pub past: ModeCounts,
    pub current: ModeCounts,
    pub future: ModeCounts,
}

impl StatusTableRow {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            past: ModeCounts::default(),
            current: ModeCounts::default(),
            future: ModeCounts::default(),
        }
    }

    pub fn period_mut(&mut self, period: TemporalStatus) -> &mut ModeCounts {
        match period {
            TemporalStatus::Past => &mut self.past,
            TemporalStatus::Current => &mut self.current,
            TemporalStatus::Future => &mut self.future,
        }
    }

    /// Adds every column of `other` into this row
    pub fn accumulate(&mut self, other: &StatusTableRow) {
        self.past.add(&other.past);
        self.current.add(&other.current);
        self.future.add(&other.future);
    }
}

/// Bookings in one ISO week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyBooked {
    /// ISO week key "YY-WW"
    pub week: String,
    pub online: u32,
    pub in_person: u32,
    pub total: u32,
}

/// A day with no booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeDate {
    /// "MM-DD"
    pub date: String,
    /// Weekday label ("Mon".."Sun")
    pub day: String,
}

/// Free dates of one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthFreeDates {
    pub month: String,
    pub dates: Vec<FreeDate>,
}

/// Free days of one month next to its booked days per mode and weekend days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableDaysSummary {
    pub month: String,
    pub available: u32,
    /// Distinct days with an online booking
    pub online: u32,
    /// Distinct days with an in-person booking
    pub in_person: u32,
    /// Saturdays in the month
    pub sat: u32,
    /// Sundays in the month
    pub sun: u32,
}

/// Bookings on one date, split by mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyModeBooked {
    /// "MM-DD"
    pub date: String,
    pub day: String,
    pub online: u32,
    pub in_person: u32,
}

/// Booked dates of one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthDailyBooked {
    pub month: String,
    pub days: Vec<DailyModeBooked>,
}

/// Dashboard tables: status x period x mode, weekly load, per-month day
/// tables and free dates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub year: i32,
    /// Reference date (YYYY-MM-DD)
    pub today: String,
    /// Rows ordered Cancelled, Completed, In Progress, Not Started
    pub status_table: Vec<StatusTableRow>,
    pub totals: StatusTableRow,
    pub weekly_booked: Vec<WeeklyBooked>,
    /// Always 12 entries, Jan..Dec
    pub available_days_summary: Vec<AvailableDaysSummary>,
    /// Months with at least one booking, in calendar order
    pub daily_by_month: Vec<MonthDailyBooked>,
    /// Months with at least one free day, in calendar order
    pub available_dates: Vec<MonthFreeDates>,
}
