//! Analytics calculation logic
//!
//! Pure functions over an in-memory snapshot of schedules. Nothing in here
//! reads the wall clock: the reference instant is always passed in.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};

use crate::models::{Schedule, ScheduleMode, ScheduleStatus};

use super::{
    month_abbr, AnalyticsReport, AvailableDays, AvailableDaysSummary, DailyBooked,
    DailyModeBooked, DashboardSummary, EngagementTally, FreeDate, ModeCounts, MonthDailyBooked,
    MonthFreeDates, MonthlyBooked, ProgressTally, StatusBreakdown, StatusTableRow, TemporalStatus,
    WeeklyBooked, MONTH_ABBR,
};

/// Status row order of the dashboard table
const STATUS_TABLE_ORDER: [ScheduleStatus; 4] = [
    ScheduleStatus::Cancelled,
    ScheduleStatus::Completed,
    ScheduleStatus::InProgress,
    ScheduleStatus::NotStarted,
];

/// Computes the full analytics report
///
/// # Arguments
/// * `schedules` - All schedules starting in `year` (not re-filtered here)
/// * `now` - Reference instant defining "today"
/// * `year` - Year being analyzed (drives day counts)
/// * `month` - Month (1-12) for the daily histogram; validated by the caller
///
/// # Returns
/// The aggregated AnalyticsReport. Empty input yields zero counts with the
/// 12-entry monthly and available-days tables still populated.
pub fn compute_analytics(
    schedules: &[Schedule],
    now: DateTime<Utc>,
    year: i32,
    month: u32,
) -> AnalyticsReport {
    let today = now.date_naive();

    AnalyticsReport {
        year,
        status_breakdown: calculate_status_breakdown(schedules, today),
        progress: calculate_progress(schedules),
        engagement: calculate_engagement(schedules),
        monthly_booked: calculate_monthly_booked(schedules),
        daily_booked: calculate_daily_booked(schedules, month),
        available_days: calculate_available_days(schedules, year),
    }
}

/// Classifies a schedule against `today` using calendar dates
///
/// `end < today` is past, `start > today` is future, anything else
/// (including both boundaries) is current.
pub fn classify_temporal(schedule: &Schedule, today: NaiveDate) -> TemporalStatus {
    if schedule.end_time.date_naive() < today {
        TemporalStatus::Past
    } else if schedule.start_time.date_naive() > today {
        TemporalStatus::Future
    } else {
        TemporalStatus::Current
    }
}

pub fn calculate_status_breakdown(schedules: &[Schedule], today: NaiveDate) -> StatusBreakdown {
    let mut breakdown = StatusBreakdown::default();
    for schedule in schedules {
        breakdown.record(classify_temporal(schedule, today));
    }
    breakdown
}

pub fn calculate_progress(schedules: &[Schedule]) -> ProgressTally {
    let mut tally = ProgressTally::default();
    for schedule in schedules {
        tally.record(schedule.status);
    }
    tally
}

pub fn calculate_engagement(schedules: &[Schedule]) -> EngagementTally {
    let mut tally = EngagementTally::default();
    for schedule in schedules {
        tally.record(schedule.mode);
    }
    tally
}

/// Bookings per calendar month of `start_time`, always 12 entries Jan..Dec
pub fn calculate_monthly_booked(schedules: &[Schedule]) -> Vec<MonthlyBooked> {
    let mut counts = [0u32; 12];
    for schedule in schedules {
        counts[schedule.start_time.month0() as usize] += 1;
    }

    MONTH_ABBR
        .iter()
        .zip(counts)
        .map(|(label, count)| MonthlyBooked {
            month: label.to_string(),
            count,
        })
        .collect()
}

/// Bookings per start date within `month`, sorted by date
///
/// Dates without bookings are omitted.
pub fn calculate_daily_booked(schedules: &[Schedule], month: u32) -> Vec<DailyBooked> {
    // BTreeMap keeps the YYYY-MM-DD keys in ascending order
    let mut daily: BTreeMap<String, u32> = BTreeMap::new();

    for schedule in schedules.iter().filter(|s| s.start_time.month() == month) {
        let date = schedule.start_time.format("%Y-%m-%d").to_string();
        *daily.entry(date).or_insert(0) += 1;
    }

    daily
        .into_iter()
        .map(|(date, count)| DailyBooked { date, count })
        .collect()
}

/// Booked vs. free days for each month of `year`
///
/// A booked day is a distinct day-of-month on which at least one schedule
/// starts; several bookings on one day still occupy a single day.
pub fn calculate_available_days(schedules: &[Schedule], year: i32) -> Vec<AvailableDays> {
    let booked = booked_days_by_month(schedules);

    MONTH_ABBR
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let total_days = days_in_month(year, idx as u32 + 1);
            let booked_days = booked[idx].len() as u32;
            AvailableDays {
                month: label.to_string(),
                total_days,
                booked_days,
                available: total_days.saturating_sub(booked_days),
            }
        })
        .collect()
}

/// Number of calendar days in `month` (1-12) of `year`
///
/// Returns 0 for a month outside 1-12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Gregorian leap-year rule
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Distinct start days-of-month, indexed by month0
fn booked_days_by_month<'a>(schedules: impl IntoIterator<Item = &'a Schedule>) -> [HashSet<u32>; 12] {
    let mut booked: [HashSet<u32>; 12] = Default::default();
    for schedule in schedules {
        booked[schedule.start_time.month0() as usize].insert(schedule.start_time.day());
    }
    booked
}

// === Dashboard summary ===

/// Computes the dashboard tables for `year`
///
/// Uses the same temporal rule and booked-day notion as the analytics
/// report, so free dates of a month always number `available` days.
pub fn compute_dashboard(schedules: &[Schedule], now: DateTime<Utc>, year: i32) -> DashboardSummary {
    let today = now.date_naive();
    let status_table = calculate_status_table(schedules, today);

    let mut totals = StatusTableRow::new("Total");
    for row in &status_table {
        totals.accumulate(row);
    }

    DashboardSummary {
        year,
        today: today.format("%Y-%m-%d").to_string(),
        status_table,
        totals,
        weekly_booked: calculate_weekly_booked(schedules),
        available_days_summary: calculate_available_days_summary(schedules, year),
        daily_by_month: calculate_daily_by_month(schedules),
        available_dates: calculate_available_dates(schedules, year),
    }
}

/// Status x period x mode counts, one row per status
pub fn calculate_status_table(schedules: &[Schedule], today: NaiveDate) -> Vec<StatusTableRow> {
    STATUS_TABLE_ORDER
        .iter()
        .map(|status| {
            let mut row = StatusTableRow::new(status.as_str());
            for schedule in schedules.iter().filter(|s| s.status == *status) {
                row.period_mut(classify_temporal(schedule, today))
                    .record(schedule.mode);
            }
            row
        })
        .collect()
}

/// Bookings per ISO week of `start_time`, keyed "YY-WW"
///
/// Weeks are ordered by (ISO year, week) so they stay chronological across
/// a century boundary.
pub fn calculate_weekly_booked(schedules: &[Schedule]) -> Vec<WeeklyBooked> {
    let mut weekly: BTreeMap<(i32, u32), ModeCounts> = BTreeMap::new();

    for schedule in schedules {
        let week = schedule.start_time.date_naive().iso_week();
        weekly
            .entry((week.year(), week.week()))
            .or_default()
            .record(schedule.mode);
    }

    weekly
        .into_iter()
        .map(|((iso_year, week), counts)| WeeklyBooked {
            week: iso_week_key(iso_year, week),
            online: counts.online,
            in_person: counts.in_person,
            total: counts.total,
        })
        .collect()
}

/// Free days per month with the distinct booked days of each mode and the
/// month's Saturday / Sunday counts
pub fn calculate_available_days_summary(
    schedules: &[Schedule],
    year: i32,
) -> Vec<AvailableDaysSummary> {
    let booked = booked_days_by_month(schedules);
    let online = booked_days_by_month(schedules.iter().filter(|s| s.mode == ScheduleMode::Online));
    let in_person =
        booked_days_by_month(schedules.iter().filter(|s| s.mode == ScheduleMode::InPerson));

    MONTH_ABBR
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let month = idx as u32 + 1;
            let total_days = days_in_month(year, month);
            let (sat, sun) = weekend_days(year, month);
            AvailableDaysSummary {
                month: label.to_string(),
                available: total_days.saturating_sub(booked[idx].len() as u32),
                online: online[idx].len() as u32,
                in_person: in_person[idx].len() as u32,
                sat,
                sun,
            }
        })
        .collect()
}

/// Booked dates per month split by mode; months without bookings are omitted
pub fn calculate_daily_by_month(schedules: &[Schedule]) -> Vec<MonthDailyBooked> {
    let mut by_month: [BTreeMap<NaiveDate, ModeCounts>; 12] = Default::default();

    for schedule in schedules {
        let date = schedule.start_time.date_naive();
        by_month[date.month0() as usize]
            .entry(date)
            .or_default()
            .record(schedule.mode);
    }

    MONTH_ABBR
        .iter()
        .zip(by_month)
        .filter(|(_, days)| !days.is_empty())
        .map(|(label, days)| MonthDailyBooked {
            month: label.to_string(),
            days: days
                .into_iter()
                .map(|(date, counts)| DailyModeBooked {
                    date: date.format("%m-%d").to_string(),
                    day: date.format("%a").to_string(),
                    online: counts.online,
                    in_person: counts.in_person,
                })
                .collect(),
        })
        .collect()
}

/// Saturdays and Sundays in `month` of `year`
fn weekend_days(year: i32, month: u32) -> (u32, u32) {
    (1..=days_in_month(year, month))
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .fold((0, 0), |(sat, sun), date| match date.weekday() {
            Weekday::Sat => (sat + 1, sun),
            Weekday::Sun => (sat, sun + 1),
            _ => (sat, sun),
        })
}

/// Free dates for each month of `year` that has any
pub fn calculate_available_dates(schedules: &[Schedule], year: i32) -> Vec<MonthFreeDates> {
    let booked = booked_days_by_month(schedules);

    (1..=12u32)
        .filter_map(|month| {
            let booked_in_month = &booked[month as usize - 1];
            let dates: Vec<FreeDate> = (1..=days_in_month(year, month))
                .filter(|day| !booked_in_month.contains(day))
                .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
                .map(|date| FreeDate {
                    date: date.format("%m-%d").to_string(),
                    day: date.format("%a").to_string(),
                })
                .collect();

            if dates.is_empty() {
                return None;
            }
            Some(MonthFreeDates {
                month: month_abbr(month)?.to_string(),
                dates,
            })
        })
        .collect()
}

/// "YY-WW" from the ISO week-year and week number
fn iso_week_key(iso_year: i32, week: u32) -> String {
    format!("{:02}-{:02}", iso_year.rem_euclid(100), week)
}
