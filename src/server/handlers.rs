//! HTTP 路由处理器
//!
//! 实现 /api/schedules 与 /api/analytics 等 API 端点

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::analytics::{
    calculator::{compute_analytics, compute_dashboard},
    AnalyticsReport, DashboardSummary,
};
use crate::error::AppError;
use crate::logging::OpTimer;
use crate::models::{
    NewSchedule, Schedule, ScheduleFilter, ScheduleMode, SchedulePatch, ScheduleStatus,
    ScheduleUpdate,
};
use crate::storage::{Database, StorageError};

/// 当前时间来源
///
/// 处理器每个请求只读取一次，再显式传入计算引擎
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// 系统时钟
    #[default]
    System,
    /// 固定时间（测试用）
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(instant) => *instant,
        }
    }
}

/// 共享状态
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub clock: Clock,
}

impl AppState {
    fn db(&self) -> Result<MutexGuard<'_, Database>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::from(StorageError::LockError))
    }
}

/// 日程列表查询参数
///
/// 原始字符串，由处理器统一校验以返回一致的错误格式
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub year: Option<String>,
    pub month: Option<String>,
    pub status: Option<String>,
    pub mode: Option<String>,
}

/// 统计分析查询参数
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsParams {
    pub year: Option<String>,
    pub month: Option<String>,
}

/// 解析年份参数，范围 1-9999
fn parse_year(raw: Option<&str>) -> Result<Option<i32>, AppError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<i32>() {
        Ok(year) if (1..=9999).contains(&year) => Ok(Some(year)),
        Ok(_) => Err(AppError::InvalidQuery(format!(
            "year must be between 1 and 9999, got {}",
            raw
        ))),
        Err(_) => Err(AppError::InvalidQuery(format!(
            "year must be an integer, got '{}'",
            raw
        ))),
    }
}

/// 解析月份参数，范围 1-12
fn parse_month(raw: Option<&str>) -> Result<Option<u32>, AppError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<u32>() {
        Ok(month) if (1..=12).contains(&month) => Ok(Some(month)),
        Ok(_) => Err(AppError::InvalidQuery(format!(
            "month must be between 1 and 12, got {}",
            raw
        ))),
        Err(_) => Err(AppError::InvalidQuery(format!(
            "month must be an integer, got '{}'",
            raw
        ))),
    }
}

fn parse_status(raw: Option<&str>) -> Result<Option<ScheduleStatus>, AppError> {
    raw.map(|s| {
        ScheduleStatus::parse(s)
            .ok_or_else(|| AppError::InvalidQuery(format!("unknown status '{}'", s)))
    })
    .transpose()
}

fn parse_mode(raw: Option<&str>) -> Result<Option<ScheduleMode>, AppError> {
    raw.map(|s| {
        ScheduleMode::parse(s).ok_or_else(|| AppError::InvalidQuery(format!("unknown mode '{}'", s)))
    })
    .transpose()
}

/// GET /api/health
///
/// 健康检查端点
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "schedule-board"
        })),
    )
}

/// GET /api/schedules
///
/// year 与 month 同时提供时才按月过滤；status / mode 可单独过滤
pub async fn list_schedules(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Schedule>>, AppError> {
    let year = parse_year(params.year.as_deref())?;
    let month = parse_month(params.month.as_deref())?;

    let mut filter = match (year, month) {
        (Some(year), Some(month)) => ScheduleFilter::for_month(year, month),
        _ => ScheduleFilter::default(),
    };
    filter.status = parse_status(params.status.as_deref())?;
    filter.mode = parse_mode(params.mode.as_deref())?;

    let schedules = state.db()?.list_schedules(&filter)?;
    Ok(Json(schedules))
}

/// POST /api/schedules
pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewSchedule>, JsonRejection>,
) -> Result<(StatusCode, Json<Schedule>), AppError> {
    let Json(new) = payload?;
    let schedule = state.db()?.create_schedule(new)?;

    tracing::info!(id = %schedule.id, schedule = %schedule, "Schedule created");
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// GET /api/schedules/{id}
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Schedule>, AppError> {
    state
        .db()?
        .get_schedule(&id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Schedule not found: {}", id)))
}

/// PUT /api/schedules/{id}
pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ScheduleUpdate>, JsonRejection>,
) -> Result<Json<Schedule>, AppError> {
    let Json(update) = payload?;
    let schedule = state.db()?.update_schedule(&id, update)?;
    Ok(Json(schedule))
}

/// PATCH /api/schedules/{id}
pub async fn patch_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<SchedulePatch>, JsonRejection>,
) -> Result<Json<Schedule>, AppError> {
    let Json(patch) = payload?;
    let schedule = state.db()?.patch_schedule(&id, patch)?;
    Ok(Json(schedule))
}

/// DELETE /api/schedules/{id}
pub async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.db()?.delete_schedule(&id)? {
        tracing::info!(id = %id, "Schedule deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Schedule not found: {}", id)))
    }
}

/// GET /api/analytics
///
/// year 默认当前年份，month 默认当前月份（仅用于每日统计）
pub async fn analytics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<AnalyticsReport>, AppError> {
    let now = state.clock.now();
    let year = parse_year(params.year.as_deref())?.unwrap_or_else(|| now.year());
    let month = parse_month(params.month.as_deref())?.unwrap_or_else(|| now.month());

    let schedules = state.db()?.list_schedules(&ScheduleFilter::for_year(year))?;

    let timer = OpTimer::new("analytics", "compute_report");
    let report = compute_analytics(&schedules, now, year, month);
    timer.finish();

    tracing::debug!(year, month, schedules = schedules.len(), "Analytics report computed");
    Ok(Json(report))
}

/// GET /api/analytics/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<DashboardSummary>, AppError> {
    let now = state.clock.now();
    let year = parse_year(params.year.as_deref())?.unwrap_or_else(|| now.year());

    let schedules = state.db()?.list_schedules(&ScheduleFilter::for_year(year))?;

    let timer = OpTimer::new("analytics", "compute_dashboard");
    let summary = compute_dashboard(&schedules, now, year);
    timer.finish();

    Ok(Json(summary))
}

#[cfg(test)]
mod param_tests {
    use super::*;

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year(None).unwrap(), None);
        assert_eq!(parse_year(Some("2026")).unwrap(), Some(2026));
        assert_eq!(parse_year(Some(" 2024 ")).unwrap(), Some(2024));
        assert!(matches!(parse_year(Some("abc")), Err(AppError::InvalidQuery(_))));
        assert!(matches!(parse_year(Some("0")), Err(AppError::InvalidQuery(_))));
        assert!(matches!(parse_year(Some("10000")), Err(AppError::InvalidQuery(_))));
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month(None).unwrap(), None);
        assert_eq!(parse_month(Some("1")).unwrap(), Some(1));
        assert_eq!(parse_month(Some("12")).unwrap(), Some(12));
        assert!(matches!(parse_month(Some("0")), Err(AppError::InvalidQuery(_))));
        assert!(matches!(parse_month(Some("13")), Err(AppError::InvalidQuery(_))));
        assert!(matches!(parse_month(Some("-1")), Err(AppError::InvalidQuery(_))));
        assert!(matches!(parse_month(Some("march")), Err(AppError::InvalidQuery(_))));
    }

    #[test]
    fn test_parse_status_and_mode() {
        assert_eq!(
            parse_status(Some("In Progress")).unwrap(),
            Some(ScheduleStatus::InProgress)
        );
        assert!(parse_status(Some("Paused")).is_err());
        assert_eq!(parse_mode(Some("In-Person")).unwrap(), Some(ScheduleMode::InPerson));
        assert!(parse_mode(Some("Hybrid")).is_err());
        assert_eq!(parse_mode(None).unwrap(), None);
    }

    #[test]
    fn test_fixed_clock() {
        let instant = DateTime::parse_from_rfc3339("2026-03-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(Clock::Fixed(instant).now(), instant);
    }
}
