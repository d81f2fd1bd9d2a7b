use super::*;
use crate::models::{
    NewSchedule, ScheduleFilter, ScheduleMode, SchedulePatch, ScheduleStatus, ScheduleUpdate,
    ValidationError,
};
use crate::storage::Database;
use chrono::{TimeZone, Utc};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn new_schedule(name: &str, start: DateTime<Utc>) -> NewSchedule {
    NewSchedule::new(name, start, start + chrono::Duration::hours(1))
}

fn seed(db: &Database) {
    db.create_schedule(new_schedule("dec", at(2025, 12, 31, 23, 0))).unwrap();
    db.create_schedule(new_schedule("mar-10", at(2026, 3, 10, 9, 0))).unwrap();
    db.create_schedule(
        new_schedule("mar-02", at(2026, 3, 2, 9, 0))
            .with_status(ScheduleStatus::Completed)
            .with_mode(ScheduleMode::InPerson),
    )
    .unwrap();
    db.create_schedule(new_schedule("apr", at(2026, 4, 1, 0, 0))).unwrap();
    db.create_schedule(new_schedule("next-year", at(2027, 1, 1, 0, 0))).unwrap();
}

fn names(schedules: &[crate::models::Schedule]) -> Vec<&str> {
    schedules.iter().map(|s| s.task_name.as_str()).collect()
}

#[test]
fn test_format_timestamp_fixed_width() {
    assert_eq!(format_timestamp(&at(2026, 3, 10, 9, 5)), "2026-03-10T09:05:00.000Z");
}

#[test]
fn test_parse_timestamp_roundtrip_and_error() {
    let ts = at(2026, 3, 10, 9, 5);
    assert_eq!(parse_timestamp("start_time", &format_timestamp(&ts)).unwrap(), ts);

    let err = parse_timestamp("start_time", "yesterday").unwrap_err();
    assert!(matches!(err, StorageError::CorruptRecord(_)));
}

#[test]
fn test_create_assigns_id_and_timestamps() {
    let db = Database::new_in_memory().unwrap();
    let schedule = db
        .create_schedule(new_schedule("Dentist", at(2026, 3, 10, 9, 0)))
        .unwrap();

    assert!(!schedule.id.is_empty());
    assert_eq!(schedule.owner, "default_user");
    assert_eq!(schedule.status, ScheduleStatus::NotStarted);
    assert_eq!(schedule.mode, ScheduleMode::Online);
    assert_eq!(schedule.created_at, schedule.updated_at);

    let stored = db.get_schedule(&schedule.id).unwrap().unwrap();
    assert_eq!(stored, schedule);
}

#[test]
fn test_create_rejects_end_before_start() {
    let db = Database::new_in_memory().unwrap();
    let start = at(2026, 3, 10, 9, 0);

    let err = db
        .create_schedule(NewSchedule::new("Broken", start, start))
        .unwrap_err();

    assert!(matches!(
        err,
        StorageError::Validation(ValidationError::EndNotAfterStart)
    ));
    assert_eq!(db.count_schedules().unwrap(), 0);
}

#[test]
fn test_get_missing_schedule() {
    let db = Database::new_in_memory().unwrap();
    assert!(db.get_schedule("missing").unwrap().is_none());
}

#[test]
fn test_list_ordered_by_start_time() {
    let db = Database::new_in_memory().unwrap();
    seed(&db);

    let all = db.list_schedules(&ScheduleFilter::default()).unwrap();
    assert_eq!(names(&all), vec!["dec", "mar-02", "mar-10", "apr", "next-year"]);
}

#[test]
fn test_list_filter_by_year() {
    let db = Database::new_in_memory().unwrap();
    seed(&db);

    let year = db.list_schedules(&ScheduleFilter::for_year(2026)).unwrap();
    assert_eq!(names(&year), vec!["mar-02", "mar-10", "apr"]);
}

#[test]
fn test_list_filter_by_year_and_month() {
    let db = Database::new_in_memory().unwrap();
    seed(&db);

    let march = db.list_schedules(&ScheduleFilter::for_month(2026, 3)).unwrap();
    assert_eq!(names(&march), vec!["mar-02", "mar-10"]);

    let december = db.list_schedules(&ScheduleFilter::for_month(2025, 12)).unwrap();
    assert_eq!(names(&december), vec!["dec"]);
}

#[test]
fn test_list_filter_by_month_only() {
    let db = Database::new_in_memory().unwrap();
    seed(&db);
    db.create_schedule(new_schedule("mar-2027", at(2027, 3, 1, 9, 0))).unwrap();

    let filter = ScheduleFilter {
        month: Some(3),
        ..Default::default()
    };
    let march = db.list_schedules(&filter).unwrap();
    assert_eq!(names(&march), vec!["mar-02", "mar-10", "mar-2027"]);
}

#[test]
fn test_list_filter_by_status_and_mode() {
    let db = Database::new_in_memory().unwrap();
    seed(&db);

    let completed = db
        .list_schedules(&ScheduleFilter {
            status: Some(ScheduleStatus::Completed),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(names(&completed), vec!["mar-02"]);

    let online_2026 = db
        .list_schedules(&ScheduleFilter {
            year: Some(2026),
            mode: Some(ScheduleMode::Online),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(names(&online_2026), vec!["mar-10", "apr"]);
}

#[test]
fn test_list_year_boundaries_use_utc() {
    let db = Database::new_in_memory().unwrap();
    db.create_schedule(new_schedule("first", at(2026, 1, 1, 0, 0))).unwrap();
    db.create_schedule(new_schedule("last", at(2026, 12, 31, 23, 59))).unwrap();

    let year = db.list_schedules(&ScheduleFilter::for_year(2026)).unwrap();
    assert_eq!(names(&year), vec!["first", "last"]);
    assert!(db.list_schedules(&ScheduleFilter::for_year(2025)).unwrap().is_empty());
}

#[test]
fn test_update_replaces_fields() {
    let db = Database::new_in_memory().unwrap();
    let created = db
        .create_schedule(new_schedule("Draft", at(2026, 3, 10, 9, 0)))
        .unwrap();

    let update = ScheduleUpdate::new("Final", at(2026, 3, 11, 9, 0), at(2026, 3, 11, 12, 0))
        .with_status(ScheduleStatus::InProgress)
        .with_mode(ScheduleMode::InPerson);
    let updated = db.update_schedule(&created.id, update).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.task_name, "Final");
    assert_eq!(updated.status, ScheduleStatus::InProgress);
    assert_eq!(updated.mode, ScheduleMode::InPerson);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    let stored = db.get_schedule(&created.id).unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[test]
fn test_update_rejects_invalid_span_without_writing() {
    let db = Database::new_in_memory().unwrap();
    let created = db
        .create_schedule(new_schedule("Keep", at(2026, 3, 10, 9, 0)))
        .unwrap();

    let start = at(2026, 3, 10, 9, 0);
    let err = db
        .update_schedule(&created.id, ScheduleUpdate::new("Changed", start, start))
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));

    let stored = db.get_schedule(&created.id).unwrap().unwrap();
    assert_eq!(stored.task_name, "Keep");
}

#[test]
fn test_update_missing_schedule() {
    let db = Database::new_in_memory().unwrap();
    let err = db
        .update_schedule(
            "missing",
            ScheduleUpdate::new("x", at(2026, 3, 10, 9, 0), at(2026, 3, 10, 10, 0)),
        )
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound(id) if id == "missing"));
}

#[test]
fn test_update_without_owner_keeps_stored_owner_status_and_mode() {
    let db = Database::new_in_memory().unwrap();
    let mut new = new_schedule("Lesson", at(2026, 3, 10, 9, 0))
        .with_status(ScheduleStatus::InProgress)
        .with_mode(ScheduleMode::InPerson);
    new.owner = "alice".to_string();
    let created = db.create_schedule(new).unwrap();

    let update: ScheduleUpdate = serde_json::from_value(serde_json::json!({
        "task_name": "Lesson (moved)",
        "start_time": "2026-03-12T09:00:00Z",
        "end_time": "2026-03-12T10:00:00Z"
    }))
    .unwrap();
    let updated = db.update_schedule(&created.id, update).unwrap();

    assert_eq!(updated.owner, "alice");
    assert_eq!(updated.status, ScheduleStatus::InProgress);
    assert_eq!(updated.mode, ScheduleMode::InPerson);
    assert_eq!(updated.task_name, "Lesson (moved)");

    let stored = db.get_schedule(&created.id).unwrap().unwrap();
    assert_eq!(stored.owner, "alice");
}

#[test]
fn test_patch_merges_and_validates() {
    let db = Database::new_in_memory().unwrap();
    let created = db
        .create_schedule(new_schedule("Review", at(2026, 3, 10, 9, 0)))
        .unwrap();

    let patched = db
        .patch_schedule(
            &created.id,
            SchedulePatch {
                status: Some(ScheduleStatus::Cancelled),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(patched.status, ScheduleStatus::Cancelled);
    assert_eq!(patched.task_name, "Review");
    assert_eq!(patched.start_time, created.start_time);

    // Moving only the start past the stored end is rejected
    let err = db
        .patch_schedule(
            &created.id,
            SchedulePatch {
                start_time: Some(at(2026, 3, 10, 11, 0)),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Validation(ValidationError::EndNotAfterStart)
    ));
}

#[test]
fn test_delete_schedule() {
    let db = Database::new_in_memory().unwrap();
    let created = db
        .create_schedule(new_schedule("Gone", at(2026, 3, 10, 9, 0)))
        .unwrap();

    assert!(db.delete_schedule(&created.id).unwrap());
    assert!(!db.delete_schedule(&created.id).unwrap());
    assert!(db.get_schedule(&created.id).unwrap().is_none());
    assert_eq!(db.count_schedules().unwrap(), 0);
}

#[test]
fn test_corrupt_row_is_reported() {
    let db = Database::new_in_memory().unwrap();
    db.connection()
        .execute(
            "INSERT INTO schedules (id, user_id, task_name, start_time, end_time, status, mode, created_at, updated_at)
             VALUES ('bad', 'u', 't', '2026-03-10T09:00:00.000Z', '2026-03-10T10:00:00.000Z', 'Paused', 'Online',
                     '2026-03-01T00:00:00.000Z', '2026-03-01T00:00:00.000Z')",
            [],
        )
        .unwrap();

    let err = db.get_schedule("bad").unwrap_err();
    assert!(matches!(err, StorageError::CorruptRecord(_)));
}

#[test]
fn test_sub_millisecond_precision_is_dropped() {
    let db = Database::new_in_memory().unwrap();
    let start = at(2026, 3, 10, 9, 0) + chrono::Duration::microseconds(1_234_567);
    let created = db
        .create_schedule(NewSchedule::new("Precise", start, start + chrono::Duration::hours(1)))
        .unwrap();

    assert_eq!(
        created.start_time,
        at(2026, 3, 10, 9, 0) + chrono::Duration::milliseconds(1_234)
    );
    assert_eq!(db.get_schedule(&created.id).unwrap().unwrap(), created);
}

#[test]
fn test_list_filter_last_representable_year() {
    let db = Database::new_in_memory().unwrap();
    db.create_schedule(new_schedule("far", at(9999, 12, 30, 9, 0))).unwrap();

    assert_eq!(names(&db.list_schedules(&ScheduleFilter::for_year(9999)).unwrap()), vec!["far"]);
    assert_eq!(
        names(&db.list_schedules(&ScheduleFilter::for_month(9999, 12)).unwrap()),
        vec!["far"]
    );
}
