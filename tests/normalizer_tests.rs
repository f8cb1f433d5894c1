use chrono::{Duration, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use horai::components::schedule::agenda::{render_agenda, AgendaRow};
use horai::components::schedule::models::{
    decode_events, EventKind, NewEventPayload, Priority, RawEvent,
};
use horai::components::schedule::normalizer::{normalize, normalize_all};
use serde_json::json;

fn raw(value: serde_json::Value) -> RawEvent {
    serde_json::from_value(value).expect("record should decode")
}

/// The sample record served by the events collaborator
#[test]
fn test_timed_local_event() {
    let event = raw(json!({
        "id": "flex-task-1",
        "title": "Study Math",
        "desc": "Study Math",
        "priority": "High",
        "startTime": "2025-09-29T10:30:00Z",
        "endTime": "2025-09-29T12:30:00Z",
        "dueDate": null
    }));

    let normalized = normalize(&event, Tz::UTC).unwrap();
    assert_eq!(normalized.id, "flex-task-1");
    assert_eq!(normalized.title, "Study Math");
    assert_eq!(normalized.kind, EventKind::TimedEvent);
    assert_eq!(normalized.priority, Some(Priority::High));
    assert!(normalized.has_explicit_time);
    assert_eq!(
        normalized.anchor_start,
        Utc.with_ymd_and_hms(2025, 9, 29, 10, 30, 0).unwrap()
    );
    assert_eq!(
        normalized.anchor_end,
        Utc.with_ymd_and_hms(2025, 9, 29, 12, 30, 0).unwrap()
    );
}

#[test]
fn test_due_date_anchors_at_nine() {
    let event = raw(json!({ "title": "Essay", "type": "Homework", "dueDate": "2025-10-08" }));

    let normalized = normalize(&event, Tz::UTC).unwrap();
    assert_eq!(normalized.kind, EventKind::Task);
    assert_eq!(normalized.category.as_deref(), Some("Homework"));
    assert!(!normalized.has_explicit_time);
    assert_eq!(
        normalized.anchor_start,
        Utc.with_ymd_and_hms(2025, 10, 8, 9, 0, 0).unwrap()
    );
    assert_eq!(
        normalized.anchor_end - normalized.anchor_start,
        Duration::minutes(60)
    );
}

#[test]
fn test_due_date_time_of_day_is_replaced() {
    let tz: Tz = "America/New_York".parse().unwrap();
    let event = raw(json!({ "title": "Quiz", "dueDate": "2025-10-08T03:59" }));

    let normalized = normalize(&event, tz).unwrap();
    let local = normalized.anchor_start.with_timezone(&tz);
    assert_eq!(local.date_naive().to_string(), "2025-10-08");
    assert_eq!((local.hour(), local.minute(), local.second()), (9, 0, 0));
}

#[test]
fn test_due_date_instant_uses_local_day() {
    // 03:59 UTC on the 8th is still the 7th in Los Angeles
    let tz: Tz = "America/Los_Angeles".parse().unwrap();
    let event = raw(json!({ "title": "Lab", "duedate": "2025-10-08T03:59:00Z" }));

    let normalized = normalize(&event, tz).unwrap();
    assert_eq!(
        normalized.anchor_start,
        Utc.with_ymd_and_hms(2025, 10, 7, 16, 0, 0).unwrap()
    );
}

#[test]
fn test_spaced_and_lower_case_keys_win() {
    let event = raw(json!({
        "title": "Gym",
        "start time": "2025-09-30T07:00:00Z",
        "startTime": "2025-09-30T06:00:00Z",
        "endtime": "2025-09-30T08:00:00Z",
        "endTime": "2025-09-30T09:00:00Z"
    }));

    let normalized = normalize(&event, Tz::UTC).unwrap();
    assert_eq!(normalized.anchor_start.hour(), 7);
    assert_eq!(normalized.anchor_end.hour(), 8);
}

#[test]
fn test_missing_end_defaults_to_start() {
    let event = raw(json!({ "title": "Call", "startTime": "2025-09-30T15:00:00Z" }));

    let normalized = normalize(&event, Tz::UTC).unwrap();
    assert_eq!(normalized.kind, EventKind::TimedEvent);
    assert_eq!(normalized.anchor_start, normalized.anchor_end);
    assert!(!normalized.has_explicit_time);
    assert!(normalized.timed_start);
}

#[test]
fn test_due_date_wins_over_lone_start() {
    let event = raw(json!({
        "title": "Reading",
        "startTime": "2025-09-30T15:00:00Z",
        "dueDate": "2025-10-02"
    }));

    let normalized = normalize(&event, Tz::UTC).unwrap();
    assert_eq!(normalized.kind, EventKind::Task);
    assert_eq!(
        normalized.anchor_start,
        Utc.with_ymd_and_hms(2025, 10, 2, 9, 0, 0).unwrap()
    );
}

#[test]
fn test_start_and_end_win_over_due_date() {
    let event = raw(json!({
        "title": "Review",
        "startTime": "2025-09-30T15:00:00Z",
        "endTime": "2025-09-30T16:00:00Z",
        "dueDate": "2025-10-02"
    }));

    let normalized = normalize(&event, Tz::UTC).unwrap();
    assert_eq!(normalized.kind, EventKind::TimedEvent);
    assert_eq!(normalized.anchor_start.hour(), 15);
}

#[test]
fn test_external_timed_entry() {
    let event = raw(json!({
        "id": "gcal-1",
        "summary": "Team sync",
        "start": { "dateTime": "2025-10-01T14:00:00+02:00", "timeZone": "Europe/Berlin" },
        "end": { "dateTime": "2025-10-01T15:00:00+02:00" }
    }));

    let normalized = normalize(&event, Tz::UTC).unwrap();
    assert_eq!(normalized.kind, EventKind::ExternalEvent);
    assert_eq!(normalized.title, "Team sync");
    assert!(normalized.has_explicit_time);
    assert!(normalized.timed_start);
    assert_eq!(
        normalized.anchor_start,
        Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap()
    );
}

#[test]
fn test_external_all_day_entry() {
    let tz: Tz = "Europe/Helsinki".parse().unwrap();
    let event = raw(json!({
        "summary": "Holiday",
        "start": { "date": "2025-10-03" },
        "end": { "date": "2025-10-04" }
    }));

    let normalized = normalize(&event, tz).unwrap();
    assert_eq!(normalized.kind, EventKind::ExternalEvent);
    assert!(!normalized.has_explicit_time);
    assert!(!normalized.timed_start);
    assert_eq!(
        normalized.anchor_start,
        Utc.with_ymd_and_hms(2025, 10, 2, 21, 0, 0).unwrap()
    );
    assert_eq!(
        normalized.anchor_end - normalized.anchor_start,
        Duration::hours(24)
    );
}

#[test]
fn test_explicit_end_before_start_is_kept() {
    let event = raw(json!({
        "title": "Backwards",
        "startTime": "2025-09-30T12:00:00Z",
        "endTime": "2025-09-30T11:00:00Z"
    }));

    let normalized = normalize(&event, Tz::UTC).unwrap();
    assert_eq!(normalized.anchor_start.hour(), 12);
    assert_eq!(normalized.anchor_end.hour(), 11);
}

#[test]
fn test_undated_records() {
    let no_dates = raw(json!({ "title": "Someday" }));
    assert!(normalize(&no_dates, Tz::UTC).is_none());

    let unparseable = raw(json!({ "title": "Soon", "dueDate": "next week" }));
    assert!(normalize(&unparseable, Tz::UTC).is_none());

    let schedule = normalize_all(
        &[
            no_dates,
            raw(json!({ "title": "Dated", "dueDate": "2025-10-01" })),
            unparseable,
        ],
        Tz::UTC,
    );
    assert_eq!(schedule.events.len(), 1);
    assert_eq!(schedule.undated.len(), 2);
    assert_eq!(schedule.undated[0].title, "Someday");
    assert_eq!(schedule.undated[1].title, "Soon");
}

#[test]
fn test_untitled_fallback() {
    let event = raw(json!({ "dueDate": "2025-10-01" }));
    let normalized = normalize(&event, Tz::UTC).unwrap();
    assert_eq!(normalized.title, "Untitled Event");
}

#[test]
fn test_synthesized_ids_are_stable() {
    let first = raw(json!({ "title": "No id", "dueDate": "2025-10-01" }));
    let second = raw(json!({ "title": "No id", "dueDate": "2025-10-02" }));

    let a = normalize(&first, Tz::UTC).unwrap();
    let b = normalize(&first, Tz::UTC).unwrap();
    let c = normalize(&second, Tz::UTC).unwrap();

    assert_eq!(a, b);
    assert!(!a.id.is_empty());
    assert_ne!(a.id, c.id);
}

#[test]
fn test_lenient_values() {
    let event = raw(json!({
        "_id": 42,
        "title": "Numbers",
        "priority": "med",
        "dueDate": "2025-10-01"
    }));

    let normalized = normalize(&event, Tz::UTC).unwrap();
    assert_eq!(normalized.id, "42");
    assert_eq!(normalized.priority, Some(Priority::Medium));

    let blank = raw(json!({ "title": "  ", "priority": "urgent", "dueDate": "2025-10-01" }));
    let normalized = normalize(&blank, Tz::UTC).unwrap();
    assert_eq!(normalized.title, "Untitled Event");
    assert_eq!(normalized.priority, None);
}

#[test]
fn test_decode_skips_malformed_records() {
    let events = decode_events(vec![
        json!({ "title": "Good", "dueDate": "2025-10-01" }),
        json!("not an object"),
        json!({ "title": "Bad start", "start": "2025-10-01" }),
    ]);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].details().title.as_deref(), Some("Good"));
}

#[test]
fn test_start_in_dst_gap_is_shifted_forward() {
    // 02:00-03:00 does not exist in New York on 2025-03-09
    let tz: Tz = "America/New_York".parse().unwrap();
    let event = raw(json!({
        "title": "Early run",
        "startTime": "2025-03-09T02:30",
        "endTime": "2025-03-09T04:00"
    }));

    let normalized = normalize(&event, tz).unwrap();
    assert!(normalized.has_explicit_time);
    assert_eq!(
        normalized.anchor_start,
        Utc.with_ymd_and_hms(2025, 3, 9, 7, 30, 0).unwrap()
    );
    assert_eq!(
        normalized.anchor_end - normalized.anchor_start,
        Duration::minutes(30)
    );

    let rows = render_agenda(&normalize_all(&[event], tz), tz);
    assert!(matches!(
        &rows[0],
        AgendaRow::Entry { formatted_date, .. } if formatted_date == "3/9/2025 03:30 AM"
    ));
}

#[test]
fn test_validation_orders_times_in_dst_gap() {
    let tz: Tz = "America/New_York".parse().unwrap();

    let forward = NewEventPayload {
        title: "Early run".to_string(),
        start_time: Some("2025-03-09T02:30".to_string()),
        end_time: Some("2025-03-09T04:00".to_string()),
        ..Default::default()
    };
    assert!(forward.validate(tz).is_ok());

    let backwards = NewEventPayload {
        title: "Backwards".to_string(),
        start_time: Some("2025-03-09T02:30".to_string()),
        end_time: Some("2025-03-09T01:00".to_string()),
        ..Default::default()
    };
    let err = backwards.validate(tz).unwrap_err();
    assert_eq!(err.to_string(), "Start Time must be before End Time.");
}
