use super::*;
use shared::protocol::{AttendanceResponse, RawStudentRef};

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("date")
}

fn record(id: i64, day: &str, status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord {
        id: AttendanceId(id),
        student_id: StudentId(100 + id),
        student_name: format!("Student {id}"),
        status,
        date: date(day),
    }
}

fn march_records() -> Vec<AttendanceRecord> {
    let mut records = Vec::new();
    for id in 0..6 {
        records.push(record(id, "2024-03-01", AttendanceStatus::Present));
    }
    records.push(record(6, "2024-03-01", AttendanceStatus::Absent));
    records.push(record(7, "2024-03-02", AttendanceStatus::Present));
    records.push(record(8, "2024-03-02", AttendanceStatus::Present));
    records
}

fn raw_row(id: i64, name: Option<&str>, status: i64, day: &str) -> RawAttendanceRecord {
    RawAttendanceRecord {
        id: Some(id),
        student_id: Some(40 + id),
        student: Some(RawStudentRef {
            name: name.map(str::to_string),
        }),
        status: Some(status),
        date: Some(day.to_string()),
    }
}

#[test]
fn groups_march_scenario_by_date() {
    let aggregate = aggregate(march_records());

    let first = aggregate.get(date("2024-03-01")).expect("first day");
    assert_eq!(first.present_count, 6);
    assert_eq!(first.absent_count, 1);
    assert_eq!(first.color_tier(), ColorTier::Healthy);

    let second = aggregate.get_iso("2024-03-02").expect("second day");
    assert_eq!(second.present_count, 2);
    assert_eq!(second.absent_count, 0);
    assert_eq!(second.color_tier(), ColorTier::Low);
}

#[test]
fn counts_match_student_lists_and_input_size() {
    let records = march_records();
    let total = records.len();
    let aggregate = aggregate(records);

    for summary in aggregate.iter() {
        assert_eq!(
            (summary.present_count + summary.absent_count) as usize,
            summary.students.len()
        );
    }
    assert_eq!(aggregate.record_count(), total);
}

#[test]
fn iteration_follows_first_appearance_of_each_date() {
    let aggregate = aggregate(vec![
        record(1, "2024-03-05", AttendanceStatus::Present),
        record(2, "2024-03-01", AttendanceStatus::Absent),
        record(3, "2024-03-05", AttendanceStatus::Absent),
    ]);

    let dates: Vec<String> = aggregate.iter().map(DateSummary::iso_date).collect();
    assert_eq!(dates, vec!["2024-03-05", "2024-03-01"]);
    let ids: Vec<i64> = aggregate
        .get(date("2024-03-05"))
        .expect("day")
        .students
        .iter()
        .map(|r| r.id.0)
        .collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn healthy_tier_starts_at_five_present() {
    assert_eq!(ColorTier::for_present_count(0), ColorTier::Low);
    assert_eq!(ColorTier::for_present_count(4), ColorTier::Low);
    assert_eq!(ColorTier::for_present_count(5), ColorTier::Healthy);
    assert_eq!(ColorTier::for_present_count(40), ColorTier::Healthy);
}

#[test]
fn events_carry_structured_and_legacy_titles() {
    let events = to_events(&aggregate(march_records()));

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].date, date("2024-03-01"));
    assert_eq!(events[0].title.present_label, "6 Present");
    assert_eq!(events[0].title.absent_label, "1 Absent");
    assert_eq!(events[0].title.legacy_text(), "6 Present\n1 Absent");
    assert_eq!(events[0].color_tier, ColorTier::Healthy);
    assert_eq!(events[1].color_tier, ColorTier::Low);
}

#[test]
fn empty_input_gives_empty_outputs() {
    let aggregate = aggregate(Vec::new());
    assert!(aggregate.is_empty());
    assert!(to_events(&aggregate).is_empty());
}

#[test]
fn timestamps_collapse_onto_their_calendar_day() {
    let adapted = adapt_records(vec![
        raw_row(1, Some("Ada"), 1, "2024-03-01T08:15:00.000Z"),
        raw_row(2, Some("Grace"), 0, "2024-03-01T17:45:00Z"),
        raw_row(3, Some("Linus"), 1, "2024-03-01"),
        raw_row(4, Some("Edsger"), 0, "2024-03-01 10:00:00"),
    ]);
    assert_eq!(adapted.skipped, 0);
    let aggregate = aggregate(adapted.records);

    assert_eq!(aggregate.len(), 1);
    let day = aggregate.get(date("2024-03-01")).expect("day");
    assert_eq!(day.present_count, 2);
    assert_eq!(day.absent_count, 2);
}

#[test]
fn missing_student_name_falls_back_to_identifier() {
    let mut row = raw_row(2, None, 1, "2024-03-01");
    row.student_id = Some(42);
    let record = adapt_record(row).expect("record");
    assert_eq!(record.student_name, "Student ID: 42");

    let mut blank = raw_row(3, Some("   "), 1, "2024-03-01");
    blank.student = None;
    blank.student_id = Some(7);
    assert_eq!(
        adapt_record(blank).expect("record").student_name,
        "Student ID: 7"
    );
}

#[test]
fn status_one_is_present_and_anything_else_absent() {
    assert_eq!(
        adapt_record(raw_row(1, Some("A"), 1, "2024-03-01"))
            .expect("record")
            .status,
        AttendanceStatus::Present
    );
    assert_eq!(
        adapt_record(raw_row(2, Some("B"), 3, "2024-03-01"))
            .expect("record")
            .status,
        AttendanceStatus::Absent
    );
}

#[test]
fn malformed_rows_are_skipped_and_counted() {
    let mut missing_student = raw_row(2, Some("B"), 1, "2024-03-01");
    missing_student.student_id = None;
    let mut missing_date = raw_row(3, Some("C"), 1, "2024-03-01");
    missing_date.date = None;

    let adapted = adapt_records(vec![
        raw_row(1, Some("A"), 1, "2024-03-01"),
        missing_student,
        missing_date,
        raw_row(4, Some("D"), 0, "not-a-date"),
    ]);

    assert_eq!(adapted.records.len(), 1);
    assert_eq!(adapted.skipped, 3);
    let aggregate = aggregate(adapted.records);
    assert_eq!(aggregate.record_count() + adapted.skipped, 4);
}

#[test]
fn mistyped_row_is_skipped_while_the_rest_is_kept() {
    let raw = r#"{"studentAttendance":[
        {"id":1,"student_id":4,"student":{"name":"Ada"},"status":1,"date":"2024-03-01"},
        {"id":2,"student_id":"5","status":1,"date":"2024-03-01"}
    ]}"#;
    let response: AttendanceResponse = serde_json::from_str(raw).expect("response");
    let adapted = adapt_records(response.student_attendance);

    assert_eq!(adapted.records.len(), 1);
    assert_eq!(adapted.skipped, 1);
    assert_eq!(adapted.records[0].student_name, "Ada");
}

#[test]
fn record_errors_name_the_problem() {
    let mut row = raw_row(1, Some("A"), 1, "2024-03-01");
    row.status = None;
    assert_eq!(adapt_record(row), Err(RecordError::MissingField("status")));
    assert_eq!(
        parse_calendar_date("03/01/2024"),
        Err(RecordError::InvalidDate {
            raw: "03/01/2024".into()
        })
    );
}
