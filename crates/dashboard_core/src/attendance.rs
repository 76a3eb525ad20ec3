//! Attendance aggregation: raw endpoint rows become per-date summaries and
//! calendar events.

use std::{collections::HashMap, fmt};

use chrono::NaiveDate;
use serde::Serialize;
use shared::{
    domain::{AttendanceId, AttendanceStatus, StudentId},
    protocol::RawAttendanceRecord,
};
use tracing::warn;

use crate::error::RecordError;

/// A date with at least this many present students is rendered as healthy.
pub const HEALTHY_PRESENT_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub student_id: StudentId,
    pub student_name: String,
    pub status: AttendanceStatus,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTier {
    Healthy,
    Low,
}

impl ColorTier {
    pub fn for_present_count(present_count: u32) -> Self {
        if present_count >= HEALTHY_PRESENT_THRESHOLD {
            Self::Healthy
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSummary {
    pub date: NaiveDate,
    pub present_count: u32,
    pub absent_count: u32,
    pub students: Vec<AttendanceRecord>,
}

impl DateSummary {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            present_count: 0,
            absent_count: 0,
            students: Vec::new(),
        }
    }

    fn push(&mut self, record: AttendanceRecord) {
        if record.status.is_present() {
            self.present_count += 1;
        } else {
            self.absent_count += 1;
        }
        self.students.push(record);
    }

    pub fn color_tier(&self) -> ColorTier {
        ColorTier::for_present_count(self.present_count)
    }

    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTitle {
    pub present_label: String,
    pub absent_label: String,
}

impl EventTitle {
    pub fn new(present_count: u32, absent_count: u32) -> Self {
        Self {
            present_label: format!("{present_count} Present"),
            absent_label: format!("{absent_count} Absent"),
        }
    }

    /// Newline-joined form understood by the calendar widget.
    pub fn legacy_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EventTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.present_label, self.absent_label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub date: NaiveDate,
    pub title: EventTitle,
    pub color_tier: ColorTier,
}

/// Date-keyed summaries, iterated in order of each date's first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceAggregate {
    summaries: Vec<DateSummary>,
    index: HashMap<NaiveDate, usize>,
}

impl AttendanceAggregate {
    pub fn get(&self, date: NaiveDate) -> Option<&DateSummary> {
        self.index.get(&date).map(|&slot| &self.summaries[slot])
    }

    pub fn get_iso(&self, iso_date: &str) -> Option<&DateSummary> {
        let date = NaiveDate::parse_from_str(iso_date, "%Y-%m-%d").ok()?;
        self.get(date)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DateSummary> {
        self.summaries.iter()
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.summaries.iter().map(|s| s.students.len()).sum()
    }
}

pub fn aggregate<I>(records: I) -> AttendanceAggregate
where
    I: IntoIterator<Item = AttendanceRecord>,
{
    let mut aggregate = AttendanceAggregate::default();
    for record in records {
        let slot = *aggregate.index.entry(record.date).or_insert_with(|| {
            aggregate.summaries.push(DateSummary::empty(record.date));
            aggregate.summaries.len() - 1
        });
        aggregate.summaries[slot].push(record);
    }
    aggregate
}

pub fn to_events(aggregate: &AttendanceAggregate) -> Vec<CalendarEvent> {
    aggregate
        .iter()
        .map(|summary| CalendarEvent {
            date: summary.date,
            title: EventTitle::new(summary.present_count, summary.absent_count),
            color_tier: summary.color_tier(),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdaptedRecords {
    pub records: Vec<AttendanceRecord>,
    pub skipped: usize,
}

/// Maps endpoint rows to records, dropping (and counting) the malformed ones.
pub fn adapt_records(raw: Vec<RawAttendanceRecord>) -> AdaptedRecords {
    let mut adapted = AdaptedRecords::default();
    for (position, row) in raw.into_iter().enumerate() {
        match adapt_record(row) {
            Ok(record) => adapted.records.push(record),
            Err(error) => {
                warn!(position, %error, "skipping malformed attendance record");
                adapted.skipped += 1;
            }
        }
    }
    adapted
}

pub fn adapt_record(raw: RawAttendanceRecord) -> Result<AttendanceRecord, RecordError> {
    let id = raw.id.ok_or(RecordError::MissingField("id"))?;
    let student_id = raw.student_id.ok_or(RecordError::MissingField("student_id"))?;
    let status = raw.status.ok_or(RecordError::MissingField("status"))?;
    let raw_date = raw.date.ok_or(RecordError::MissingField("date"))?;
    let date = parse_calendar_date(&raw_date)?;

    let student_name = raw
        .student
        .and_then(|student| student.name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("Student ID: {student_id}"));

    Ok(AttendanceRecord {
        id: AttendanceId(id),
        student_id: StudentId(student_id),
        student_name,
        status: AttendanceStatus::from_wire(status),
        date,
    })
}

/// Keeps only the calendar-day part of an ISO-8601 date or timestamp.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, RecordError> {
    let trimmed = raw.trim();
    let day = trimmed
        .split(['T', 't', ' '])
        .next()
        .unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| RecordError::InvalidDate {
        raw: raw.to_string(),
    })
}

#[cfg(test)]
#[path = "tests/attendance_tests.rs"]
mod tests;
