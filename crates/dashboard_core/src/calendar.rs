use chrono::NaiveDate;
use tracing::debug;

use crate::attendance::{AttendanceAggregate, AttendanceRecord, CalendarEvent};

/// Tracks the date picked on the calendar and resolves its detail records.
#[derive(Debug, Clone, Default)]
pub struct CalendarInteractionController {
    selected: Option<NaiveDate>,
}

impl CalendarInteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected
    }

    /// Records for exactly `date`, in the order they were aggregated.
    pub fn select_date<'a>(
        &mut self,
        aggregate: &'a AttendanceAggregate,
        date: NaiveDate,
    ) -> &'a [AttendanceRecord] {
        self.selected = Some(date);
        let records = records_for(aggregate, date);
        debug!(%date, records = records.len(), "calendar date selected");
        records
    }

    pub fn select_event<'a>(
        &mut self,
        aggregate: &'a AttendanceAggregate,
        event: &CalendarEvent,
    ) -> &'a [AttendanceRecord] {
        self.select_date(aggregate, event.date)
    }

    /// Re-resolves the current selection, e.g. after the aggregate was replaced.
    pub fn selected_records<'a>(
        &self,
        aggregate: &'a AttendanceAggregate,
    ) -> &'a [AttendanceRecord] {
        match self.selected {
            Some(date) => records_for(aggregate, date),
            None => &[],
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

fn records_for(aggregate: &AttendanceAggregate, date: NaiveDate) -> &[AttendanceRecord] {
    aggregate
        .get(date)
        .map(|summary| summary.students.as_slice())
        .unwrap_or(&[])
}

#[cfg(test)]
#[path = "tests/calendar_tests.rs"]
mod tests;
