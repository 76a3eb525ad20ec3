//! Attendance view session: fetch, aggregate and commit a snapshot, discarding
//! responses that a newer refresh has superseded.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::protocol::{AttendanceQuery, RawAttendanceRecord};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    attendance::{
        adapt_records, aggregate, to_events, AttendanceAggregate, AttendanceRecord, CalendarEvent,
    },
    calendar::CalendarInteractionController,
    error::FetchError,
};

#[async_trait]
pub trait AttendanceSource: Send + Sync {
    async fn fetch_attendance(&self, query: &AttendanceQuery) -> Result<Vec<RawAttendanceRecord>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceSnapshot {
    pub query: Option<AttendanceQuery>,
    pub aggregate: AttendanceAggregate,
    pub events: Vec<CalendarEvent>,
    pub skipped_records: usize,
}

impl AttendanceSnapshot {
    pub fn from_raw(query: Option<AttendanceQuery>, raw: Vec<RawAttendanceRecord>) -> Self {
        let adapted = adapt_records(raw);
        let aggregate = aggregate(adapted.records);
        let events = to_events(&aggregate);
        Self {
            query,
            aggregate,
            events,
            skipped_records: adapted.skipped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Committed(RequestToken),
    Superseded { token: RequestToken, latest: RequestToken },
}

#[derive(Default)]
struct SessionState {
    committed: Option<RequestToken>,
    snapshot: AttendanceSnapshot,
    calendar: CalendarInteractionController,
}

pub struct AttendanceSession {
    source: Arc<dyn AttendanceSource>,
    generation: AtomicU64,
    state: RwLock<SessionState>,
}

impl AttendanceSession {
    pub fn new(source: Arc<dyn AttendanceSource>) -> Self {
        Self {
            source,
            generation: AtomicU64::new(0),
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn begin_request(&self) -> RequestToken {
        RequestToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn latest_token(&self) -> RequestToken {
        RequestToken(self.generation.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest_token() == token
    }

    /// Fetches attendance for `query` and commits it unless a newer refresh
    /// started in the meantime. A failed fetch leaves the previous snapshot in place.
    pub async fn refresh(&self, query: AttendanceQuery) -> Result<RefreshOutcome, FetchError> {
        let token = self.begin_request();
        let fetched = self.source.fetch_attendance(&query).await;

        if !self.is_current(token) {
            let latest = self.latest_token();
            info!(
                token = token.generation(),
                latest = latest.generation(),
                "discarding superseded attendance response"
            );
            return Ok(RefreshOutcome::Superseded { token, latest });
        }

        let raw = fetched.map_err(|source| {
            warn!(token = token.generation(), error = %source, "attendance fetch failed");
            FetchError::Attendance { source }
        })?;
        let snapshot = AttendanceSnapshot::from_raw(Some(query), raw);
        Ok(self.commit(token, snapshot).await)
    }

    /// Installs `snapshot` if `token` is still the newest request.
    pub async fn commit(
        &self,
        token: RequestToken,
        snapshot: AttendanceSnapshot,
    ) -> RefreshOutcome {
        let mut state = self.state.write().await;
        let latest = self.latest_token();
        if token != latest {
            return RefreshOutcome::Superseded { token, latest };
        }

        info!(
            token = token.generation(),
            dates = snapshot.aggregate.len(),
            records = snapshot.aggregate.record_count(),
            skipped = snapshot.skipped_records,
            "committed attendance snapshot"
        );
        state.committed = Some(token);
        state.snapshot = snapshot;
        RefreshOutcome::Committed(token)
    }

    pub async fn committed_token(&self) -> Option<RequestToken> {
        self.state.read().await.committed
    }

    pub async fn snapshot(&self) -> AttendanceSnapshot {
        self.state.read().await.snapshot.clone()
    }

    pub async fn events(&self) -> Vec<CalendarEvent> {
        self.state.read().await.snapshot.events.clone()
    }

    pub async fn select_date(&self, date: NaiveDate) -> Vec<AttendanceRecord> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state
            .calendar
            .select_date(&state.snapshot.aggregate, date)
            .to_vec()
    }

    pub async fn selected_date(&self) -> Option<NaiveDate> {
        self.state.read().await.calendar.selected_date()
    }

    pub async fn selected_records(&self) -> Vec<AttendanceRecord> {
        let state = self.state.read().await;
        state
            .calendar
            .selected_records(&state.snapshot.aggregate)
            .to_vec()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
