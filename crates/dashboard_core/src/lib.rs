//! Client-side aggregation core of the institute dashboard: paged collection
//! accumulation, attendance aggregation with calendar events, calendar date
//! selection, and the two-list drag-and-drop store.

pub mod attendance;
pub mod board;
pub mod calendar;
pub mod error;
pub mod http;
pub mod pagination;
pub mod session;

pub use attendance::{
    AttendanceAggregate, AttendanceRecord, CalendarEvent, ColorTier, DateSummary, EventTitle,
};
pub use board::{BoardOutcome, ListItem, ListName, NoopReason, ReorderableListStore};
pub use calendar::CalendarInteractionController;
pub use error::{BoardError, FetchError, RecordError};
pub use http::DashboardClient;
pub use pagination::{Page, PageAccumulator, PageSource};
pub use session::{AttendanceSession, AttendanceSnapshot, AttendanceSource, RefreshOutcome};
