//! Request and response shapes of the remote dashboard endpoints.

use chrono::NaiveDate;
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

use crate::domain::InstituteId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttendanceQuery {
    #[serde(rename_all = "camelCase")]
    Month {
        institute_id: InstituteId,
        month: u32,
        year: i32,
    },
    #[serde(rename_all = "camelCase")]
    Range {
        institute_id: InstituteId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

impl AttendanceQuery {
    pub fn institute_id(&self) -> InstituteId {
        match self {
            Self::Month { institute_id, .. } | Self::Range { institute_id, .. } => *institute_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStudentRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// One attendance row as the endpoint sends it. A field that is absent or has
/// the wrong JSON type reads as `None`, and a row that is not an object reads
/// as an all-`None` row, so one broken row cannot fail the whole response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttendanceRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub student_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub student: Option<RawStudentRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponse {
    #[serde(default, deserialize_with = "lenient_rows")]
    pub student_attendance: Vec<RawAttendanceRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

impl<T> Lenient<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Lenient<T>>::deserialize(deserializer)?.and_then(Lenient::into_option))
}

fn lenient_rows<'de, D>(deserializer: D) -> Result<Vec<RawAttendanceRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Option::<Vec<Lenient<RawAttendanceRecord>>>::deserialize(deserializer)?;
    Ok(rows
        .unwrap_or_default()
        .into_iter()
        .map(|row| row.into_option().unwrap_or_default())
        .collect())
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
