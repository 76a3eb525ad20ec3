use thiserror::Error;

use crate::board::ListName;

/// Failure of a remote fetch. No partial data is ever handed back alongside it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network failure while fetching page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: anyhow::Error,
    },
    #[error("network failure while fetching attendance: {source}")]
    Attendance {
        #[source]
        source: anyhow::Error,
    },
    #[error("paged source still reported more pages after {max_pages} requests")]
    PageLimitExceeded { max_pages: u32 },
}

/// Why a raw attendance row was skipped by the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("attendance record is missing `{0}`")]
    MissingField(&'static str),
    #[error("attendance record has unparseable date `{raw}`")]
    InvalidDate { raw: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("item id `{id}` appears more than once across the {first} and {second} lists")]
    DuplicateId {
        id: String,
        first: ListName,
        second: ListName,
    },
}
