use std::marker::PhantomData;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::InstituteSummary,
    protocol::{AttendanceQuery, AttendanceResponse, PageQuery, PageResponse, RawAttendanceRecord},
};
use tracing::debug;

use crate::{
    error::FetchError,
    pagination::{Page, PageAccumulator, PageSource},
    session::AttendanceSource,
};

pub const INSTITUTES: &str = "institutes";
pub const ATTENDANCES: &str = "attendances";

/// HTTP access to the paged collection and attendance endpoints.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: Client,
    base_url: String,
    accumulator: PageAccumulator,
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, Client::new())
    }

    pub fn with_http_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            accumulator: PageAccumulator::new(),
        }
    }

    pub fn with_accumulator(mut self, accumulator: PageAccumulator) -> Self {
        self.accumulator = accumulator;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn page<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &PageQuery,
    ) -> Result<PageResponse<T>> {
        let url = format!("{}/{collection}", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("invalid page payload from {url}"))?;
        Ok(response)
    }

    pub fn collection<T>(&self, collection: impl Into<String>) -> PagedCollection<'_, T> {
        PagedCollection {
            client: self,
            collection: collection.into(),
            search: None,
            _items: PhantomData,
        }
    }

    pub async fn fetch_all<T>(
        &self,
        collection: &str,
        search: Option<&str>,
    ) -> Result<Vec<T>, FetchError>
    where
        T: DeserializeOwned + Send,
    {
        let source = self
            .collection::<T>(collection)
            .with_search(search.map(str::to_string));
        self.accumulator.fetch_all(&source).await
    }

    pub async fn fetch_all_institutes(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<InstituteSummary>, FetchError> {
        self.fetch_all(INSTITUTES, search).await
    }

    pub async fn fetch_attendance(
        &self,
        query: &AttendanceQuery,
    ) -> Result<Vec<RawAttendanceRecord>> {
        let url = format!("{}/{ATTENDANCES}", self.base_url);
        let response: AttendanceResponse = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("invalid attendance payload from {url}"))?;
        debug!(
            institute_id = query.institute_id().0,
            rows = response.student_attendance.len(),
            "fetched attendance rows"
        );
        Ok(response.student_attendance)
    }
}

#[async_trait]
impl AttendanceSource for DashboardClient {
    async fn fetch_attendance(&self, query: &AttendanceQuery) -> Result<Vec<RawAttendanceRecord>> {
        DashboardClient::fetch_attendance(self, query).await
    }
}

/// One named collection of the paged endpoint, optionally filtered by a search term.
pub struct PagedCollection<'a, T> {
    client: &'a DashboardClient,
    collection: String,
    search: Option<String>,
    _items: PhantomData<fn() -> T>,
}

impl<T> PagedCollection<'_, T> {
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|term| !term.trim().is_empty());
        self
    }
}

#[async_trait]
impl<'a, T> PageSource<T> for PagedCollection<'a, T>
where
    T: DeserializeOwned + Send,
{
    async fn request_page(&self, page_number: u32, page_size: u32) -> Result<Page<T>> {
        let query = PageQuery {
            page: page_number,
            limit: page_size,
            search: self.search.clone(),
        };
        let response: PageResponse<T> = self.client.page(&self.collection, &query).await?;
        debug!(
            collection = %self.collection,
            page = page_number,
            total = response.total,
            total_pages = response.total_pages,
            "received collection page"
        );
        Ok(Page {
            items: response.data,
            page_number,
            total_pages: response.total_pages.max(1),
        })
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
