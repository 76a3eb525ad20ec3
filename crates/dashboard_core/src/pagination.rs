//! Sequential accumulation of a paged remote collection into one ordered list.

use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::FetchError;

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_PAGES: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub total_pages: u32,
}

#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn request_page(&self, page_number: u32, page_size: u32) -> Result<Page<T>>;
}

#[derive(Debug, Clone, Copy)]
pub struct PageAccumulator {
    page_size: u32,
    max_pages: u32,
}

impl Default for PageAccumulator {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl PageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub async fn fetch_all<T, S>(&self, source: &S) -> Result<Vec<T>, FetchError>
    where
        S: PageSource<T> + ?Sized,
    {
        self.fetch_all_with(|page, size| source.request_page(page, size))
            .await
    }

    /// Requests pages strictly one after another, starting at page 1, until the
    /// most recent response says the current page is the last one. The first
    /// failing page aborts the whole accumulation.
    pub async fn fetch_all_with<T, F, Fut>(&self, mut request_page: F) -> Result<Vec<T>, FetchError>
    where
        F: FnMut(u32, u32) -> Fut,
        Fut: Future<Output = Result<Page<T>>>,
    {
        let mut accumulated = Vec::new();
        let mut page_number = 1;

        loop {
            let page = request_page(page_number, self.page_size)
                .await
                .map_err(|source| FetchError::Page {
                    page: page_number,
                    source,
                })?;

            if page.page_number != page_number {
                warn!(
                    requested = page_number,
                    reported = page.page_number,
                    "paged source reported a different page number"
                );
            }

            let received = page.items.len();
            accumulated.extend(page.items);
            debug!(
                page = page_number,
                total_pages = page.total_pages,
                received,
                accumulated = accumulated.len(),
                "accumulated page"
            );

            if page_number >= page.total_pages {
                break;
            }
            if page_number >= self.max_pages {
                return Err(FetchError::PageLimitExceeded {
                    max_pages: self.max_pages,
                });
            }
            page_number += 1;
        }

        Ok(accumulated)
    }
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
