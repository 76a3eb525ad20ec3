use super::*;
use anyhow::anyhow;
use std::sync::{Arc, Mutex};

struct VecSource {
    items: Vec<u32>,
    requested: Arc<Mutex<Vec<u32>>>,
    fail_on: Option<u32>,
}

impl VecSource {
    fn new(len: u32) -> Self {
        Self {
            items: (0..len).collect(),
            requested: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
        }
    }

    fn failing_on(mut self, page: u32) -> Self {
        self.fail_on = Some(page);
        self
    }
}

#[async_trait]
impl PageSource<u32> for VecSource {
    async fn request_page(&self, page_number: u32, page_size: u32) -> Result<Page<u32>> {
        self.requested.lock().expect("lock").push(page_number);
        if self.fail_on == Some(page_number) {
            return Err(anyhow!("connection reset"));
        }
        let size = page_size as usize;
        let start = (page_number as usize - 1) * size;
        let items = self.items.iter().skip(start).take(size).copied().collect();
        let total_pages = (self.items.len() as u32).div_ceil(page_size).max(1);
        Ok(Page {
            items,
            page_number,
            total_pages,
        })
    }
}

#[tokio::test]
async fn three_page_source_yields_every_item_in_order() {
    let source = VecSource::new(237);
    let requested = source.requested.clone();

    let items = PageAccumulator::new()
        .fetch_all(&source)
        .await
        .expect("accumulate");

    assert_eq!(items.len(), 237);
    assert_eq!(items, (0..237).collect::<Vec<_>>());
    assert_eq!(*requested.lock().expect("lock"), vec![1, 2, 3]);
}

#[tokio::test]
async fn empty_collection_requests_a_single_page() {
    let source = VecSource::new(0);
    let requested = source.requested.clone();

    let items = PageAccumulator::new()
        .fetch_all(&source)
        .await
        .expect("accumulate");

    assert!(items.is_empty());
    assert_eq!(*requested.lock().expect("lock"), vec![1]);
}

#[tokio::test]
async fn failing_page_discards_partial_result() {
    let source = VecSource::new(250).failing_on(2);
    let requested = source.requested.clone();

    let err = PageAccumulator::new()
        .fetch_all(&source)
        .await
        .expect_err("must fail");

    assert!(matches!(err, FetchError::Page { page: 2, .. }));
    assert_eq!(*requested.lock().expect("lock"), vec![1, 2]);
}

#[tokio::test]
async fn latest_total_pages_is_authoritative() {
    // The collection shrinks from 5 pages to 2 while paging.
    let reported = [5_u32, 2];
    let items = PageAccumulator::new()
        .with_page_size(10)
        .fetch_all_with(|page, _size| async move {
            Ok(Page {
                items: vec![page],
                page_number: page,
                total_pages: reported[(page as usize - 1).min(1)],
            })
        })
        .await
        .expect("accumulate");

    assert_eq!(items, vec![1, 2]);
}

#[tokio::test]
async fn page_size_is_forwarded_to_the_source() {
    let sizes = Arc::new(Mutex::new(Vec::new()));
    let seen = sizes.clone();
    PageAccumulator::new()
        .with_page_size(25)
        .fetch_all_with(move |page, size| {
            seen.lock().expect("lock").push(size);
            async move {
                Ok(Page {
                    items: Vec::<u8>::new(),
                    page_number: page,
                    total_pages: 1,
                })
            }
        })
        .await
        .expect("accumulate");

    assert_eq!(*sizes.lock().expect("lock"), vec![25]);
}

#[tokio::test]
async fn runaway_total_pages_is_bounded() {
    let err = PageAccumulator::new()
        .with_max_pages(3)
        .fetch_all_with(|page, _size| async move {
            Ok(Page {
                items: vec![page],
                page_number: page,
                total_pages: page + 1,
            })
        })
        .await
        .expect_err("must stop");

    assert!(matches!(err, FetchError::PageLimitExceeded { max_pages: 3 }));
}
