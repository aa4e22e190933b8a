//! Offset pagination over list endpoints.
//!
//! A listing is read page by page until a page comes back shorter than the
//! page size. The API reports no total count, so a result that is an exact
//! multiple of the page size costs one extra, empty page.

use std::future::Future;

use tracing::{debug, warn};

use crate::Result;
use crate::error::Error;

pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn pairs(self) -> [(&'static str, String); 2] {
        [
            ("offset", self.offset.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

/// Items gathered by [`Pager::fetch_all`].
///
/// When a page request fails the chain stops; `items` then holds everything
/// read before the failure and `interrupted` holds the error.
#[derive(Debug)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub pages: usize,
    pub interrupted: Option<Error>,
}

impl<T> Paged<T> {
    pub const fn is_complete(&self) -> bool {
        self.interrupted.is_none()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Pager {
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub const fn new(page_size: usize) -> Self {
        Self {
            page_size: if page_size == 0 { 1 } else { page_size },
        }
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Read every page from `fetch_page`, strictly one after the other.
    pub async fn fetch_all<T, F, Fut>(&self, resource: &'static str, mut fetch_page: F) -> Paged<T>
    where
        F: FnMut(PageRequest) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let mut items = Vec::new();
        let mut pages = 0;
        let mut offset = 0;

        loop {
            let request = PageRequest {
                offset,
                limit: self.page_size,
            };
            pages += 1;
            match fetch_page(request).await {
                Ok(page) => {
                    let len = page.len();
                    items.extend(page);
                    if len < self.page_size {
                        debug!(resource, pages, total = items.len(), "pagination finished");
                        return Paged {
                            items,
                            pages,
                            interrupted: None,
                        };
                    }
                    offset += len;
                }
                Err(err) => {
                    warn!(
                        resource,
                        offset,
                        kept = items.len(),
                        error = %err,
                        "page fetch failed; keeping partial results"
                    );
                    return Paged {
                        items,
                        pages,
                        interrupted: Some(err),
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PageRequest, Paged, Pager};
    use crate::error::{Error, GenieError};
    use std::cell::RefCell;

    /// Serves `total` sequential integers, failing at `fail_at_offset` if set.
    async fn run(
        page_size: usize,
        total: usize,
        fail_at_offset: Option<usize>,
    ) -> (Paged<usize>, Vec<PageRequest>) {
        let seen = RefCell::new(Vec::new());
        let paged = Pager::new(page_size)
            .fetch_all("numbers", |req| {
                seen.borrow_mut().push(req);
                async move {
                    if Some(req.offset) == fail_at_offset {
                        return Err(Error::from(GenieError::HttpStatus {
                            status: reqwest::StatusCode::BAD_REQUEST,
                        }));
                    }
                    let end = (req.offset + req.limit).min(total);
                    Ok((req.offset.min(total)..end).collect())
                }
            })
            .await;
        (paged, seen.into_inner())
    }

    #[tokio::test]
    async fn short_page_ends_pagination() {
        let (paged, requests) = run(100, 250, None).await;
        assert!(paged.is_complete());
        assert_eq!(paged.pages, 3);
        assert_eq!(paged.items, (0..250).collect::<Vec<_>>());
        let offsets: Vec<_> = requests.iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![0, 100, 200]);
        assert!(requests.iter().all(|r| r.limit == 100));
    }

    #[tokio::test]
    async fn exact_multiple_costs_one_empty_page() {
        let (paged, _) = run(10, 30, None).await;
        assert_eq!(paged.pages, 4);
        assert_eq!(paged.items.len(), 30);
    }

    #[tokio::test]
    async fn empty_listing_is_one_request() {
        let (paged, _) = run(5, 0, None).await;
        assert_eq!(paged.pages, 1);
        assert!(paged.items.is_empty());
        assert!(paged.is_complete());
    }

    #[tokio::test]
    async fn page_counts_hold_for_several_sizes() {
        for page_size in [1, 3, 7, 100] {
            for total in [1, 6, 21, 99, 100, 101] {
                let (paged, _) = run(page_size, total, None).await;
                let expected = if total % page_size == 0 {
                    total / page_size + 1
                } else {
                    total.div_ceil(page_size)
                };
                assert_eq!(paged.pages, expected, "page_size={page_size} total={total}");
                assert_eq!(paged.items.len(), total);
            }
        }
    }

    #[tokio::test]
    async fn failure_keeps_earlier_pages_only() {
        let (paged, requests) = run(10, 50, Some(20)).await;
        assert!(!paged.is_complete());
        assert_eq!(paged.items, (0..20).collect::<Vec<_>>());
        assert_eq!(requests.len(), 3);
        assert!(matches!(
            paged.interrupted,
            Some(Error::Genie(GenieError::HttpStatus { .. }))
        ));
    }

    #[test]
    fn zero_page_size_is_clamped() {
        assert_eq!(Pager::new(0).page_size(), 1);
    }
}
