//! Generic page-walk used by the offset- and cursor-paginated sources.
//!
//! The loop owns the shared termination conditions (result cap, request
//! budget, exhausted cursor, failed fetch); each source encodes its own
//! exhaustion predicate by returning `next_cursor: None` from the fetch
//! closure. A failed page fetch keeps whatever was already collected.

use crate::error::HarvestError;
use std::future::Future;
use tracing::warn;

/// One fetched page: its items and the cursor for the next page, if any.
pub struct Page<T, C> {
    pub items: Vec<T>,
    pub next_cursor: Option<C>,
}

/// Walk pages starting at `start` until `cap` items are collected, the
/// cursor is exhausted, `max_requests` pages have been fetched, or a fetch
/// fails. The closure receives the current cursor.
pub async fn collect_paginated<T, C, F, Fut>(
    cap: usize,
    max_requests: usize,
    start: C,
    mut fetch: F,
) -> Vec<T>
where
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<Page<T, C>, HarvestError>>,
{
    let mut collected: Vec<T> = Vec::new();
    let mut cursor = Some(start);
    let mut requests = 0usize;

    while let Some(current) = cursor.take() {
        if collected.len() >= cap || requests >= max_requests {
            break;
        }
        requests += 1;
        match fetch(current).await {
            Ok(page) => {
                collected.extend(page.items);
                cursor = page.next_cursor;
            }
            Err(err) => {
                warn!(error = %err, "page fetch failed, keeping partial results");
                break;
            }
        }
    }

    collected.truncate(cap);
    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn short_page_terminates_the_walk() {
        // medRxiv-style offset pagination: page sizes 100, 100, 37 with a
        // configured page size of 100 must issue exactly three requests.
        let page_size = 100usize;
        let sizes = [100usize, 100, 37];
        let requests = Cell::new(0usize);

        let items = collect_paginated(10_000, 100, 0usize, |offset| {
            requests.set(requests.get() + 1);
            let fetched = sizes[requests.get() - 1];
            async move {
                let next = if fetched == 0 || fetched < page_size {
                    None
                } else {
                    Some(offset + fetched)
                };
                Ok(Page {
                    items: vec![0u8; fetched],
                    next_cursor: next,
                })
            }
        })
        .await;

        assert_eq!(requests.get(), 3);
        assert_eq!(items.len(), 237);
    }

    #[tokio::test]
    async fn cap_truncates_and_stops_requesting() {
        let requests = Cell::new(0usize);

        let items = collect_paginated(150, 100, 0usize, |offset| {
            requests.set(requests.get() + 1);
            async move {
                Ok(Page {
                    items: vec![0u8; 100],
                    next_cursor: Some(offset + 100),
                })
            }
        })
        .await;

        assert_eq!(requests.get(), 2);
        assert_eq!(items.len(), 150);
    }

    #[tokio::test]
    async fn failed_page_keeps_partial_results() {
        let requests = Cell::new(0usize);

        let items = collect_paginated(10_000, 100, 0usize, |offset| {
            requests.set(requests.get() + 1);
            let n = requests.get();
            async move {
                if n == 2 {
                    return Err(HarvestError::Status {
                        status: 500,
                        url: "http://api.test".to_string(),
                    });
                }
                Ok(Page {
                    items: vec![0u8; 100],
                    next_cursor: Some(offset + 100),
                })
            }
        })
        .await;

        assert_eq!(requests.get(), 2);
        assert_eq!(items.len(), 100);
    }

    #[tokio::test]
    async fn request_budget_bounds_the_walk() {
        let items = collect_paginated(10_000, 3, 0usize, |offset| async move {
            Ok(Page {
                items: vec![0u8; 10],
                next_cursor: Some(offset + 10),
            })
        })
        .await;

        assert_eq!(items.len(), 30);
    }
}
