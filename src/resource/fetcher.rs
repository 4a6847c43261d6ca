//! Resource Fetcher
//!
//! Walks paginated listings one page at a time.

use crate::gcp::OperationResult;
use std::future::Future;

/// One page of a remote listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        // The APIs send "" instead of omitting the token on the last page
        let next_page_token = next_page_token.filter(|t| !t.is_empty());
        Self {
            items,
            next_page_token,
        }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::last(Vec::new())
    }
}

/// Drain a paginated listing, handing each item to `visit` as it arrives.
///
/// Returns the number of items visited. Pages are requested only when the
/// previous one has been consumed, so nothing bounds the listing size.
pub async fn for_each_item<T, F, Fut, V>(mut fetch_page: F, mut visit: V) -> OperationResult<usize>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = OperationResult<Page<T>>>,
    V: FnMut(usize, T),
{
    let mut count = 0;
    let mut page_token: Option<String> = None;

    loop {
        let page = fetch_page(page_token.take()).await?;
        for item in page.items {
            count += 1;
            visit(count, item);
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(count)
}
