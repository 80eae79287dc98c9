//! Cursor-driven pagination.
//!
//! Every list call on the platform returns a page plus an optional
//! continuation token. [`Paginator`] wraps such a call as a lazy, finite
//! sequence of pages. It moves forward only and cannot be restarted.

use std::future::Future;
use std::marker::PhantomData;

use crate::adapters::{ApiError, Page};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lazily follows continuation tokens until the platform stops returning one
pub struct Paginator<T, F> {
    fetch: F,
    cursor: Cursor,
    _item: PhantomData<T>,
}

impl<T, F, Fut> Paginator<T, F>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
{
    /// Wrap a page fetcher; nothing is requested until the first `next_page`
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            cursor: Cursor::Start,
            _item: PhantomData,
        }
    }

    /// Whether the last page has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.cursor == Cursor::Done
    }

    /// Fetch the next page, or `None` once the sequence is exhausted.
    ///
    /// An error ends the sequence; later calls return `None`.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>, ApiError> {
        let token = match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Done => return Ok(None),
            Cursor::Start => None,
            Cursor::Next(token) => Some(token),
        };

        let page = (self.fetch)(token).await?;
        if let Some(next) = page.next_page_token.filter(|t| !t.is_empty()) {
            self.cursor = Cursor::Next(next);
        }
        Ok(Some(page.items))
    }

    /// Drain every remaining page into one vector
    pub async fn try_collect(mut self) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }
}
