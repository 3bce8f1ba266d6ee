//! Lazy continuation-token pagination.

use std::collections::VecDeque;

use super::BatchError;

/// One page returned by a paginated call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Present while more pages follow
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// A page with no continuation
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }
}

type FetchPage<T> = Box<dyn FnMut(Option<&str>) -> Result<Page<T>, BatchError> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PagerState {
    Start,
    More,
    Done,
}

/// Iterator over the items of a paginated call.
///
/// Pages are fetched on demand: the first page when the first item is
/// requested, the next one when the buffered items run out. Iteration ends
/// after a page without a continuation token. Empty pages that still carry a
/// token are followed. A failed fetch is yielded once and ends the iteration.
pub struct Paginated<T> {
    fetch: FetchPage<T>,
    buffer: VecDeque<T>,
    next_token: Option<String>,
    state: PagerState,
    pages_fetched: usize,
}

impl<T> Paginated<T> {
    pub fn new(
        fetch: impl FnMut(Option<&str>) -> Result<Page<T>, BatchError> + Send + 'static,
    ) -> Self {
        Self {
            fetch: Box::new(fetch),
            buffer: VecDeque::new(),
            next_token: None,
            state: PagerState::Start,
            pages_fetched: 0,
        }
    }

    /// Items of the current page not yet yielded.
    ///
    /// Zero right after an item means a page boundary was reached.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn fetch_next(&mut self) -> Result<(), BatchError> {
        let token = self.next_token.take();
        let page = (self.fetch)(token.as_deref())?;
        self.pages_fetched += 1;
        self.buffer.extend(page.items);
        match page.next_token {
            Some(token) => {
                self.next_token = Some(token);
                self.state = PagerState::More;
            }
            None => {
                tracing::debug!(pages = self.pages_fetched, "Pagination finished");
                self.state = PagerState::Done;
            }
        }
        Ok(())
    }
}

impl<T> Iterator for Paginated<T> {
    type Item = Result<T, BatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.state == PagerState::Done {
                return None;
            }
            if let Err(e) = self.fetch_next() {
                self.state = PagerState::Done;
                return Some(Err(e));
            }
        }
    }
}
