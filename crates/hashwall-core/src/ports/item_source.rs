//! ItemSource port - リモートの検索 / ストリーム API
//!
//! - pull: `search` が返す `PageCursor` を `next_page` で 1 ページずつ引く
//! - push: `subscribe` が返す `ItemStream` から 1 件ずつ受け取る
//!
//! どちらも再開不可（途中から巻き戻せない）。

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::domain::{RawItem, SearchQuery, SourceError};

/// Lazy, paginated search results. `Ok(None)` once exhausted.
#[async_trait]
pub trait PageCursor: Send {
    async fn next_page(&mut self) -> Result<Option<Vec<RawItem>>, SourceError>;
}

/// Long-lived push subscription. `Ok(None)` when the remote closes it.
#[async_trait]
pub trait ItemStream: Send {
    async fn next_item(&mut self) -> Result<Option<RawItem>, SourceError>;
}

#[async_trait]
pub trait ItemSource: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Box<dyn PageCursor>, SourceError>;

    async fn subscribe(&self, track: &str) -> Result<Box<dyn ItemStream>, SourceError>;
}

/// Flattens a [`PageCursor`] into single items, optionally stopping after
/// `limit` items (the `take(n)` query shape).
///
/// Pages are only requested when the buffer runs dry, so a limit that is
/// reached mid-page never triggers another fetch.
pub struct ItemCursor {
    pages: Box<dyn PageCursor>,
    buffer: VecDeque<RawItem>,
    remaining: Option<usize>,
    exhausted: bool,
    pages_fetched: usize,
}

impl ItemCursor {
    pub fn new(pages: Box<dyn PageCursor>, limit: Option<usize>) -> Self {
        Self {
            pages,
            buffer: VecDeque::new(),
            remaining: limit,
            exhausted: false,
            pages_fetched: 0,
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub async fn next(&mut self) -> Result<Option<RawItem>, SourceError> {
        if self.remaining == Some(0) {
            return Ok(None);
        }
        loop {
            if let Some(item) = self.buffer.pop_front() {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                return Ok(Some(item));
            }
            if self.exhausted {
                return Ok(None);
            }
            match self.pages.next_page().await? {
                Some(page) => {
                    self.pages_fetched += 1;
                    tracing::debug!(page = self.pages_fetched, items = page.len(), "fetched page");
                    self.buffer.extend(page);
                }
                None => self.exhausted = true,
            }
        }
    }
}
