//! StaticItemSource - 開発・テスト用の ItemSource
//!
//! - search: 事前に積んだページをそのまま返す（`Since` は created_at で絞る）
//! - subscribe: mpsc チャネルから受け取る。送信側を drop するとストリーム終了

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{RawItem, SearchQuery, SearchWindow, SourceError};
use crate::ports::{ItemSource, ItemStream, PageCursor};

pub struct StaticItemSource {
    pages: Vec<Vec<RawItem>>,
    pushed: Mutex<Option<mpsc::UnboundedReceiver<RawItem>>>,
    queries: Mutex<Vec<SearchQuery>>,
    subscriptions: Mutex<Vec<String>>,
}

impl StaticItemSource {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            pushed: Mutex::new(None),
            queries: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_page(mut self, page: Vec<RawItem>) -> Self {
        self.pages.push(page);
        self
    }

    /// Items the stream delivers before closing.
    pub fn with_pushed(self, items: Vec<RawItem>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        for item in items {
            // rx は生きているので失敗しない
            let _ = tx.send(item);
        }
        *lock(&self.pushed) = Some(rx);
        self
    }

    /// Open-ended stream: items arrive through the returned sender and the
    /// stream stays open until it is dropped.
    pub fn with_channel(self) -> (Self, mpsc::UnboundedSender<RawItem>) {
        let (tx, rx) = mpsc::unbounded_channel();
        *lock(&self.pushed) = Some(rx);
        (self, tx)
    }

    pub fn queries(&self) -> Vec<SearchQuery> {
        lock(&self.queries).clone()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        lock(&self.subscriptions).clone()
    }
}

impl Default for StaticItemSource {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

struct StaticPages {
    pages: VecDeque<Vec<RawItem>>,
}

#[async_trait]
impl PageCursor for StaticPages {
    async fn next_page(&mut self) -> Result<Option<Vec<RawItem>>, SourceError> {
        Ok(self.pages.pop_front())
    }
}

struct ChannelStream {
    rx: Option<mpsc::UnboundedReceiver<RawItem>>,
}

#[async_trait]
impl ItemStream for ChannelStream {
    async fn next_item(&mut self) -> Result<Option<RawItem>, SourceError> {
        match self.rx.as_mut() {
            Some(rx) => Ok(rx.recv().await),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ItemSource for StaticItemSource {
    async fn search(&self, query: &SearchQuery) -> Result<Box<dyn PageCursor>, SourceError> {
        lock(&self.queries).push(query.clone());

        let pages = self
            .pages
            .iter()
            .map(|page| match query.window {
                SearchWindow::Since(since) => page
                    .iter()
                    .filter(|item| item.created_at.is_none_or(|at| at.date_naive() >= since))
                    .cloned()
                    .collect(),
                SearchWindow::Limit(_) => page.clone(),
            })
            .collect();

        Ok(Box::new(StaticPages { pages }))
    }

    async fn subscribe(&self, track: &str) -> Result<Box<dyn ItemStream>, SourceError> {
        lock(&self.subscriptions).push(track.to_string());
        let rx = lock(&self.pushed).take();
        Ok(Box::new(ChannelStream { rx }))
    }
}
