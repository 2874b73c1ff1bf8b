//! TwitterClient - v1.1 REST search + filter stream
//!
//! # エンドポイント
//! - search: `GET /1.1/search/tweets.json`（max_id で過去方向にページング）
//! - stream: `POST /1.1/statuses/filter.json`（改行区切り JSON）
//!
//! クライアントは一度だけ作って各ドライバに渡す（グローバル状態なし）。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::credentials::Credentials;
use super::oauth::OAuthSigner;
use super::stream::LineItemStream;
use crate::domain::{RawItem, SearchQuery, SearchWindow, SourceError};
use crate::ports::{Clock, ItemSource, ItemStream, PageCursor};

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";
pub const DEFAULT_STREAM_BASE: &str = "https://stream.twitter.com";

/// Largest page the search endpoint returns.
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    statuses: Vec<RawItem>,
}

struct Inner {
    http: reqwest::Client,
    signer: OAuthSigner,
    clock: Arc<dyn Clock>,
    api_base: String,
    stream_base: String,
}

impl Inner {
    fn search_url(&self) -> String {
        format!("{}/1.1/search/tweets.json", self.api_base)
    }

    fn filter_url(&self) -> String {
        format!("{}/1.1/statuses/filter.json", self.stream_base)
    }

    fn authorization(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
    ) -> Result<String, SourceError> {
        self.signer
            .authorization(method, url, params, self.clock.now().timestamp())
    }
}

/// Remote [`ItemSource`] backed by the v1.1 API.
#[derive(Clone)]
pub struct TwitterClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterClient")
            .field("api_base", &self.inner.api_base)
            .field("stream_base", &self.inner.stream_base)
            .finish()
    }
}

impl TwitterClient {
    pub fn new(credentials: Credentials, clock: Arc<dyn Clock>) -> Result<Self, SourceError> {
        Self::with_base_urls(credentials, clock, DEFAULT_API_BASE, DEFAULT_STREAM_BASE)
    }

    pub fn with_base_urls(
        credentials: Credentials,
        clock: Arc<dyn Clock>,
        api_base: impl Into<String>,
        stream_base: impl Into<String>,
    ) -> Result<Self, SourceError> {
        // 全体タイムアウトは付けない（stream は長時間つなぎっぱなし）
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SourceError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_http(http, credentials, clock, api_base, stream_base))
    }

    /// Use an already configured `reqwest::Client`.
    pub fn with_http(
        http: reqwest::Client,
        credentials: Credentials,
        clock: Arc<dyn Clock>,
        api_base: impl Into<String>,
        stream_base: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                signer: OAuthSigner::new(credentials),
                clock,
                api_base: api_base.into().trim_end_matches('/').to_string(),
                stream_base: stream_base.into().trim_end_matches('/').to_string(),
            }),
        }
    }
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SourceError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Query parameters for one search page.
fn search_params(query: &SearchQuery, page_size: usize, max_id: Option<u64>) -> Vec<(String, String)> {
    let mut params = vec![
        ("q".to_string(), query.hashtag.clone()),
        ("count".to_string(), page_size.to_string()),
        ("include_entities".to_string(), "true".to_string()),
        ("result_type".to_string(), "recent".to_string()),
    ];
    if let SearchWindow::Since(since) = query.window {
        params.push(("since".to_string(), since.format("%Y-%m-%d").to_string()));
    }
    if let Some(max_id) = max_id {
        params.push(("max_id".to_string(), max_id.to_string()));
    }
    params
}

/// Next `max_id`: one below the smallest id on the page.
fn next_max_id(page: &[RawItem]) -> Option<u64> {
    page.iter()
        .filter_map(RawItem::numeric_id)
        .min()
        .and_then(|id| id.checked_sub(1))
}

/// Walks search results backwards in time with `max_id`.
struct SearchCursor {
    inner: Arc<Inner>,
    query: SearchQuery,
    page_size: usize,
    max_id: Option<u64>,
    done: bool,
}

#[async_trait]
impl PageCursor for SearchCursor {
    async fn next_page(&mut self) -> Result<Option<Vec<RawItem>>, SourceError> {
        if self.done {
            return Ok(None);
        }

        let url = self.inner.search_url();
        let params = search_params(&self.query, self.page_size, self.max_id);
        let authorization = self.inner.authorization("GET", &url, &params)?;
        debug!(max_id = ?self.max_id, "requesting search page");

        let response = self
            .inner
            .http
            .get(&url)
            .query(&params)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        let page: SearchResponse = error_for_status(response)
            .await?
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        if page.statuses.is_empty() {
            self.done = true;
            return Ok(None);
        }
        match next_max_id(&page.statuses) {
            Some(max_id) => self.max_id = Some(max_id),
            None => self.done = true,
        }
        Ok(Some(page.statuses))
    }
}

#[async_trait]
impl ItemSource for TwitterClient {
    async fn search(&self, query: &SearchQuery) -> Result<Box<dyn PageCursor>, SourceError> {
        let page_size = query
            .window
            .limit()
            .map_or(MAX_PAGE_SIZE, |n| n.clamp(1, MAX_PAGE_SIZE));

        Ok(Box::new(SearchCursor {
            inner: Arc::clone(&self.inner),
            query: query.clone(),
            page_size,
            max_id: None,
            done: false,
        }))
    }

    async fn subscribe(&self, track: &str) -> Result<Box<dyn ItemStream>, SourceError> {
        let url = self.inner.filter_url();
        let params = vec![("track".to_string(), track.to_string())];
        let authorization = self.inner.authorization("POST", &url, &params)?;

        let response = self
            .inner
            .http
            .post(&url)
            .form(&params)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        let response = error_for_status(response).await?;
        info!(%track, "connected to filter stream");

        Ok(Box::new(LineItemStream::new(response.bytes_stream())))
    }
}
