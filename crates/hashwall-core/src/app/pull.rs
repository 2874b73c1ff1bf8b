//! PullDriver - 検索結果を取り込む
//!
//! # フロー
//! 1. `ItemSource::search` でカーソル取得
//! 2. `ItemCursor` でページを平坦化（`Limit(n)` はここで打ち切り）
//! 3. 1 件ずつ extract → ingest
//!
//! 最後まで読み切る。途中のエラーはそのまま返す（リトライなし）。

use tracing::info;

use super::policy::IngestionPolicy;
use crate::domain::{IngestError, IngestSummary, SearchQuery};
use crate::ports::{ItemCursor, ItemSource, RecordStore};

pub struct PullDriver<'a, S> {
    policy: &'a IngestionPolicy<S>,
}

impl<'a, S: RecordStore> PullDriver<'a, S> {
    pub fn new(policy: &'a IngestionPolicy<S>) -> Self {
        Self { policy }
    }

    pub async fn run(
        &self,
        source: &dyn ItemSource,
        query: &SearchQuery,
    ) -> Result<IngestSummary, IngestError> {
        info!(hashtag = %query.hashtag, window = ?query.window, "searching");
        let pages = source.search(query).await?;
        let mut items = ItemCursor::new(pages, query.window.limit());
        info!("obtained results, processing...");

        let mut summary = IngestSummary::default();
        while let Some(item) = items.next().await? {
            let outcome = self.policy.ingest_item(&item).await?;
            summary.record(&outcome);
        }

        info!(pages = items.pages_fetched(), %summary, "pull finished");
        Ok(summary)
    }
}
