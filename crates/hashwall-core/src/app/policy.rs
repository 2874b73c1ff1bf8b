//! IngestionPolicy - 重複排除 + 上限付きの取り込み
//!
//! # フロー（1 件ごと）
//! 1. 画像なし → `SkippedNoImage`（ストアに触らない）
//! 2. `count()` で件数を取得
//! 3. 件数 >= max_records なら最古の 1 件を削除（insert の成否に関係なく）
//! 4. insert
//!    - 成功 → `Inserted`
//!    - 一意制約違反 → `SkippedDuplicate`（3 の削除は巻き戻さない）
//! 5. それ以外のストアエラーは呼び出し元へ伝播
//!
//! count → evict → insert は原子的ではない。並行に呼ばないこと。

use tracing::{debug, info};

use crate::config::{ConfigError, WallConfig};
use crate::domain::{Extraction, IngestError, IngestOutcome, RawItem, StoreError, extract};
use crate::ports::RecordStore;

pub struct IngestionPolicy<S> {
    store: S,
    max_records: usize,
}

impl<S: RecordStore> IngestionPolicy<S> {
    pub fn new(store: S, max_records: usize) -> Result<Self, ConfigError> {
        if max_records == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self { store, max_records })
    }

    pub fn from_config(store: S, config: &WallConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(store, config.max_records)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    /// Extract and ingest one raw item.
    pub async fn ingest_item(&self, item: &RawItem) -> Result<IngestOutcome, IngestError> {
        self.ingest(extract(item)).await
    }

    pub async fn ingest(&self, extraction: Extraction) -> Result<IngestOutcome, IngestError> {
        let record = match extraction {
            Extraction::Image(record) => record,
            Extraction::NoImage => {
                info!("item doesn't contain an image");
                return Ok(IngestOutcome::SkippedNoImage);
            }
        };
        info!(image_url = %record.image_url, "item contains an image");

        let count = self.store.count().await?;
        debug!(count, "records currently stored");

        if count >= self.max_records {
            info!(max_records = self.max_records, "maximum number of records reached");
            if let Some(oldest) = self.store.oldest().await? {
                info!(
                    id = %oldest.id,
                    created_at = %oldest.created_at,
                    "deleting oldest record"
                );
                self.store.delete(&oldest.id).await?;
            }
        }

        match self.store.insert(record).await {
            Ok(stored) => {
                info!(
                    id = %stored.id,
                    author = %stored.author,
                    created_at = %stored.created_at,
                    "new record ingested"
                );
                Ok(IngestOutcome::Inserted(stored))
            }
            Err(StoreError::DuplicateKey { image_url }) => {
                info!(%image_url, "image already stored, skipping");
                Ok(IngestOutcome::SkippedDuplicate)
            }
            Err(err) => Err(err.into()),
        }
    }
}
