//! RecordStore port - 画像レコードの永続化
//!
//! # 実装
//! - `impls::InMemoryRecordStore`（テスト・開発用）
//! - `impls::SqliteRecordStore`（本番用、sqlx）

use async_trait::async_trait;

use crate::domain::{ImageRecord, NewImageRecord, RecordId, StoreError};

/// RecordStore は ImageRecord の正本
///
/// # 設計原則
/// - `image_url` に一意制約を持ち、違反は `StoreError::DuplicateKey` で返す
/// - `oldest` は `created_at` 昇順（同時刻は id 昇順）の先頭
/// - count → evict → insert をまとめるトランザクションは提供しない。
///   呼び出し側が直列化すること
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn count(&self) -> Result<usize, StoreError>;

    async fn oldest(&self) -> Result<Option<ImageRecord>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: &RecordId) -> Result<bool, StoreError>;

    /// Store a new record. A missing `created_at` is stamped with the
    /// store's clock.
    async fn insert(&self, record: NewImageRecord) -> Result<ImageRecord, StoreError>;

    /// Newest records first.
    async fn recent(&self, limit: usize) -> Result<Vec<ImageRecord>, StoreError>;
}
