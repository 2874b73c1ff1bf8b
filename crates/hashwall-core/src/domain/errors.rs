//! Errors - エラー型と分類
//!
//! # 分類
//! - 想定内（パイプラインで吸収）: 画像なし → `Extraction::NoImage`、
//!   重複 → `StoreError::DuplicateKey`
//! - 致命的（呼び出し元へ伝播）: 認証情報の欠落、通信・ストレージ障害
//!
//! リトライはしない。

use thiserror::Error;

/// Errors raised by a [`RecordStore`](crate::ports::RecordStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Uniqueness violation on `image_url`.
    #[error("image already stored: {image_url}")]
    DuplicateKey { image_url: String },

    #[error("storage backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }
}

/// Errors raised by an [`ItemSource`](crate::ports::ItemSource).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("missing API credential: {variable}")]
    Credentials { variable: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode remote payload: {0}")]
    Decode(String),

    #[error("request signing failed: {0}")]
    Signing(String),
}

/// Fatal error for one ingestion call or driver run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Source(#[from] SourceError),
}
