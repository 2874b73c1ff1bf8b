//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryRecordStore**: テスト・開発用のストア
//! - **SqliteRecordStore**: 本番用のストア（sqlx / SQLite）
//! - **StaticItemSource**: テスト・開発用の ItemSource
//!
//! リモート API 実装は `crate::twitter` にあります。

pub mod memory_store;
pub mod sqlite_store;
pub mod static_source;

// 主要な型を再エクスポート
pub use self::memory_store::InMemoryRecordStore;
pub use self::sqlite_store::SqliteRecordStore;
pub use self::static_source::StaticItemSource;
