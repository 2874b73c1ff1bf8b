//! SqliteRecordStore - sqlx による本番用ストア
//!
//! # テーブル
//! - `image_records(id, author, image_url UNIQUE, created_at)`
//! - created_at は UTC・ナノ秒固定幅の RFC 3339 文字列（精度を落とさない）。
//!   文字列順 = 時刻順なので ORDER BY がそのまま使える
//! - id は素の ULID 文字列（同時刻のタイブレーク）

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};

use crate::domain::{ImageRecord, NewImageRecord, RecordId, StoreError};
use crate::ports::{Clock, IdGenerator, RecordStore, UlidGenerator};

pub struct SqliteRecordStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    ids: UlidGenerator<Arc<dyn Clock>>,
}

impl SqliteRecordStore {
    /// Open (or create) the database file at `path` and run migrations.
    pub async fn open(path: &Path, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::backend(format!("failed to create directory: {e}")))?;
        }

        // URL を経由しない（`%` や `?` を含むパスもそのまま開く）
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        Self::connect(options, clock).await
    }

    pub async fn open_in_memory(clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::backend(format!("invalid SQLite path: {e}")))?;

        Self::connect(options, clock).await
    }

    async fn connect(options: SqliteConnectOptions, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        // 1 接続に固定（:memory: は接続ごとに別 DB になるため）
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::backend(format!("failed to connect to SQLite: {e}")))?;

        let store = Self {
            pool,
            ids: UlidGenerator::new(Arc::clone(&clock)),
            clock,
        };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS image_records (
                id TEXT PRIMARY KEY,
                author TEXT NOT NULL,
                image_url TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend(format!("failed to create image_records: {e}")))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_image_records_age
            ON image_records(created_at, id)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend(format!("failed to create index: {e}")))?;

        Ok(())
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn record_from_row(row: &SqliteRow) -> Result<ImageRecord, StoreError> {
    let decode = |e: sqlx::Error| StoreError::backend(format!("failed to read row: {e}"));

    let id: String = row.try_get("id").map_err(decode)?;
    let created_at: String = row.try_get("created_at").map_err(decode)?;

    Ok(ImageRecord {
        id: RecordId::from_str(&id)
            .map_err(|e| StoreError::backend(format!("invalid record id {id}: {e}")))?,
        author: row.try_get("author").map_err(decode)?,
        image_url: row.try_get("image_url").map_err(decode)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| StoreError::backend(format!("invalid created_at {created_at}: {e}")))?
            .with_timezone(&Utc),
    })
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn count(&self) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM image_records")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::backend(format!("count failed: {e}")))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| StoreError::backend(format!("count failed: {e}")))?;
        Ok(usize::try_from(n).unwrap_or_default())
    }

    async fn oldest(&self) -> Result<Option<ImageRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, author, image_url, created_at FROM image_records \
             ORDER BY created_at ASC, id ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::backend(format!("oldest lookup failed: {e}")))?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn delete(&self, id: &RecordId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM image_records WHERE id = ?")
            .bind(id.as_ulid().to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::backend(format!("delete failed: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert(&self, record: NewImageRecord) -> Result<ImageRecord, StoreError> {
        let stored = record.into_record(self.ids.generate_record_id(), self.clock.now());

        sqlx::query(
            "INSERT INTO image_records (id, author, image_url, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(stored.id.as_ulid().to_string())
        .bind(&stored.author)
        .bind(&stored.image_url)
        .bind(format_time(stored.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateKey {
                image_url: stored.image_url.clone(),
            },
            _ => StoreError::backend(format!("insert failed: {e}")),
        })?;

        Ok(stored)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ImageRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, author, image_url, created_at FROM image_records \
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend(format!("recent lookup failed: {e}")))?;

        rows.iter().map(record_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FixedClock;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 4, 24, hour, 0, 0).unwrap()
    }

    async fn store() -> SqliteRecordStore {
        SqliteRecordStore::open_in_memory(Arc::new(FixedClock::new(at(20))))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn insert_roundtrips_through_sqlite() {
        let store = store().await;
        let posted = Utc.with_ymd_and_hms(2016, 4, 24, 9, 30, 15).unwrap()
            + chrono::Duration::microseconds(250);

        let inserted = store
            .insert(NewImageRecord::new("alice", "http://img/1.jpg").with_created_at(posted))
            .await
            .unwrap();

        let oldest = store.oldest().await.unwrap().unwrap();
        assert_eq!(oldest, inserted);
        assert_eq!(oldest.created_at, posted);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn sub_microsecond_timestamps_survive_storage() {
        let posted = Utc.with_ymd_and_hms(2016, 4, 24, 0, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let store = SqliteRecordStore::open_in_memory(Arc::new(FixedClock::new(posted)))
            .await
            .unwrap();

        let inserted = store.insert(NewImageRecord::new("alice", "u")).await.unwrap();
        let read = store.oldest().await.unwrap().unwrap();

        assert_eq!(inserted.created_at, posted);
        assert_eq!(read, inserted);
    }

    #[tokio::test]
    async fn nanosecond_apart_records_keep_their_order() {
        let store = store().await;
        let base = at(9);
        store
            .insert(NewImageRecord::new("alice", "later").with_created_at(base + chrono::Duration::nanoseconds(1)))
            .await
            .unwrap();
        store
            .insert(NewImageRecord::new("alice", "earlier").with_created_at(base))
            .await
            .unwrap();

        assert_eq!(store.oldest().await.unwrap().unwrap().image_url, "earlier");
    }

    #[tokio::test]
    async fn open_keeps_special_characters_in_file_name() {
        let dir = std::env::temp_dir().join(format!("hashwall-{}", ulid::Ulid::new()));
        let path = dir.join("wall%41?x.db");

        let store = SqliteRecordStore::open(&path, Arc::new(FixedClock::new(at(0))))
            .await
            .unwrap();
        store.insert(NewImageRecord::new("alice", "u")).await.unwrap();

        assert!(path.exists());
        assert!(!dir.join("wallA.db").exists());

        drop(store);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn unique_violation_maps_to_duplicate_key() {
        let store = store().await;
        store
            .insert(NewImageRecord::new("alice", "http://img/1.jpg"))
            .await
            .unwrap();

        let err = store
            .insert(NewImageRecord::new("bob", "http://img/1.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateKey { ref image_url } if image_url == "http://img/1.jpg"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn oldest_orders_by_created_at() {
        let store = store().await;
        for (url, hour) in [("b", 12), ("a", 9), ("c", 15)] {
            store
                .insert(NewImageRecord::new("alice", url).with_created_at(at(hour)))
                .await
                .unwrap();
        }

        let oldest = store.oldest().await.unwrap().unwrap();
        assert_eq!(oldest.image_url, "a");

        assert!(store.delete(&oldest.id).await.unwrap());
        assert_eq!(store.oldest().await.unwrap().unwrap().image_url, "b");
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn missing_created_at_uses_store_clock() {
        let store = store().await;
        let record = store.insert(NewImageRecord::new("alice", "u")).await.unwrap();

        assert_eq!(record.created_at, at(20));
        assert_eq!(store.oldest().await.unwrap().unwrap().created_at, at(20));
    }

    #[tokio::test]
    async fn recent_is_newest_first() {
        let store = store().await;
        for (url, hour) in [("a", 9), ("c", 15), ("b", 12)] {
            store
                .insert(NewImageRecord::new("alice", url).with_created_at(at(hour)))
                .await
                .unwrap();
        }

        let urls: Vec<_> = store
            .recent(2)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.image_url)
            .collect();
        assert_eq!(urls, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_false() {
        let store = store().await;
        let id = RecordId::from_ulid(ulid::Ulid::new());
        assert!(!store.delete(&id).await.unwrap());
    }
}
