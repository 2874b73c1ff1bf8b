//! Image record: the only persisted entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::RecordId;

/// A stored image.
///
/// Records are created once by the ingestion policy and never mutated.
/// `image_url` is unique across the whole store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: RecordId,
    pub author: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// An image that has been extracted but not yet stored.
///
/// `created_at` is optional: the store stamps the record with its own clock
/// when the source item carried no timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewImageRecord {
    pub author: String,
    pub image_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewImageRecord {
    pub fn new(author: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            image_url: image_url.into(),
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Turn into a stored record, falling back to `now` for a missing timestamp.
    pub fn into_record(self, id: RecordId, now: DateTime<Utc>) -> ImageRecord {
        ImageRecord {
            id,
            author: self.author,
            image_url: self.image_url,
            created_at: self.created_at.unwrap_or(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ulid::Ulid;

    #[test]
    fn into_record_keeps_source_timestamp() {
        let posted = Utc.with_ymd_and_hms(2016, 5, 1, 10, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2016, 5, 2, 10, 0, 0).unwrap();
        let id = RecordId::from_ulid(Ulid::new());

        let record = NewImageRecord::new("alice", "http://img/1.jpg")
            .with_created_at(posted)
            .into_record(id, now);

        assert_eq!(record.created_at, posted);
        assert_eq!(record.id, id);
    }

    #[test]
    fn into_record_defaults_to_now() {
        let now = Utc.with_ymd_and_hms(2016, 5, 2, 10, 0, 0).unwrap();
        let record = NewImageRecord::new("alice", "http://img/1.jpg")
            .into_record(RecordId::from_ulid(Ulid::new()), now);

        assert_eq!(record.created_at, now);
    }
}
