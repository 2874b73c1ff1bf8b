//! Raw items as delivered by the remote source.
//!
//! Only the fields the pipeline reads are modelled; everything else in the
//! payload is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Timestamp format used by the v1.1 REST and streaming endpoints,
/// e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const REMOTE_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// One post returned by search or pushed by a stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawItem {
    pub id_str: String,
    pub user: Author,

    #[serde(default, deserialize_with = "deserialize_remote_time")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub entities: Option<Entities>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
    pub screen_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub media: Option<Vec<MediaEntity>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaEntity {
    pub media_url: String,

    #[serde(default)]
    pub media_url_https: Option<String>,

    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl RawItem {
    pub fn new(id: impl Into<String>, screen_name: impl Into<String>) -> Self {
        Self {
            id_str: id.into(),
            user: Author {
                screen_name: screen_name.into(),
            },
            created_at: None,
            entities: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Append a photo attachment.
    pub fn with_media(mut self, media_url: impl Into<String>) -> Self {
        let entities = self.entities.get_or_insert_with(Entities::default);
        entities.media.get_or_insert_with(Vec::new).push(MediaEntity {
            media_url: media_url.into(),
            media_url_https: None,
            kind: Some("photo".to_string()),
        });
        self
    }

    /// Attachments, or an empty slice when the item has none.
    pub fn media(&self) -> &[MediaEntity] {
        self.entities
            .as_ref()
            .and_then(|e| e.media.as_deref())
            .unwrap_or(&[])
    }

    /// Numeric id, used as the pagination bound.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id_str.parse().ok()
    }
}

/// Parse either the remote `REMOTE_TIME_FORMAT` or RFC 3339.
pub fn parse_remote_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, REMOTE_TIME_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn deserialize_remote_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) => parse_remote_time(&value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid created_at: {value}"))),
    }
}
