//! Record identifiers.
//!
//! # ULID ベースの ID
//! RecordId は ULID を包む newtype です。
//! - 時刻でソート可能（同じ created_at のレコードを安定して並べられる）
//! - ストアごとの採番テーブルが不要
//!
//! Display は `img-` プレフィックス付き、保存時は素の ULID 文字列を使います。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

const PREFIX: &str = "img-";

/// Identifier of a stored [`ImageRecord`](super::ImageRecord).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Ulid);

impl RecordId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for RecordId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = ulid::DecodeError;

    /// Accepts both `img-<ulid>` and a bare ULID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(PREFIX).unwrap_or(s);
        Ulid::from_string(raw).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_prefix() {
        let id = RecordId::from_ulid(Ulid::new());
        assert!(id.to_string().starts_with("img-"));
    }

    #[test]
    fn parses_prefixed_and_bare_forms() {
        let ulid = Ulid::new();
        let id = RecordId::from_ulid(ulid);

        assert_eq!(id.to_string().parse::<RecordId>().unwrap(), id);
        assert_eq!(ulid.to_string().parse::<RecordId>().unwrap(), id);
        assert!("img-not-a-ulid".parse::<RecordId>().is_err());
    }

    #[test]
    fn ids_sort_by_generation_time() {
        let first = RecordId::from_ulid(Ulid::new());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = RecordId::from_ulid(Ulid::new());

        assert!(first < second);
    }
}
