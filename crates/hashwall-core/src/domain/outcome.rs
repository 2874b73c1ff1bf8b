//! Ingestion outcomes and per-run counters.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::ImageRecord;

/// Classification of a single ingestion call.
///
/// Serialized as SCREAMING_SNAKE_CASE: INSERTED / SKIPPED_DUPLICATE /
/// SKIPPED_NO_IMAGE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Inserted,
    SkippedDuplicate,
    SkippedNoImage,
}

/// What the ingestion policy did with one extracted item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The record is now in the store.
    Inserted(ImageRecord),

    /// The `image_url` was already stored. Any eviction that happened
    /// before the insert attempt is not undone.
    SkippedDuplicate,

    /// The item carried no image; the store was not touched.
    SkippedNoImage,
}

impl IngestOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            IngestOutcome::Inserted(_) => OutcomeKind::Inserted,
            IngestOutcome::SkippedDuplicate => OutcomeKind::SkippedDuplicate,
            IngestOutcome::SkippedNoImage => OutcomeKind::SkippedNoImage,
        }
    }

    pub fn inserted(&self) -> Option<&ImageRecord> {
        match self {
            IngestOutcome::Inserted(record) => Some(record),
            _ => None,
        }
    }
}

/// Counters for a pull or stream run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub fetched: usize,
    pub inserted: usize,
    pub skipped_duplicate: usize,
    pub skipped_no_image: usize,
}

impl IngestSummary {
    pub fn record(&mut self, outcome: &IngestOutcome) {
        self.fetched += 1;
        match outcome.kind() {
            OutcomeKind::Inserted => self.inserted += 1,
            OutcomeKind::SkippedDuplicate => self.skipped_duplicate += 1,
            OutcomeKind::SkippedNoImage => self.skipped_no_image += 1,
        }
    }
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetched={} inserted={} duplicates={} without_image={}",
            self.fetched, self.inserted, self.skipped_duplicate, self.skipped_no_image
        )
    }
}
