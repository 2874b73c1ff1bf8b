//! Domain model (records, raw items, extraction, outcomes, errors).

pub mod errors;
pub mod extract;
pub mod ids;
pub mod item;
pub mod outcome;
pub mod query;
pub mod record;

pub use errors::{IngestError, SourceError, StoreError};
pub use extract::{Extraction, extract};
pub use ids::RecordId;
pub use item::{Author, Entities, MediaEntity, RawItem};
pub use outcome::{IngestOutcome, IngestSummary, OutcomeKind};
pub use query::{SearchQuery, SearchWindow};
pub use record::{ImageRecord, NewImageRecord};
