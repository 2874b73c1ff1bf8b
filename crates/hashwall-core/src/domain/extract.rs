//! Image extraction: raw item -> image record (or nothing).

use super::item::RawItem;
use super::record::NewImageRecord;

/// Result of looking for an image in a raw item.
///
/// `NoImage` is an expected, frequent outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Image(NewImageRecord),
    NoImage,
}

impl Extraction {
    pub fn is_image(&self) -> bool {
        matches!(self, Extraction::Image(_))
    }
}

/// Pick the first media attachment of `item`.
///
/// The author is the item's screen name and `created_at` is copied from the
/// item when present. Pure function, no side effects.
pub fn extract(item: &RawItem) -> Extraction {
    match item.media().first() {
        Some(media) => {
            let record = NewImageRecord {
                author: item.user.screen_name.clone(),
                image_url: media.media_url.clone(),
                created_at: item.created_at,
            };
            Extraction::Image(record)
        }
        None => Extraction::NoImage,
    }
}
