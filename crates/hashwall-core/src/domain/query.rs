//! Search query shapes for pull mode.

use chrono::{Days, NaiveDate};

use crate::ports::Clock;

/// Which slice of history a search covers.
///
/// The two shapes are mutually exclusive: the remote API only accepts a
/// day-granularity lower bound, and a count limit is applied client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchWindow {
    /// Items posted on or after this date.
    Since(NaiveDate),

    /// At most this many items, newest first.
    Limit(usize),
}

impl SearchWindow {
    /// Everything since yesterday: the closest the API gets to "last 24h".
    pub fn since_yesterday(clock: &dyn Clock) -> Self {
        let today = clock.now().date_naive();
        SearchWindow::Since(today.checked_sub_days(Days::new(1)).unwrap_or(today))
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            SearchWindow::Limit(n) => Some(*n),
            SearchWindow::Since(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub hashtag: String,
    pub window: SearchWindow,
}

impl SearchQuery {
    pub fn new(hashtag: impl Into<String>, window: SearchWindow) -> Self {
        Self {
            hashtag: hashtag.into(),
            window,
        }
    }
}
