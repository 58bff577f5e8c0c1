//! The remote record store seam.
//!
//! `NotionClient` is the production implementation. The sync writer only ever needs
//! two operations: list every existing title, and create one record.

use crate::error::SyncResult;
use crate::event::CalendarEvent;

/// Notion rejects rich text segments longer than this.
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

/// A record store that can be synced into.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Titles of every record currently in the store. Duplicates are allowed.
    async fn existing_titles(&self) -> SyncResult<Vec<String>>;

    /// Create a single record.
    async fn create_record(&self, record: &NewRecord) -> SyncResult<()>;
}

/// Normalized payload for a record creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub title: String,
    pub start: String,
    pub end: String,
    pub description: String,
}

impl NewRecord {
    pub fn from_event(event: &CalendarEvent) -> Self {
        NewRecord {
            title: event.summary.clone(),
            start: event.start.to_timestamp(),
            end: event.end.to_timestamp(),
            description: normalize_description(event.description.as_deref()),
        }
    }
}

/// Absent descriptions become empty; long ones are cut at `MAX_DESCRIPTION_CHARS`.
pub fn normalize_description(description: Option<&str>) -> String {
    description
        .map(|d| d.chars().take(MAX_DESCRIPTION_CHARS).collect())
        .unwrap_or_default()
}
