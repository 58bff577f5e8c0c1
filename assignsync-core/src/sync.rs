//! Dedup + write loop.
//!
//! Titles are the dedup key: an event whose summary already exists in the store is
//! never written again. A failed create is recorded and the loop moves on.

use std::collections::HashSet;

use tracing::{error, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::event::CalendarEvent;
use crate::store::{NewRecord, RecordStore};

/// What to do when the existing titles cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadFailurePolicy {
    /// Log a warning and treat the store as empty. Every candidate is attempted,
    /// so a transient read failure can produce duplicate records.
    #[default]
    FailOpen,
    /// Abort before writing anything.
    FailClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added,
    /// Title already present in the store
    Skipped,
    /// Dry run: would have been created
    WouldAdd,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOutcome {
    pub summary: String,
    pub outcome: Outcome,
}

/// Per-event results of one sync, in candidate order.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub outcomes: Vec<EventOutcome>,
    /// The existing-titles read failed and the run continued without dedup
    pub read_failed: bool,
    /// Nothing was written; new titles are reported as `WouldAdd`
    pub dry_run: bool,
}

impl SyncReport {
    pub fn added(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Added))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped))
    }

    pub fn would_add(&self) -> usize {
        self.count(|o| matches!(o, Outcome::WouldAdd))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }
}

/// Read the existing titles, then create every candidate that is not among them.
pub async fn sync_events<S: RecordStore>(
    store: &S,
    candidates: &[CalendarEvent],
    policy: ReadFailurePolicy,
    dry_run: bool,
) -> SyncResult<SyncReport> {
    let (existing, read_failed) = match store.existing_titles().await {
        Ok(titles) => (titles, false),
        Err(e) if policy == ReadFailurePolicy::FailClosed => {
            return Err(match e {
                SyncError::StoreRead(_) => e,
                other => SyncError::StoreRead(other.to_string()),
            });
        }
        Err(e) => {
            warn!(
                error = %e,
                "Could not read existing records; every candidate will be treated as new"
            );
            (Vec::new(), true)
        }
    };

    let mut report = export_events(store, candidates, existing, dry_run).await;
    report.read_failed = read_failed;
    Ok(report)
}

/// Create a record for every candidate whose title is not in `existing`.
///
/// Created titles join the known set, so a title listed twice in the feed is only
/// written once.
pub async fn export_events<S: RecordStore>(
    store: &S,
    candidates: &[CalendarEvent],
    existing: Vec<String>,
    dry_run: bool,
) -> SyncReport {
    let mut known: HashSet<String> = existing.into_iter().collect();
    let mut report = SyncReport {
        dry_run,
        ..SyncReport::default()
    };

    for event in candidates {
        let outcome = if known.contains(&event.summary) {
            info!(summary = %event.summary, "Skipped (already exists)");
            Outcome::Skipped
        } else {
            let record = NewRecord::from_event(event);

            if dry_run {
                Outcome::WouldAdd
            } else {
                match store.create_record(&record).await {
                    Ok(()) => {
                        info!(summary = %event.summary, "Added");
                        Outcome::Added
                    }
                    Err(e) => {
                        error!(summary = %event.summary, error = %e, "Error adding record");
                        Outcome::Failed(e.to_string())
                    }
                }
            }
        };

        if matches!(outcome, Outcome::Added | Outcome::WouldAdd) {
            known.insert(event.summary.clone());
        }

        report.outcomes.push(EventOutcome {
            summary: event.summary.clone(),
            outcome,
        });
    }

    report
}
