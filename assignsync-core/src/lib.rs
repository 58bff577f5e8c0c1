//! Core library for assignsync.
//!
//! The pipeline fetches an iCalendar feed, keeps upcoming assignment events and
//! creates a Notion page for every one that is not already in the target database:
//! - `feed` and `ics` download and parse the calendar
//! - `filter` narrows events down to assignment candidates
//! - `store` / `notion` read existing titles and create records
//! - `sync` runs the dedup + write loop
//! - `pipeline` wires everything together behind `run()`

pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod filter;
pub mod ics;
pub mod notion;
pub mod pipeline;
pub mod store;
pub mod sync;

pub use crate::config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use event::{CalendarEvent, EventTime};
pub use pipeline::{RunSummary, SyncOptions, run, run_with_store};
pub use store::{NewRecord, RecordStore};
pub use sync::{EventOutcome, Outcome, ReadFailurePolicy, SyncReport};
