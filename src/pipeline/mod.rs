//! Patient-care reminder pipeline.
//!
//! The pipeline pulls pending reminder events out of the store through a
//! seek-paginated cursor, batches adjacent events into per-recipient groups
//! for combined delivery, and generates the channel items each reminder's
//! escalation rules call for. Everything is single-threaded pull: callers
//! drive the cursor and own retry policy.

pub mod cursor;
pub mod error;
pub mod grouping;
pub mod processor;
pub mod query;
pub mod rules;
pub mod source;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

pub use cursor::PagedCursor;
pub use error::ReminderError;
pub use grouping::{GroupingIterator, GroupingPolicy, ReminderGroup};
pub use processor::{BatchFailure, BatchOutcome, Disposition, ReminderProcessor};
pub use query::ItemQuery;
pub use source::SqliteEventSource;
pub use traits::{ContactResolver, EventSource, SendSchedule, SqliteContactResolver};
