//! Trait definitions for the reminder pipeline module boundaries:
//! - EventSource: seek-paginated query of reminder events
//! - ContactResolver: active reminder-classified contacts for a customer
//! - SendSchedule: business-calendar send date per channel

use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;

use super::error::ReminderError;
use super::query::ItemQuery;
use crate::models::{Channel, Contact, ReminderEvent};

/// Ordered, filtered access to reminder events, keyed by the items' stable
/// monotonic id. `fetch_after(None, ..)` starts at the beginning; passing
/// the last-yielded key resumes strictly after it.
pub trait EventSource {
    fn fetch_after(
        &mut self,
        conn: &Connection,
        query: &ItemQuery,
        after_key: Option<i64>,
        limit: usize,
    ) -> Result<Vec<ReminderEvent>, ReminderError>;
}

/// Resolves a customer's active contacts classified for reminders.
pub trait ContactResolver {
    fn reminder_contacts(
        &self,
        conn: &Connection,
        customer_id: &Uuid,
    ) -> Result<Vec<Contact>, ReminderError>;
}

/// Business-calendar offset per channel: when an item for `channel` should
/// actually be sent, given the escalation's base send date.
pub trait SendSchedule {
    fn send_date(&self, base: NaiveDate, channel: Channel) -> NaiveDate;
}

/// Default resolver over the `contacts` table.
pub struct SqliteContactResolver;

impl ContactResolver for SqliteContactResolver {
    fn reminder_contacts(
        &self,
        conn: &Connection,
        customer_id: &Uuid,
    ) -> Result<Vec<Contact>, ReminderError> {
        Ok(crate::db::repository::list_reminder_contacts(
            conn,
            customer_id,
        )?)
    }
}
