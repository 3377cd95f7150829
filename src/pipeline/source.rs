//! SQLite-backed event source.
//!
//! Renders an `ItemQuery` to a joined select over items, reminders,
//! patients and customers, ordered by item id and seek-paginated with
//! `id > ?after`. Reminder types are snapshotted per source lifetime: a
//! type (its counts, rules and interactive flag included) is read once the
//! first time it appears and served from the cache thereafter.

use std::collections::HashMap;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use uuid::Uuid;

use super::error::ReminderError;
use super::query::ItemQuery;
use super::traits::EventSource;
use crate::db::repository::party::list_reminder_contacts;
use crate::db::repository::reminder::{item_from_row, reminder_from_row, ItemRow, ReminderRow};
use crate::db::repository::reminder_type::get_reminder_type;
use crate::db::parse_uuid;
use crate::models::{Customer, Patient, ReminderEvent, ReminderType};

pub struct SqliteEventSource {
    types: HashMap<Uuid, ReminderType>,
}

impl SqliteEventSource {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    fn reminder_type(
        &mut self,
        conn: &Connection,
        id: &Uuid,
    ) -> Result<ReminderType, ReminderError> {
        if let Some(cached) = self.types.get(id) {
            return Ok(cached.clone());
        }
        let loaded =
            get_reminder_type(conn, id)?.ok_or(ReminderError::ReminderTypeNotFound(*id))?;
        self.types.insert(*id, loaded.clone());
        Ok(loaded)
    }
}

impl Default for SqliteEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for SqliteEventSource {
    fn fetch_after(
        &mut self,
        conn: &Connection,
        query: &ItemQuery,
        after_key: Option<i64>,
        limit: usize,
    ) -> Result<Vec<ReminderEvent>, ReminderError> {
        let mut sql = String::from(
            "SELECT i.id, i.reminder_id, i.channel, i.send_date, i.due_date, i.status,
                    i.reminder_count, i.error,
                    r.id, r.patient_id, r.reminder_type_id, r.due_date, r.status,
                    r.reminder_count, r.product_id, r.created_at,
                    p.id, p.customer_id, p.name, p.species, p.deceased, p.active,
                    c.id, c.name, c.location_id, c.active
             FROM reminder_items i
             JOIN reminders r ON r.id = i.reminder_id
             JOIN patients p ON p.id = r.patient_id
             JOIN customers c ON c.id = p.customer_id
             WHERE i.status = ?",
        );
        let mut params: Vec<Value> = vec![query.status.as_str().to_string().into()];

        if let Some(channel) = query.channel {
            sql.push_str(" AND i.channel = ?");
            params.push(channel.as_str().to_string().into());
        }
        if let Some(customer) = query.customer {
            sql.push_str(" AND c.id = ?");
            params.push(customer.to_string().into());
        }
        if let Some(location) = query.location {
            sql.push_str(" AND c.location_id = ?");
            params.push(location.to_string().into());
        }
        if let Some(from) = query.from {
            sql.push_str(" AND i.send_date >= ?");
            params.push(from.to_string().into());
        }
        if let Some(to) = query.to {
            sql.push_str(" AND i.send_date <= ?");
            params.push(to.to_string().into());
        }
        if let Some(after) = after_key {
            sql.push_str(" AND i.id > ?");
            params.push(after.into());
        }

        sql.push_str(" ORDER BY i.id ASC LIMIT ?");
        params.push((limit as i64).into());

        let mut stmt = conn
            .prepare(&sql)
            .map_err(crate::db::DatabaseError::from)?;

        let rows = stmt
            .query_map(params_from_iter(params), |row| {
                Ok(SourceRow {
                    item: ItemRow {
                        id: row.get(0)?,
                        reminder_id: row.get(1)?,
                        channel: row.get(2)?,
                        send_date: row.get(3)?,
                        due_date: row.get(4)?,
                        status: row.get(5)?,
                        reminder_count: row.get(6)?,
                        error: row.get(7)?,
                    },
                    reminder: ReminderRow {
                        id: row.get(8)?,
                        patient_id: row.get(9)?,
                        reminder_type_id: row.get(10)?,
                        due_date: row.get(11)?,
                        status: row.get(12)?,
                        reminder_count: row.get(13)?,
                        product_id: row.get(14)?,
                        created_at: row.get(15)?,
                    },
                    patient_id: row.get(16)?,
                    patient_customer_id: row.get(17)?,
                    patient_name: row.get(18)?,
                    patient_species: row.get(19)?,
                    patient_deceased: row.get(20)?,
                    patient_active: row.get(21)?,
                    customer_id: row.get(22)?,
                    customer_name: row.get(23)?,
                    customer_location_id: row.get(24)?,
                    customer_active: row.get(25)?,
                })
            })
            .map_err(crate::db::DatabaseError::from)?;

        let mut events = Vec::new();
        for row in rows {
            let row = row.map_err(crate::db::DatabaseError::from)?;
            events.push(self.event_from_row(conn, row)?);
        }
        Ok(events)
    }
}

struct SourceRow {
    item: ItemRow,
    reminder: ReminderRow,
    patient_id: String,
    patient_customer_id: String,
    patient_name: String,
    patient_species: Option<String>,
    patient_deceased: bool,
    patient_active: bool,
    customer_id: String,
    customer_name: String,
    customer_location_id: Option<String>,
    customer_active: bool,
}

impl SqliteEventSource {
    fn event_from_row(
        &mut self,
        conn: &Connection,
        row: SourceRow,
    ) -> Result<ReminderEvent, ReminderError> {
        let item = item_from_row(row.item)?;
        let reminder = reminder_from_row(row.reminder)?;

        let patient = Patient {
            id: parse_uuid("patients.id", &row.patient_id)?,
            customer_id: parse_uuid("patients.customer_id", &row.patient_customer_id)?,
            name: row.patient_name,
            species: row.patient_species,
            deceased: row.patient_deceased,
            active: row.patient_active,
        };
        let customer = Customer {
            id: parse_uuid("customers.id", &row.customer_id)?,
            name: row.customer_name,
            location_id: row
                .customer_location_id
                .as_deref()
                .map(|s| parse_uuid("customers.location_id", s))
                .transpose()?,
            active: row.customer_active,
        };

        let reminder_type = self.reminder_type(conn, &reminder.reminder_type_id)?;

        let contact = list_reminder_contacts(conn, &customer.id)?
            .into_iter()
            .find(|c| c.supports(item.channel));

        Ok(ReminderEvent {
            item,
            reminder,
            reminder_type,
            patient,
            customer,
            contact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{Channel, ItemStatus};
    use crate::pipeline::testutil::{seed_practice, spawn_reminder};

    #[test]
    fn fetches_in_item_id_order() {
        let conn = open_memory_database().unwrap();
        let practice = seed_practice(&conn);
        let ids = [
            spawn_reminder(&conn, &practice, Channel::Email),
            spawn_reminder(&conn, &practice, Channel::Sms),
            spawn_reminder(&conn, &practice, Channel::List),
        ];

        let mut source = SqliteEventSource::new();
        let query = ItemQuery::new(ItemStatus::Pending);
        let events = source.fetch_after(&conn, &query, None, 10).unwrap();

        assert_eq!(events.len(), 3);
        let keys: Vec<i64> = events.iter().map(|e| e.sort_key()).collect();
        assert_eq!(keys, ids.to_vec());
    }

    #[test]
    fn seek_resumes_strictly_after_key() {
        let conn = open_memory_database().unwrap();
        let practice = seed_practice(&conn);
        let first = spawn_reminder(&conn, &practice, Channel::Email);
        let second = spawn_reminder(&conn, &practice, Channel::Email);

        let mut source = SqliteEventSource::new();
        let query = ItemQuery::new(ItemStatus::Pending);
        let events = source.fetch_after(&conn, &query, Some(first), 10).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sort_key(), second);
    }

    #[test]
    fn channel_filter_applies() {
        let conn = open_memory_database().unwrap();
        let practice = seed_practice(&conn);
        spawn_reminder(&conn, &practice, Channel::Email);
        let sms_id = spawn_reminder(&conn, &practice, Channel::Sms);

        let mut source = SqliteEventSource::new();
        let query = ItemQuery::new(ItemStatus::Pending).with_channel(Channel::Sms);
        let events = source.fetch_after(&conn, &query, None, 10).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sort_key(), sms_id);
        assert_eq!(events[0].item.channel, Channel::Sms);
    }

    #[test]
    fn events_carry_matching_contact() {
        let conn = open_memory_database().unwrap();
        let practice = seed_practice(&conn);
        spawn_reminder(&conn, &practice, Channel::Email);
        spawn_reminder(&conn, &practice, Channel::Print);

        let mut source = SqliteEventSource::new();
        let query = ItemQuery::new(ItemStatus::Pending);
        let events = source.fetch_after(&conn, &query, None, 10).unwrap();

        // seed_practice registers an email contact only
        assert!(events[0].contact.is_some());
        assert!(events[1].contact.is_none());
    }

    #[test]
    fn reminder_type_is_snapshotted() {
        let conn = open_memory_database().unwrap();
        let practice = seed_practice(&conn);
        spawn_reminder(&conn, &practice, Channel::Email);

        let mut source = SqliteEventSource::new();
        let query = ItemQuery::new(ItemStatus::Pending);
        let before = source.fetch_after(&conn, &query, None, 10).unwrap();
        assert!(!before[0].reminder_type.interactive);

        // Flip the flag in the store: the snapshot must not see it
        conn.execute(
            "UPDATE reminder_types SET interactive = 1 WHERE id = ?1",
            [practice.reminder_type.id.to_string()],
        )
        .unwrap();

        spawn_reminder(&conn, &practice, Channel::Email);
        let after = source
            .fetch_after(&conn, &query, Some(before[0].sort_key()), 10)
            .unwrap();
        assert!(!after[0].reminder_type.interactive);

        // A fresh source reads the updated record
        let mut fresh = SqliteEventSource::new();
        let reread = fresh.fetch_after(&conn, &query, None, 10).unwrap();
        assert!(reread[0].reminder_type.interactive);
    }
}
