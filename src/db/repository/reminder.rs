use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::{parse_uuid, DatabaseError};
use crate::models::{Channel, ItemStatus, Reminder, ReminderItem, ReminderStatus};

// ═══════════════════════════════════════════
// Reminders
// ═══════════════════════════════════════════

pub fn insert_reminder(conn: &Connection, reminder: &Reminder) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO reminders
         (id, patient_id, reminder_type_id, due_date, status, reminder_count, product_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            reminder.id.to_string(),
            reminder.patient_id.to_string(),
            reminder.reminder_type_id.to_string(),
            reminder.due_date,
            reminder.status.as_str(),
            reminder.reminder_count,
            reminder.product_id.map(|id| id.to_string()),
            reminder.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_reminder(conn: &Connection, id: &Uuid) -> Result<Option<Reminder>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, patient_id, reminder_type_id, due_date, status, reminder_count,
                product_id, created_at
         FROM reminders WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(ReminderRow {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                reminder_type_id: row.get(2)?,
                due_date: row.get(3)?,
                status: row.get(4)?,
                reminder_count: row.get(5)?,
                product_id: row.get(6)?,
                created_at: row.get(7)?,
            })
        },
    );

    match result {
        Ok(row) => Ok(Some(reminder_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn set_reminder_status(
    conn: &Connection,
    id: &Uuid,
    status: ReminderStatus,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE reminders SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "reminders".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Advance the escalation count. The count only ever increases.
pub fn set_reminder_count(conn: &Connection, id: &Uuid, count: i32) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE reminders SET reminder_count = ?1 WHERE id = ?2 AND reminder_count <= ?1",
        params![count, id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "reminders".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub(crate) struct ReminderRow {
    pub id: String,
    pub patient_id: String,
    pub reminder_type_id: String,
    pub due_date: NaiveDate,
    pub status: String,
    pub reminder_count: i32,
    pub product_id: Option<String>,
    pub created_at: NaiveDateTime,
}

pub(crate) fn reminder_from_row(row: ReminderRow) -> Result<Reminder, DatabaseError> {
    Ok(Reminder {
        id: parse_uuid("reminders.id", &row.id)?,
        patient_id: parse_uuid("reminders.patient_id", &row.patient_id)?,
        reminder_type_id: parse_uuid("reminders.reminder_type_id", &row.reminder_type_id)?,
        due_date: row.due_date,
        status: ReminderStatus::from_str(&row.status)?,
        reminder_count: row.reminder_count,
        product_id: row
            .product_id
            .as_deref()
            .map(|s| parse_uuid("reminders.product_id", s))
            .transpose()?,
        created_at: row.created_at,
    })
}

// ═══════════════════════════════════════════
// Reminder items
// ═══════════════════════════════════════════

/// Insert an item, returning the store-assigned monotonic id.
pub fn insert_reminder_item(
    conn: &Connection,
    item: &ReminderItem,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO reminder_items
         (reminder_id, channel, send_date, due_date, status, reminder_count, error)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            item.reminder_id.to_string(),
            item.channel.as_str(),
            item.send_date,
            item.due_date,
            item.status.as_str(),
            item.reminder_count,
            item.error,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_reminder_item(conn: &Connection, id: i64) -> Result<Option<ReminderItem>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, reminder_id, channel, send_date, due_date, status, reminder_count, error
         FROM reminder_items WHERE id = ?1",
        params![id],
        |row| {
            Ok(ItemRow {
                id: row.get(0)?,
                reminder_id: row.get(1)?,
                channel: row.get(2)?,
                send_date: row.get(3)?,
                due_date: row.get(4)?,
                status: row.get(5)?,
                reminder_count: row.get(6)?,
                error: row.get(7)?,
            })
        },
    );

    match result {
        Ok(row) => Ok(Some(item_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn set_item_status(
    conn: &Connection,
    id: i64,
    status: ItemStatus,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE reminder_items SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "reminder_items".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Record a dispatch failure against an item.
pub fn mark_item_error(conn: &Connection, id: i64, message: &str) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE reminder_items SET status = ?1, error = ?2 WHERE id = ?3",
        params![ItemStatus::Error.as_str(), message, id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "reminder_items".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn list_items_for_reminder(
    conn: &Connection,
    reminder_id: &Uuid,
) -> Result<Vec<ReminderItem>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, reminder_id, channel, send_date, due_date, status, reminder_count, error
         FROM reminder_items WHERE reminder_id = ?1 ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![reminder_id.to_string()], |row| {
        Ok(ItemRow {
            id: row.get(0)?,
            reminder_id: row.get(1)?,
            channel: row.get(2)?,
            send_date: row.get(3)?,
            due_date: row.get(4)?,
            status: row.get(5)?,
            reminder_count: row.get(6)?,
            error: row.get(7)?,
        })
    })?;

    let mut items = Vec::new();
    for row in rows {
        items.push(item_from_row(row?)?);
    }
    Ok(items)
}

pub(crate) struct ItemRow {
    pub id: i64,
    pub reminder_id: String,
    pub channel: String,
    pub send_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: String,
    pub reminder_count: i32,
    pub error: Option<String>,
}

pub(crate) fn item_from_row(row: ItemRow) -> Result<ReminderItem, DatabaseError> {
    Ok(ReminderItem {
        id: row.id,
        reminder_id: parse_uuid("reminder_items.reminder_id", &row.reminder_id)?,
        channel: Channel::from_str(&row.channel)?,
        send_date: row.send_date,
        due_date: row.due_date,
        status: ItemStatus::from_str(&row.status)?,
        reminder_count: row.reminder_count,
        error: row.error,
    })
}
