use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::{parse_uuid, DatabaseError};
use crate::models::{
    DateUnits, GroupBy, Product, ProductReminder, ReminderCount, ReminderRule, ReminderTemplate,
    ReminderType, SendTo,
};

// ═══════════════════════════════════════════
// Templates
// ═══════════════════════════════════════════

pub fn insert_reminder_template(
    conn: &Connection,
    template: &ReminderTemplate,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO reminder_templates (id, name, email, sms, print)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            template.id.to_string(),
            template.name,
            template.email,
            template.sms,
            template.print,
        ],
    )?;
    Ok(())
}

pub fn get_reminder_template(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<ReminderTemplate>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, email, sms, print FROM reminder_templates WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        },
    );

    match result {
        Ok((id, name, email, sms, print)) => Ok(Some(ReminderTemplate {
            id: parse_uuid("reminder_templates.id", &id)?,
            name,
            email,
            sms,
            print,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ═══════════════════════════════════════════
// Reminder types (with counts and rules)
// ═══════════════════════════════════════════

/// Insert a reminder type together with its counts and rules.
pub fn insert_reminder_type(
    conn: &Connection,
    reminder_type: &ReminderType,
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO reminder_types
         (id, name, default_interval, default_units, cancel_interval, cancel_units,
          sensitivity_interval, sensitivity_units, group_by, interactive)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            reminder_type.id.to_string(),
            reminder_type.name,
            reminder_type.default_interval,
            reminder_type.default_units.map(|u| u.as_str()),
            reminder_type.cancel_interval,
            reminder_type.cancel_units.map(|u| u.as_str()),
            reminder_type.sensitivity_interval,
            reminder_type.sensitivity_units.map(|u| u.as_str()),
            reminder_type.group_by.map(|g| g.as_str()),
            reminder_type.interactive,
        ],
    )?;

    for count in &reminder_type.counts {
        tx.execute(
            "INSERT INTO reminder_counts
             (reminder_type_id, count_index, overdue_interval, overdue_units, template_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                reminder_type.id.to_string(),
                count.index,
                count.overdue_interval,
                count.overdue_units.map(|u| u.as_str()),
                count.template_id.map(|id| id.to_string()),
            ],
        )?;

        for rule in &count.rules {
            tx.execute(
                "INSERT INTO reminder_rules
                 (reminder_type_id, count_index, sequence, contact, email, sms, print, export, list, send_to)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    reminder_type.id.to_string(),
                    count.index,
                    rule.sequence,
                    rule.contact,
                    rule.email,
                    rule.sms,
                    rule.print,
                    rule.export,
                    rule.list,
                    rule.send_to.as_str(),
                ],
            )?;
        }
    }

    tx.commit()?;
    Ok(())
}

/// Load a reminder type with its counts and rules fully populated.
pub fn get_reminder_type(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<ReminderType>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, default_interval, default_units, cancel_interval, cancel_units,
                sensitivity_interval, sensitivity_units, group_by, interactive
         FROM reminder_types WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(TypeRow {
                id: row.get(0)?,
                name: row.get(1)?,
                default_interval: row.get(2)?,
                default_units: row.get(3)?,
                cancel_interval: row.get(4)?,
                cancel_units: row.get(5)?,
                sensitivity_interval: row.get(6)?,
                sensitivity_units: row.get(7)?,
                group_by: row.get(8)?,
                interactive: row.get(9)?,
            })
        },
    );

    let row = match result {
        Ok(row) => row,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut reminder_type = type_from_row(row)?;
    reminder_type.counts = load_counts(conn, id)?;
    Ok(Some(reminder_type))
}

fn load_counts(conn: &Connection, type_id: &Uuid) -> Result<Vec<ReminderCount>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT count_index, overdue_interval, overdue_units, template_id
         FROM reminder_counts WHERE reminder_type_id = ?1 ORDER BY count_index ASC",
    )?;

    let rows = stmt.query_map(params![type_id.to_string()], |row| {
        Ok(CountRow {
            index: row.get(0)?,
            overdue_interval: row.get(1)?,
            overdue_units: row.get(2)?,
            template_id: row.get(3)?,
        })
    })?;

    let mut counts = Vec::new();
    for row in rows {
        let row = row?;
        let rules = load_rules(conn, type_id, row.index)?;
        counts.push(ReminderCount {
            reminder_type_id: *type_id,
            index: row.index,
            overdue_interval: row.overdue_interval,
            overdue_units: parse_units("reminder_counts.overdue_units", row.overdue_units)?,
            template_id: row
                .template_id
                .as_deref()
                .map(|s| parse_uuid("reminder_counts.template_id", s))
                .transpose()?,
            rules,
        });
    }
    Ok(counts)
}

fn load_rules(
    conn: &Connection,
    type_id: &Uuid,
    count_index: i32,
) -> Result<Vec<ReminderRule>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT sequence, contact, email, sms, print, export, list, send_to
         FROM reminder_rules
         WHERE reminder_type_id = ?1 AND count_index = ?2
         ORDER BY sequence ASC",
    )?;

    let rows = stmt.query_map(params![type_id.to_string(), count_index], |row| {
        Ok((
            row.get::<_, i32>(0)?,
            row.get::<_, bool>(1)?,
            row.get::<_, bool>(2)?,
            row.get::<_, bool>(3)?,
            row.get::<_, bool>(4)?,
            row.get::<_, bool>(5)?,
            row.get::<_, bool>(6)?,
            row.get::<_, String>(7)?,
        ))
    })?;

    let mut rules = Vec::new();
    for row in rows {
        let (sequence, contact, email, sms, print, export, list, send_to) = row?;
        rules.push(ReminderRule {
            sequence,
            contact,
            email,
            sms,
            print,
            export,
            list,
            send_to: SendTo::from_str(&send_to)?,
        });
    }
    Ok(rules)
}

struct TypeRow {
    id: String,
    name: String,
    default_interval: i32,
    default_units: Option<String>,
    cancel_interval: i32,
    cancel_units: Option<String>,
    sensitivity_interval: i32,
    sensitivity_units: Option<String>,
    group_by: Option<String>,
    interactive: bool,
}

struct CountRow {
    index: i32,
    overdue_interval: i32,
    overdue_units: Option<String>,
    template_id: Option<String>,
}

fn type_from_row(row: TypeRow) -> Result<ReminderType, DatabaseError> {
    Ok(ReminderType {
        id: parse_uuid("reminder_types.id", &row.id)?,
        name: row.name,
        default_interval: row.default_interval,
        default_units: parse_units("reminder_types.default_units", row.default_units)?,
        cancel_interval: row.cancel_interval,
        cancel_units: parse_units("reminder_types.cancel_units", row.cancel_units)?,
        sensitivity_interval: row.sensitivity_interval,
        sensitivity_units: parse_units("reminder_types.sensitivity_units", row.sensitivity_units)?,
        group_by: row
            .group_by
            .as_deref()
            .map(GroupBy::from_str)
            .transpose()?,
        interactive: row.interactive,
        counts: Vec::new(),
    })
}

fn parse_units(
    _field: &str,
    value: Option<String>,
) -> Result<Option<DateUnits>, DatabaseError> {
    value.as_deref().map(DateUnits::from_str).transpose()
}

// ═══════════════════════════════════════════
// Products
// ═══════════════════════════════════════════

pub fn insert_product(conn: &Connection, product: &Product) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO products (id, name) VALUES (?1, ?2)",
        params![product.id.to_string(), product.name],
    )?;
    Ok(())
}

pub fn insert_product_reminder(
    conn: &Connection,
    link: &ProductReminder,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO product_reminders (product_id, reminder_type_id, period, period_units)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            link.product_id.to_string(),
            link.reminder_type_id.to_string(),
            link.period,
            link.period_units.map(|u| u.as_str()),
        ],
    )?;
    Ok(())
}

pub fn get_product_reminder(
    conn: &Connection,
    product_id: &Uuid,
    reminder_type_id: &Uuid,
) -> Result<Option<ProductReminder>, DatabaseError> {
    let result = conn.query_row(
        "SELECT period, period_units FROM product_reminders
         WHERE product_id = ?1 AND reminder_type_id = ?2",
        params![product_id.to_string(), reminder_type_id.to_string()],
        |row| Ok((row.get::<_, i32>(0)?, row.get::<_, Option<String>>(1)?)),
    );

    match result {
        Ok((period, units)) => Ok(Some(ProductReminder {
            product_id: *product_id,
            reminder_type_id: *reminder_type_id,
            period,
            period_units: parse_units("product_reminders.period_units", units)?,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
