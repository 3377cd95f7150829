use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::{parse_uuid, DatabaseError};
use crate::models::{Contact, ContactKind, Customer, Patient};

// ═══════════════════════════════════════════
// Customers
// ═══════════════════════════════════════════

pub fn insert_customer(conn: &Connection, customer: &Customer) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO customers (id, name, location_id, active) VALUES (?1, ?2, ?3, ?4)",
        params![
            customer.id.to_string(),
            customer.name,
            customer.location_id.map(|id| id.to_string()),
            customer.active,
        ],
    )?;
    Ok(())
}

pub fn get_customer(conn: &Connection, id: &Uuid) -> Result<Option<Customer>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, location_id, active FROM customers WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(CustomerRow {
                id: row.get(0)?,
                name: row.get(1)?,
                location_id: row.get(2)?,
                active: row.get(3)?,
            })
        },
    );

    match result {
        Ok(row) => Ok(Some(customer_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

struct CustomerRow {
    id: String,
    name: String,
    location_id: Option<String>,
    active: bool,
}

fn customer_from_row(row: CustomerRow) -> Result<Customer, DatabaseError> {
    Ok(Customer {
        id: parse_uuid("customers.id", &row.id)?,
        name: row.name,
        location_id: row
            .location_id
            .as_deref()
            .map(|s| parse_uuid("customers.location_id", s))
            .transpose()?,
        active: row.active,
    })
}

// ═══════════════════════════════════════════
// Patients
// ═══════════════════════════════════════════

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, customer_id, name, species, deceased, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            patient.id.to_string(),
            patient.customer_id.to_string(),
            patient.name,
            patient.species,
            patient.deceased,
            patient.active,
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, customer_id, name, species, deceased, active FROM patients WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(PatientRow {
                id: row.get(0)?,
                customer_id: row.get(1)?,
                name: row.get(2)?,
                species: row.get(3)?,
                deceased: row.get(4)?,
                active: row.get(5)?,
            })
        },
    );

    match result {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn set_patient_deceased(
    conn: &Connection,
    id: &Uuid,
    deceased: bool,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE patients SET deceased = ?1 WHERE id = ?2",
        params![deceased, id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "patients".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

struct PatientRow {
    id: String,
    customer_id: String,
    name: String,
    species: Option<String>,
    deceased: bool,
    active: bool,
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: parse_uuid("patients.id", &row.id)?,
        customer_id: parse_uuid("patients.customer_id", &row.customer_id)?,
        name: row.name,
        species: row.species,
        deceased: row.deceased,
        active: row.active,
    })
}

// ═══════════════════════════════════════════
// Contacts
// ═══════════════════════════════════════════

pub fn insert_contact(conn: &Connection, contact: &Contact) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO contacts (id, customer_id, kind, value, sms_enabled, reminder_purpose, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            contact.id.to_string(),
            contact.customer_id.to_string(),
            contact.kind.as_str(),
            contact.value,
            contact.sms_enabled,
            contact.reminder_purpose,
            contact.active,
        ],
    )?;
    Ok(())
}

/// Active contacts classified for reminder delivery, in insertion order.
pub fn list_reminder_contacts(
    conn: &Connection,
    customer_id: &Uuid,
) -> Result<Vec<Contact>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, customer_id, kind, value, sms_enabled, reminder_purpose, active
         FROM contacts
         WHERE customer_id = ?1 AND active = 1 AND reminder_purpose = 1
         ORDER BY rowid ASC",
    )?;

    let rows = stmt.query_map(params![customer_id.to_string()], |row| {
        Ok(ContactRow {
            id: row.get(0)?,
            customer_id: row.get(1)?,
            kind: row.get(2)?,
            value: row.get(3)?,
            sms_enabled: row.get(4)?,
            reminder_purpose: row.get(5)?,
            active: row.get(6)?,
        })
    })?;

    let mut contacts = Vec::new();
    for row in rows {
        contacts.push(contact_from_row(row?)?);
    }
    Ok(contacts)
}

pub(crate) struct ContactRow {
    pub id: String,
    pub customer_id: String,
    pub kind: String,
    pub value: String,
    pub sms_enabled: bool,
    pub reminder_purpose: bool,
    pub active: bool,
}

pub(crate) fn contact_from_row(row: ContactRow) -> Result<Contact, DatabaseError> {
    Ok(Contact {
        id: parse_uuid("contacts.id", &row.id)?,
        customer_id: parse_uuid("contacts.customer_id", &row.customer_id)?,
        kind: ContactKind::from_str(&row.kind)?,
        value: row.value,
        sms_enabled: row.sms_enabled,
        reminder_purpose: row.reminder_purpose,
        active: row.active,
    })
}
