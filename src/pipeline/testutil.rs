//! Shared fixtures for pipeline tests.

use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::{
    insert_contact, insert_customer, insert_patient, insert_reminder, insert_reminder_item,
    insert_reminder_type,
};
use crate::models::{
    Channel, Contact, ContactKind, Customer, DateUnits, GroupBy, ItemStatus, Patient, Reminder,
    ReminderItem, ReminderStatus, ReminderType,
};

/// Route test-run tracing through the capture writer. Safe to call from
/// every test; only the first call installs the subscriber.
pub(crate) fn trace_init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub(crate) struct Practice {
    pub customer: Customer,
    pub patient: Patient,
    pub reminder_type: ReminderType,
}

pub(crate) fn due_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2007, 1, 1).unwrap()
}

/// One customer with an email reminder contact, one patient, one plain
/// (ungrouped) reminder type.
pub(crate) fn seed_practice(conn: &Connection) -> Practice {
    let customer = Customer {
        id: Uuid::new_v4(),
        name: "Owner".into(),
        location_id: None,
        active: true,
    };
    insert_customer(conn, &customer).unwrap();

    insert_contact(
        conn,
        &Contact {
            id: Uuid::new_v4(),
            customer_id: customer.id,
            kind: ContactKind::Email,
            value: "owner@example.com".into(),
            sms_enabled: false,
            reminder_purpose: true,
            active: true,
        },
    )
    .unwrap();

    let patient = insert_patient_for(conn, &customer, "Rex");
    let reminder_type = insert_type(conn, None);

    Practice {
        customer,
        patient,
        reminder_type,
    }
}

pub(crate) fn insert_patient_for(conn: &Connection, customer: &Customer, name: &str) -> Patient {
    let patient = Patient {
        id: Uuid::new_v4(),
        customer_id: customer.id,
        name: name.into(),
        species: Some("canine".into()),
        deceased: false,
        active: true,
    };
    insert_patient(conn, &patient).unwrap();
    patient
}

pub(crate) fn insert_type(conn: &Connection, group_by: Option<GroupBy>) -> ReminderType {
    let reminder_type = ReminderType {
        id: Uuid::new_v4(),
        name: "Annual Vaccination".into(),
        default_interval: 1,
        default_units: Some(DateUnits::Years),
        cancel_interval: 0,
        cancel_units: None,
        sensitivity_interval: 0,
        sensitivity_units: None,
        group_by,
        interactive: false,
        counts: vec![],
    };
    insert_reminder_type(conn, &reminder_type).unwrap();
    reminder_type
}

/// New reminder with a single pending item on the given channel; returns
/// the item's sort key.
pub(crate) fn spawn_reminder(conn: &Connection, practice: &Practice, channel: Channel) -> i64 {
    spawn_item(conn, &practice.patient, &practice.reminder_type, channel)
}

pub(crate) fn spawn_item(
    conn: &Connection,
    patient: &Patient,
    reminder_type: &ReminderType,
    channel: Channel,
) -> i64 {
    let reminder = Reminder {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        reminder_type_id: reminder_type.id,
        due_date: due_date(),
        status: ReminderStatus::InProgress,
        reminder_count: 0,
        product_id: None,
        created_at: due_date().and_hms_opt(9, 0, 0).unwrap(),
    };
    insert_reminder(conn, &reminder).unwrap();

    insert_reminder_item(
        conn,
        &ReminderItem {
            id: 0,
            reminder_id: reminder.id,
            channel,
            send_date: due_date(),
            due_date: due_date(),
            status: ItemStatus::Pending,
            reminder_count: 0,
            error: None,
        },
    )
    .unwrap()
}
