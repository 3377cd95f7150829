use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{Channel, ItemStatus, ReminderStatus};

/// A scheduled patient-care due event.
///
/// The due date is immutable once notification items exist for the current
/// escalation count; the escalation count only increases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub reminder_type_id: Uuid,
    pub due_date: NaiveDate,
    pub status: ReminderStatus,
    /// Zero-based escalation count: how many times this reminder has been
    /// re-notified.
    pub reminder_count: i32,
    pub product_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

/// One channel-specific notification artifact generated for a reminder's
/// current escalation level.
///
/// The integer id is assigned by the store in insertion order and serves as
/// the stable monotonic sort key for seek pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderItem {
    pub id: i64,
    pub reminder_id: Uuid,
    pub channel: Channel,
    pub send_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: ItemStatus,
    pub reminder_count: i32,
    pub error: Option<String>,
}

/// A product sold against a patient, referenced by product-linked reminders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
}

/// Product/reminder-type relationship carrying its own due-date period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductReminder {
    pub product_id: Uuid,
    pub reminder_type_id: Uuid,
    pub period: i32,
    pub period_units: Option<super::enums::DateUnits>,
}
