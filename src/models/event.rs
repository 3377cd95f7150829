use serde::{Deserialize, Serialize};

use super::party::{Contact, Customer, Patient};
use super::reminder::{Reminder, ReminderItem};
use super::reminder_type::ReminderType;

/// Immutable snapshot of one notification item together with everything the
/// grouping and dispatch layers need about it. The unit the cursor yields
/// and the grouping iterator batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderEvent {
    pub item: ReminderItem,
    pub reminder: Reminder,
    pub reminder_type: ReminderType,
    pub patient: Patient,
    pub customer: Customer,
    /// First active reminder-classified contact matching the item's
    /// channel, when one exists.
    pub contact: Option<Contact>,
}

impl ReminderEvent {
    /// The item's stable monotonic sort key.
    pub fn sort_key(&self) -> i64 {
        self.item.id
    }
}
