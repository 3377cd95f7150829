use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ContactKind;

/// The owner a reminder communication is addressed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    /// Practice location the customer is registered at, if any.
    pub location_id: Option<Uuid>,
    pub active: bool,
}

/// The animal a reminder is scheduled for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub species: Option<String>,
    pub deceased: bool,
    pub active: bool,
}

/// A customer contact point. A contact takes part in reminder delivery
/// only when it is active and classified for reminders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub kind: ContactKind,
    pub value: String,
    /// Phone contacts only: whether the number accepts SMS.
    pub sms_enabled: bool,
    pub reminder_purpose: bool,
    pub active: bool,
}

impl Contact {
    /// True when this contact can carry the given channel.
    pub fn supports(&self, channel: super::enums::Channel) -> bool {
        use super::enums::Channel;
        match channel {
            Channel::Email => self.kind == ContactKind::Email,
            Channel::Sms => self.kind == ContactKind::Phone && self.sms_enabled,
            Channel::Print => self.kind == ContactKind::Location,
            Channel::Export | Channel::List => false,
        }
    }
}
