use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{DateUnits, GroupBy, SendTo};

/// Configuration for a family of reminders: due-date and cancel-date
/// intervals, the due-soon sensitivity window, the declared grouping
/// directive, and one `ReminderCount` per escalation level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderType {
    pub id: Uuid,
    pub name: String,
    /// Added to a trigger date to compute the due date. Missing units
    /// default to years.
    pub default_interval: i32,
    pub default_units: Option<DateUnits>,
    /// Added to the due date to compute the cancel date. Absent units mean
    /// no cancel date is ever computed for this type.
    pub cancel_interval: i32,
    pub cancel_units: Option<DateUnits>,
    /// Half-width of the window either side of the due date within which a
    /// reminder reports `Due` rather than `NotDue`/`Overdue`. Defaults to
    /// zero when units are absent.
    pub sensitivity_interval: i32,
    pub sensitivity_units: Option<DateUnits>,
    /// Declared grouping directive. Only `Patient` and `Customer` are
    /// meaningful here; absent means the type never groups.
    pub group_by: Option<GroupBy>,
    pub interactive: bool,
    /// Ordered by `index`; index equals position for well-formed config.
    pub counts: Vec<ReminderCount>,
}

impl ReminderType {
    /// The count entry for the given escalation level, if configured.
    pub fn reminder_count(&self, index: i32) -> Option<&ReminderCount> {
        self.counts.iter().find(|c| c.index == index)
    }

    /// Declared grouping, with an absent directive reading as `None`.
    pub fn declared_group_by(&self) -> GroupBy {
        self.group_by.unwrap_or(GroupBy::None)
    }
}

/// One escalation level of a reminder type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderCount {
    pub reminder_type_id: Uuid,
    pub index: i32,
    /// Offset added to the reminder's due date to obtain the base send
    /// date for this escalation level.
    pub overdue_interval: i32,
    pub overdue_units: Option<DateUnits>,
    pub template_id: Option<Uuid>,
    /// Ordered by `sequence`.
    pub rules: Vec<ReminderRule>,
}

/// Channel-selection rule within a count. The boolean flags indicate which
/// channels the rule may fire; `send_to` governs how many of the
/// contact-based flags must qualify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderRule {
    pub sequence: i32,
    /// Meta-flag: fire whichever of email/sms/print has a matching
    /// reminder-classified contact, rather than a fixed channel.
    pub contact: bool,
    pub email: bool,
    pub sms: bool,
    pub print: bool,
    pub export: bool,
    pub list: bool,
    pub send_to: SendTo,
}

impl ReminderRule {
    pub fn new(sequence: i32) -> Self {
        Self {
            sequence,
            contact: false,
            email: false,
            sms: false,
            print: false,
            export: false,
            list: false,
            send_to: SendTo::Any,
        }
    }
}

/// Per-channel document template content for one reminder count. A channel
/// has a template iff the matching field is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderTemplate {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub sms: Option<String>,
    pub print: Option<String>,
}

impl ReminderTemplate {
    pub fn covers(&self, channel: super::enums::Channel) -> bool {
        use super::enums::Channel;
        match channel {
            Channel::Email => self.email.is_some(),
            Channel::Sms => self.sms.is_some(),
            Channel::Print => self.print.is_some(),
            Channel::Export | Channel::List => true,
        }
    }
}
