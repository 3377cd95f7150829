//! Rule-driven generation of reminder items.
//!
//! For one reminder the processor decides between cancellation and a set of
//! channel items for its current escalation level. Channel selection walks
//! the level's rules: email/sms/print need a matching reminder-classified
//! contact and template coverage, export/list need neither. A reminder that
//! selects no channel at all falls back to a single list item so front-desk
//! staff see it instead of it vanishing.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;

use super::error::ReminderError;
use super::rules;
use super::traits::{ContactResolver, SendSchedule};
use crate::db::repository::{
    get_patient, get_reminder_template, get_reminder_type, insert_reminder_item,
    set_reminder_status,
};
use crate::models::{
    Channel, Contact, ItemStatus, Reminder, ReminderCount, ReminderItem, ReminderRule,
    ReminderStatus, ReminderTemplate, SendTo,
};

/// Outcome of processing one reminder.
#[derive(Debug)]
pub enum Disposition {
    /// The reminder should be cancelled; no items are generated.
    Cancel,
    /// Items to create, possibly none when the escalation is exhausted.
    Generate(Vec<ReminderItem>),
}

/// One reminder that failed inside a batch run.
#[derive(Debug)]
pub struct BatchFailure {
    pub reminder_id: Uuid,
    pub error: ReminderError,
}

/// Tally of a batch run. Failures are collected, never fatal to siblings.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub generated: usize,
    pub cancelled: usize,
    pub failures: Vec<BatchFailure>,
}

pub struct ReminderProcessor<'a> {
    contacts: &'a dyn ContactResolver,
    schedule: &'a dyn SendSchedule,
}

impl<'a> ReminderProcessor<'a> {
    pub fn new(contacts: &'a dyn ContactResolver, schedule: &'a dyn SendSchedule) -> Self {
        Self { contacts, schedule }
    }

    /// Decide what should happen to `reminder` as of `now`. Pure with
    /// respect to the store: nothing is written.
    pub fn process(
        &self,
        conn: &Connection,
        reminder: &Reminder,
        now: NaiveDate,
    ) -> Result<Disposition, ReminderError> {
        let patient = get_patient(conn, &reminder.patient_id)?
            .ok_or(ReminderError::PatientNotFound(reminder.patient_id))?;
        let reminder_type = get_reminder_type(conn, &reminder.reminder_type_id)?
            .ok_or(ReminderError::ReminderTypeNotFound(reminder.reminder_type_id))?;

        if rules::should_cancel(reminder, &reminder_type, &patient, now)? {
            return Ok(Disposition::Cancel);
        }

        let count = match reminder_type.reminder_count(reminder.reminder_count) {
            Some(count) => count,
            None => {
                let last = reminder_type.counts.iter().map(|c| c.index).max();
                return match last {
                    // Past the last configured level: the escalation ran out
                    Some(last) if reminder.reminder_count > last => {
                        Ok(Disposition::Generate(vec![]))
                    }
                    // No counts configured (or a gap): hand to staff
                    _ => Ok(Disposition::Generate(vec![self.build_item(
                        reminder,
                        self.schedule.send_date(reminder.due_date, Channel::List),
                        Channel::List,
                    )])),
                };
            }
        };

        let contacts = self.contacts.reminder_contacts(conn, &patient.customer_id)?;
        let template = match count.template_id {
            Some(id) => Some(
                get_reminder_template(conn, &id)?.ok_or(ReminderError::TemplateNotFound(id))?,
            ),
            None => None,
        };

        let mut channels: BTreeSet<Channel> = BTreeSet::new();
        for rule in &count.rules {
            channels.extend(evaluate_rule(rule, &contacts, template.as_ref()));
        }

        if channels.is_empty() {
            channels.insert(Channel::List);
        }

        let base = send_base(reminder.due_date, count)?;
        let items = channels
            .into_iter()
            .map(|channel| {
                self.build_item(reminder, self.schedule.send_date(base, channel), channel)
            })
            .collect();
        Ok(Disposition::Generate(items))
    }

    /// Process a slice of reminders, persisting the outcomes. A failing
    /// reminder is logged and collected; its siblings are unaffected.
    pub fn process_batch(
        &self,
        conn: &Connection,
        reminders: &[Reminder],
        now: NaiveDate,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for reminder in reminders {
            match self.persist_one(conn, reminder, now) {
                Ok(Disposition::Cancel) => outcome.cancelled += 1,
                Ok(Disposition::Generate(items)) => outcome.generated += items.len(),
                Err(error) => {
                    tracing::warn!(
                        reminder_id = %reminder.id,
                        error = %error,
                        "skipping reminder in batch run"
                    );
                    outcome.failures.push(BatchFailure {
                        reminder_id: reminder.id,
                        error,
                    });
                }
            }
        }
        tracing::debug!(
            generated = outcome.generated,
            cancelled = outcome.cancelled,
            failed = outcome.failures.len(),
            "batch run finished"
        );
        outcome
    }

    fn persist_one(
        &self,
        conn: &Connection,
        reminder: &Reminder,
        now: NaiveDate,
    ) -> Result<Disposition, ReminderError> {
        let disposition = self.process(conn, reminder, now)?;
        match &disposition {
            Disposition::Cancel => {
                set_reminder_status(conn, &reminder.id, ReminderStatus::Cancelled)?;
            }
            Disposition::Generate(items) => {
                for item in items {
                    insert_reminder_item(conn, item)?;
                }
            }
        }
        Ok(disposition)
    }

    fn build_item(&self, reminder: &Reminder, send_date: NaiveDate, channel: Channel) -> ReminderItem {
        ReminderItem {
            id: 0,
            reminder_id: reminder.id,
            channel,
            send_date,
            due_date: reminder.due_date,
            status: ItemStatus::Pending,
            reminder_count: reminder.reminder_count,
            error: None,
        }
    }
}

/// Base send date for an escalation level: the due date plus the level's
/// overdue offset. Absent units mean no offset is configured.
fn send_base(due_date: NaiveDate, count: &ReminderCount) -> Result<NaiveDate, ReminderError> {
    match count.overdue_units {
        Some(units) => rules::add_units(due_date, count.overdue_interval, units).ok_or(
            ReminderError::DateOverflow {
                base: due_date,
                amount: count.overdue_interval,
                units,
            },
        ),
        None => Ok(due_date),
    }
}

/// Channels fired by one rule against the customer's contacts and the
/// level's template.
fn evaluate_rule(
    rule: &ReminderRule,
    contacts: &[Contact],
    template: Option<&ReminderTemplate>,
) -> BTreeSet<Channel> {
    let has_contact = |channel: Channel| contacts.iter().any(|c| c.supports(channel));
    let qualifies = |channel: Channel| {
        has_contact(channel) && template.map(|t| t.covers(channel)).unwrap_or(false)
    };

    let mut indicated: Vec<Channel> = Vec::new();
    if rule.email {
        indicated.push(Channel::Email);
    }
    if rule.sms {
        indicated.push(Channel::Sms);
    }
    if rule.print {
        indicated.push(Channel::Print);
    }
    if rule.contact {
        // Meta-flag: whichever deliverable channels the customer can receive
        for &channel in &[Channel::Email, Channel::Sms, Channel::Print] {
            if qualifies(channel) && !indicated.contains(&channel) {
                indicated.push(channel);
            }
        }
    }

    let mut fired: BTreeSet<Channel> = BTreeSet::new();
    match rule.send_to {
        SendTo::All => {
            // Every indicated contact channel must qualify or the whole
            // rule, list/export flags included, is out
            if !indicated.iter().all(|&c| qualifies(c)) {
                return fired;
            }
            fired.extend(indicated);
        }
        SendTo::Any => {
            fired.extend(indicated.into_iter().filter(|&c| qualifies(c)));
        }
    }

    if rule.export {
        fired.insert(Channel::Export);
    }
    if rule.list {
        fired.insert(Channel::List);
    }
    fired
}
