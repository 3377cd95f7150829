//! Batches consecutive cursor events for the same recipient.
//!
//! The effective grouping for an event is the lattice meet of the reminder
//! type's declared directive and the practice's allowed policy for the
//! event's channel. List items never group, whatever the configuration
//! says. Grouping depends only on adjacency in the cursor's delivery
//! order; no separate sort is performed.

use std::collections::HashMap;

use uuid::Uuid;

use super::cursor::PagedCursor;
use super::error::ReminderError;
use super::traits::EventSource;
use crate::models::{Channel, GroupBy, ReminderEvent};

/// Practice-level grouping permissions: a global allowed policy plus
/// per-channel overrides (e.g. suppress SMS grouping while email groups).
#[derive(Debug, Clone)]
pub struct GroupingPolicy {
    allowed: GroupBy,
    channel_overrides: HashMap<Channel, GroupBy>,
}

impl GroupingPolicy {
    pub fn new(customer_allowed: bool, patient_allowed: bool) -> Self {
        Self {
            allowed: GroupBy::from_allowed(customer_allowed, patient_allowed),
            channel_overrides: HashMap::new(),
        }
    }

    /// Both customer and patient grouping permitted everywhere.
    pub fn permit_all() -> Self {
        Self::new(true, true)
    }

    pub fn with_channel_override(mut self, channel: Channel, allowed: GroupBy) -> Self {
        self.channel_overrides.insert(channel, allowed);
        self
    }

    fn allowed_for(&self, channel: Channel) -> GroupBy {
        match self.channel_overrides.get(&channel) {
            Some(&override_) => self.allowed.meet(override_),
            None => self.allowed,
        }
    }
}

/// An ordered run of events that share one recipient, with the resolved
/// grouping that produced it. Transient; never persisted.
#[derive(Debug, Clone)]
pub struct ReminderGroup {
    pub group_by: GroupBy,
    pub events: Vec<ReminderEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GroupKey {
    group_by: GroupBy,
    channel: Channel,
    recipient: Uuid,
}

pub struct GroupingIterator<'a, S: EventSource> {
    cursor: PagedCursor<'a, S>,
    policy: GroupingPolicy,
    /// Declared directive per reminder type, resolved once.
    declared: HashMap<Uuid, GroupBy>,
    /// Lookahead row that opened the next group. Survives `updated()`:
    /// the cursor's key already passed it, so it would otherwise be lost.
    pending: Option<ReminderEvent>,
}

impl<'a, S: EventSource> GroupingIterator<'a, S> {
    pub fn new(cursor: PagedCursor<'a, S>, policy: GroupingPolicy) -> Self {
        Self {
            cursor,
            policy,
            declared: HashMap::new(),
            pending: None,
        }
    }

    pub fn has_next(&mut self) -> Result<bool, ReminderError> {
        Ok(self.pending.is_some() || self.cursor.has_next()?)
    }

    /// The next maximal run of consecutive same-recipient events.
    pub fn next(&mut self) -> Result<ReminderGroup, ReminderError> {
        let first = match self.pending.take() {
            Some(event) => event,
            None => self.cursor.next()?,
        };
        let key = self.key(&first);
        let mut events = vec![first];

        if key.group_by != GroupBy::None {
            while self.cursor.has_next()? {
                let event = self.cursor.next()?;
                if self.key(&event) == key {
                    events.push(event);
                } else {
                    self.pending = Some(event);
                    break;
                }
            }
        }

        Ok(ReminderGroup {
            group_by: key.group_by,
            events,
        })
    }

    /// Forwarded to the underlying cursor. Call after mutating the status
    /// of every item in the group just returned.
    pub fn updated(&mut self) {
        self.cursor.updated();
    }

    fn key(&mut self, event: &ReminderEvent) -> GroupKey {
        let group_by = self.resolve(event);
        let recipient = match group_by {
            GroupBy::Patient => event.patient.id,
            GroupBy::Customer => event.customer.id,
            // Singleton groups; recipient never compared
            GroupBy::None | GroupBy::All => Uuid::nil(),
        };
        GroupKey {
            group_by,
            channel: event.item.channel,
            recipient,
        }
    }

    fn resolve(&mut self, event: &ReminderEvent) -> GroupBy {
        // Fixed business invariant: list items are handed to staff one at
        // a time, whatever the type requests.
        if event.item.channel == Channel::List {
            return GroupBy::None;
        }
        let declared = *self
            .declared
            .entry(event.reminder_type.id)
            .or_insert_with(|| event.reminder_type.declared_group_by());
        declared.meet(self.policy.allowed_for(event.item.channel))
    }
}
