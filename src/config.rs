//! Delivery configuration.
//!
//! The practice's business calendar decides when a channel's items are
//! actually sent relative to the escalation's base send date: letters go
//! to the printer earlier than emails, exports whenever the batch runs.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::models::Channel;
use crate::pipeline::traits::SendSchedule;

/// Send-date schedule expressed as whole-day lead times per channel,
/// subtracted from the base date. Channels without an entry send on the
/// base date itself.
#[derive(Debug, Clone, Default)]
pub struct LeadTimeSchedule {
    lead_days: HashMap<Channel, i64>,
}

impl LeadTimeSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lead_days(mut self, channel: Channel, days: i64) -> Self {
        self.lead_days.insert(channel, days);
        self
    }
}

impl SendSchedule for LeadTimeSchedule {
    fn send_date(&self, base: NaiveDate, channel: Channel) -> NaiveDate {
        match self.lead_days.get(&channel) {
            Some(&days) => base - Duration::days(days),
            None => base,
        }
    }
}
