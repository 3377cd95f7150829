//! Query description for reminder notification items.
//!
//! Pure data: the event source renders it to SQL. Rows always come back
//! ordered by item id, the stable monotonic key seek pagination relies on.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{Channel, ItemStatus};

#[derive(Debug, Clone)]
pub struct ItemQuery {
    pub status: ItemStatus,
    pub channel: Option<Channel>,
    pub customer: Option<Uuid>,
    pub location: Option<Uuid>,
    /// Inclusive send-date window.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ItemQuery {
    /// Query for items in the given status, unconstrained otherwise.
    pub fn new(status: ItemStatus) -> Self {
        Self {
            status,
            channel: None,
            customer: None,
            location: None,
            from: None,
            to: None,
        }
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_customer(mut self, customer: Uuid) -> Self {
        self.customer = Some(customer);
        self
    }

    pub fn with_location(mut self, location: Uuid) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_send_window(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }
}
