use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::mailings;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = mailings)]
pub struct MailingEntity {
    pub id: Uuid,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub message: String,
    pub filters: i32,
}

impl MailingEntity {
    /// True while `now` is still before the configured start.
    pub fn starts_after(&self, now: DateTime<Utc>) -> bool {
        self.start_date > now
    }

    /// Delivery attempts must not begin once this returns true.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_date
    }
}
