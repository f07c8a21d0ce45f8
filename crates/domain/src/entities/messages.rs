use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{schema::messages, value_objects::enums::message_statuses::MessageStatus};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = messages)]
pub struct MessageEntity {
    pub id: Uuid,
    pub sending_date: DateTime<Utc>,
    pub status: String,
    pub mailing_id: Uuid,
    pub customer_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = messages)]
pub struct InsertMessageEntity {
    pub id: Uuid,
    pub sending_date: DateTime<Utc>,
    pub status: String,
    pub mailing_id: Uuid,
    pub customer_id: Uuid,
}

impl InsertMessageEntity {
    pub fn new(
        mailing_id: Uuid,
        customer_id: Uuid,
        sending_date: DateTime<Utc>,
        status: MessageStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sending_date,
            status: status.to_string(),
            mailing_id,
            customer_id,
        }
    }
}
