use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::entities::mailings::MailingEntity;

#[async_trait]
#[automock]
pub trait MailingRepository {
    /// Mailings with `start_date >= since`, ordered by `start_date` ascending.
    async fn list_due(&self, since: DateTime<Utc>) -> Result<Vec<MailingEntity>>;

    async fn find_by_id(&self, mailing_id: Uuid) -> Result<Option<MailingEntity>>;
}
