use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::messages::InsertMessageEntity;

/// Append-only ledger of delivery outcomes.
#[async_trait]
#[automock]
pub trait MessageRepository {
    async fn append(&self, insert_message_entity: InsertMessageEntity) -> Result<Uuid>;
}
