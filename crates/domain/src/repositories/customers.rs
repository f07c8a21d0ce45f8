use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::entities::customers::CustomerEntity;

#[async_trait]
#[automock]
pub trait CustomerRepository {
    async fn list_by_filter(&self, code: i32) -> Result<Vec<CustomerEntity>>;
}
