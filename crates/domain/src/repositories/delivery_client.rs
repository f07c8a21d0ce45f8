use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::value_objects::delivery::{DeliveryRequest, DeliveryResponse};

#[async_trait]
#[automock]
pub trait DeliveryClient {
    /// Returns whatever status the transport answered with; an `Err` means
    /// the request never produced a response (timeout, connection error).
    async fn send(&self, request: DeliveryRequest) -> Result<DeliveryResponse>;
}
