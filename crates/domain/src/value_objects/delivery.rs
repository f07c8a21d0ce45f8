use std::time::Duration;

/// One message to one phone number, as handed to a [`DeliveryClient`].
///
/// `attempt_id` is the customer's position within the current dispatch pass;
/// the external API uses it as the message identifier.
///
/// [`DeliveryClient`]: crate::repositories::delivery_client::DeliveryClient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub attempt_id: u64,
    pub phone: i64,
    pub text: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResponse {
    pub status_code: u16,
    pub body: String,
}

impl DeliveryResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
