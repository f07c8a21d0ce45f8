use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageStatus {
    Delivered,
    #[default]
    Undelivered,
}

impl Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message_status = match self {
            MessageStatus::Delivered => "DELIVERED",
            MessageStatus::Undelivered => "UNDELIVERED",
        };
        write!(f, "{}", message_status)
    }
}

impl TryFrom<&str> for MessageStatus {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "DELIVERED" => Ok(MessageStatus::Delivered),
            "UNDELIVERED" => Ok(MessageStatus::Undelivered),
            other => Err(anyhow::anyhow!("unknown message status: {other}")),
        }
    }
}
