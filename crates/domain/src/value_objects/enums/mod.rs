pub mod message_statuses;
