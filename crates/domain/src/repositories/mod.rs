pub mod customers;
pub mod delivery_client;
pub mod mailings;
pub mod messages;
