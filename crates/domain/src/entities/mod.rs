pub mod customers;
pub mod mailings;
pub mod messages;
