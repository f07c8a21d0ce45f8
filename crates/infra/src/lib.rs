pub mod delivery;
pub mod observability;
pub mod postgres;
