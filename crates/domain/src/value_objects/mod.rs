pub mod delivery;
pub mod dispatch;
pub mod enums;
