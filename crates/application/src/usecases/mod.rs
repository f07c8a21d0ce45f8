pub mod dispatch_mailing;
pub mod mailing_scheduler;
pub mod queue_version;
pub mod versioned_wait;
