pub mod mailing_dispatch;
