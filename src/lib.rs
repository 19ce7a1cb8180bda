pub mod app;
pub mod clipboard;
pub mod clock;
pub mod config;
pub mod humanize;
pub mod ledger;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod options;
pub mod parsing;
pub mod remote;
pub mod store;
pub mod video;
