// Library for the binary and for tests

pub mod alert_log;
pub mod collector;
pub mod config;
pub mod error;
pub mod models;
pub mod news;
pub mod publisher;
pub mod thresholds;
pub mod worker;
