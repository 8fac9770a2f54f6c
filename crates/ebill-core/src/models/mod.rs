//! Data models: bill records and configuration.

pub mod bill;
pub mod config;
