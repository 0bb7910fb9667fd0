//! Data models: parser configuration and the extraction record.

pub mod config;
pub mod record;
