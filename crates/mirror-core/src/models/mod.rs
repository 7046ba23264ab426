//! Data models: configuration and the normalized per-provider records.

pub mod config;
pub mod instagram;
pub mod reddit;
