//! Concrete adapter implementations for ports.

pub mod csv_catalog_adapter;
pub mod file_config_adapter;
#[cfg(feature = "json")]
pub mod json_event_adapter;
pub mod log_event_adapter;
pub mod realtime_scheduler;
pub mod sample_catalog;
pub mod virtual_scheduler;
