//! Port traits at the seams between the domain and the outside world.

pub mod catalog_port;
pub mod config_port;
pub mod event_port;
pub mod metrics_port;
pub mod scheduler_port;
