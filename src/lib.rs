//! stockcast: a simulated stock forecasting pipeline.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. The [`domain::session::Session`]
//! drives the four pipeline stages through a [`ports::scheduler_port::SchedulerPort`]
//! and reports progress through a [`ports::event_port::EventPort`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
