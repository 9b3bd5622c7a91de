//! Core domain types and logic.

pub mod instrument;
pub mod series;
pub mod generator;
pub mod forecast;
pub mod indicator;
pub mod pipeline;
pub mod schedule;
pub mod chart;
pub mod comparator;
pub mod holdout;
pub mod session;
pub mod config_validation;
pub mod error;
