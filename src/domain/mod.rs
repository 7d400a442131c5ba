//! Core domain types and logic.

pub mod band;
pub mod config_validation;
pub mod error;
pub mod metrics;
pub mod price_table;
pub mod replay;
pub mod schedule;
pub mod signal;
pub mod strategy;
