#![forbid(unsafe_code)]

//! Core domain model and business logic for cyclelog.
//!
//! This crate provides:
//! - Domain types (cycle records, history, fertile window)
//! - Cycle engine (validation and derived statistics)
//! - Command dispatch for front ends
//! - Persistence (JSON history store, CSV export)
//! - Configuration and logging

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod engine;
pub mod command;
pub mod store;
pub mod export;

// Re-export commonly used types
pub use error::{CycleError, Error, Result};
pub use types::*;
pub use config::Config;
pub use command::{dispatch, Command, Outcome, Response};
pub use store::{LoadStatus, RecordStore};
pub use export::write_csv;
