//! Error types for the cycle_core library.

use chrono::NaiveDate;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable failures of the cycle engine.
///
/// None of these are fatal: the caller turns them into a message and, where
/// the user can correct the input, prompts again.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
    /// Input did not match `DD/MM/YYYY`
    #[error("invalid date {input:?}, expected DD/MM/YYYY")]
    Parse { input: String },

    /// Candidate date is later than today
    #[error("date {} is in the future", .date.format("%d/%m/%Y"))]
    FutureDate { date: NaiveDate },

    /// Candidate date is not strictly after the last recorded start
    #[error(
        "date {} is not after the last recorded cycle ({})",
        .date.format("%d/%m/%Y"),
        .last.format("%d/%m/%Y")
    )]
    NonMonotonic { date: NaiveDate, last: NaiveDate },

    /// No cycles recorded yet
    #[error("no cycles recorded")]
    EmptyHistory,

    /// At least two cycles are needed for an estimate
    #[error("at least two cycles are needed for an estimate (have {recorded})")]
    InsufficientHistory { recorded: usize },

    /// An estimate would fall outside the supported calendar range
    #[error("estimate from {} is outside the supported date range", .date.format("%d/%m/%Y"))]
    DateOutOfRange { date: NaiveDate },

    /// The most recent record lies after today
    #[error("last recorded cycle ({}) is in the future", .last.format("%d/%m/%Y"))]
    FutureRecord { last: NaiveDate },
}

/// Core error type for cycle_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected by the cycle engine
    #[error(transparent)]
    Cycle(#[from] CycleError),
}
