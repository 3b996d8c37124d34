//! Text rendering of command outcomes and engine errors.

use cycle_core::{format_date, CycleError, Outcome, DATE_FORMAT_HINT};

pub fn outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::CycleDay(day) => format!("You are on day {} of your cycle.", day),
        Outcome::NextStart(date) => {
            format!("Next menstruation expected on {}.", format_date(*date))
        }
        Outcome::FertileWindow(window) => format!(
            "Estimated fertile window:\n  • Start: {}\n  • End:   {}",
            format_date(window.start),
            format_date(window.end)
        ),
        Outcome::Registered(record) => format!("✓ Cycle registered: {}", record),
        Outcome::History(records) => {
            let mut text = String::from("Recorded cycles (most recent first):");
            for (i, record) in records.iter().enumerate() {
                text.push_str(&format!("\n{}. {}", i + 1, record));
            }
            text
        }
    }
}

pub fn error(err: &CycleError) -> String {
    match err {
        CycleError::Parse { .. } => format!("Invalid format. Use {}.", DATE_FORMAT_HINT),
        CycleError::FutureDate { .. } => "Error: date is in the future. Enter a valid date.".into(),
        CycleError::NonMonotonic { last, .. } => format!(
            "Error: date must be after the last recorded cycle ({}).",
            format_date(*last)
        ),
        CycleError::EmptyHistory => "No cycles recorded.".into(),
        CycleError::InsufficientHistory { .. } => {
            "At least two cycles are needed for an estimate.".into()
        }
        CycleError::FutureRecord { .. } => "Error: the last recorded cycle is in the future.".into(),
        CycleError::DateOutOfRange { .. } => {
            "Error: the estimate falls outside the supported calendar range.".into()
        }
    }
}
