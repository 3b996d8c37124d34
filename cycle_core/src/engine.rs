//! Cycle engine: validation and derived statistics.
//!
//! Every function here is pure. Callers pass the current history and the
//! current date; nothing reads the clock or touches the filesystem.
//!
//! ## Derived values
//!
//! - **Average cycle length**: floor of the mean gap between consecutive
//!   starts, needs at least two records
//! - **Cycle day**: days since the last start, 1-indexed
//! - **Next start**: last start + average cycle length
//! - **Fertile window**: days 10 to 17 after the last start

use crate::{CycleError, CycleHistory, CycleRecord, FertileWindow};
use chrono::{Duration, NaiveDate};

/// Cycle length assumed when fewer than two cycles are recorded
pub const DEFAULT_CYCLE_LENGTH: i64 = 28;

/// First fertile day, counted from the last start
pub const FERTILE_WINDOW_START_OFFSET: i64 = 10;

/// Last fertile day, counted from the last start
pub const FERTILE_WINDOW_END_OFFSET: i64 = 17;

fn days_after(date: NaiveDate, days: i64) -> Result<NaiveDate, CycleError> {
    date.checked_add_signed(Duration::days(days))
        .ok_or(CycleError::DateOutOfRange { date })
}

/// Validate a new cycle start and return the extended history.
///
/// This is the only way a history grows. The input history is left
/// untouched; persisting the result is up to the caller.
pub fn validate_and_append(
    history: &CycleHistory,
    candidate: NaiveDate,
    today: NaiveDate,
) -> Result<CycleHistory, CycleError> {
    if candidate > today {
        return Err(CycleError::FutureDate { date: candidate });
    }

    if let Some(last) = history.last() {
        if candidate <= last.date() {
            return Err(CycleError::NonMonotonic {
                date: candidate,
                last: last.date(),
            });
        }
    }

    let mut records = history.records.clone();
    records.push(CycleRecord::new(candidate));

    tracing::debug!(
        "Appended cycle start {} ({} records)",
        candidate,
        records.len()
    );
    Ok(CycleHistory { records })
}

/// Day gaps between consecutive starts, oldest first
pub fn cycle_lengths(history: &CycleHistory) -> Vec<i64> {
    history
        .records()
        .windows(2)
        .map(|w| (w[1].date() - w[0].date()).num_days())
        .collect()
}

/// Mean cycle length in whole days (floor), or `None` with fewer than two records
pub fn average_cycle_length(history: &CycleHistory) -> Option<i64> {
    let lengths = cycle_lengths(history);
    if lengths.is_empty() {
        return None;
    }

    let total: i64 = lengths.iter().sum();
    Some(total.div_euclid(lengths.len() as i64))
}

/// Current day of the running cycle, starting at 1 on the day of the last start
pub fn current_cycle_day(history: &CycleHistory, today: NaiveDate) -> Result<i64, CycleError> {
    let last = history.last().ok_or(CycleError::EmptyHistory)?;

    let day = (today - last.date()).num_days() + 1;
    if day <= 0 {
        return Err(CycleError::FutureRecord { last: last.date() });
    }
    Ok(day)
}

/// Predicted start of the next cycle
pub fn predict_next_start(history: &CycleHistory) -> Result<NaiveDate, CycleError> {
    let average = average_cycle_length(history).ok_or(CycleError::InsufficientHistory {
        recorded: history.len(),
    })?;
    let last = history.last().ok_or(CycleError::EmptyHistory)?;

    days_after(last.date(), average)
}

/// Estimated fertile window of the current cycle.
///
/// The window sits at fixed offsets from the last start. The personal
/// average is reported in `reference_cycle_length` but does not shift it.
pub fn fertile_window(history: &CycleHistory) -> Result<FertileWindow, CycleError> {
    let last = history.last().ok_or(CycleError::EmptyHistory)?;
    let reference_cycle_length = average_cycle_length(history).unwrap_or(DEFAULT_CYCLE_LENGTH);

    Ok(FertileWindow {
        start: days_after(last.date(), FERTILE_WINDOW_START_OFFSET)?,
        end: days_after(last.date(), FERTILE_WINDOW_END_OFFSET)?,
        reference_cycle_length,
    })
}

/// Records ordered newest first
pub fn recent_first(history: &CycleHistory) -> Vec<CycleRecord> {
    history.iter().rev().copied().collect()
}
