//! Command dispatch for front ends.
//!
//! Maps a user command, the current history and today's date to an
//! outcome. Only `Register` produces an updated history, which the caller
//! must persist.

use crate::{engine, CycleError, CycleHistory, CycleRecord, FertileWindow};
use chrono::NaiveDate;

/// An action a user can request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    CurrentDay,
    NextStart,
    FertileWindow,
    Register(NaiveDate),
    History,
}

/// Successful result of a command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    CycleDay(i64),
    NextStart(NaiveDate),
    FertileWindow(FertileWindow),
    Registered(CycleRecord),
    /// Records newest first
    History(Vec<CycleRecord>),
}

/// Outcome plus the history to persist, if it changed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub outcome: Outcome,
    pub updated: Option<CycleHistory>,
}

impl Response {
    fn read_only(outcome: Outcome) -> Self {
        Self {
            outcome,
            updated: None,
        }
    }
}

/// Run one command against a history snapshot
pub fn dispatch(
    command: Command,
    history: &CycleHistory,
    today: NaiveDate,
) -> Result<Response, CycleError> {
    tracing::debug!("Dispatching {:?} over {} records", command, history.len());

    let response = match command {
        Command::CurrentDay => {
            Response::read_only(Outcome::CycleDay(engine::current_cycle_day(history, today)?))
        }
        Command::NextStart => {
            Response::read_only(Outcome::NextStart(engine::predict_next_start(history)?))
        }
        Command::FertileWindow => {
            Response::read_only(Outcome::FertileWindow(engine::fertile_window(history)?))
        }
        Command::History => {
            if history.is_empty() {
                return Err(CycleError::EmptyHistory);
            }
            Response::read_only(Outcome::History(engine::recent_first(history)))
        }
        Command::Register(date) => {
            let updated = engine::validate_and_append(history, date, today)?;
            Response {
                outcome: Outcome::Registered(CycleRecord::new(date)),
                updated: Some(updated),
            }
        }
    };

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_read_commands_do_not_update() {
        let today = date(2024, 2, 5);
        let history = dispatch(Command::Register(date(2024, 1, 1)), &CycleHistory::new(), today)
            .unwrap()
            .updated
            .unwrap();

        for command in [Command::CurrentDay, Command::FertileWindow, Command::History] {
            let response = dispatch(command, &history, today).unwrap();
            assert!(response.updated.is_none(), "{command:?}");
        }

        assert_eq!(
            dispatch(Command::CurrentDay, &history, today).unwrap().outcome,
            Outcome::CycleDay(36)
        );
    }

    #[test]
    fn test_register_returns_updated_history() {
        let today = date(2024, 2, 5);
        let response =
            dispatch(Command::Register(date(2024, 1, 1)), &CycleHistory::new(), today).unwrap();

        assert_eq!(
            response.outcome,
            Outcome::Registered(CycleRecord::new(date(2024, 1, 1)))
        );
        assert_eq!(response.updated.map(|h| h.len()), Some(1));
    }

    #[test]
    fn test_register_rejection_passes_through() {
        let err = dispatch(
            Command::Register(date(2024, 3, 1)),
            &CycleHistory::new(),
            date(2024, 2, 1),
        )
        .unwrap_err();
        assert_eq!(err, CycleError::FutureDate { date: date(2024, 3, 1) });
    }

    #[test]
    fn test_empty_history_errors() {
        let today = date(2024, 1, 1);
        let empty = CycleHistory::new();

        assert_eq!(
            dispatch(Command::CurrentDay, &empty, today),
            Err(CycleError::EmptyHistory)
        );
        assert_eq!(
            dispatch(Command::History, &empty, today),
            Err(CycleError::EmptyHistory)
        );
        assert_eq!(
            dispatch(Command::NextStart, &empty, today),
            Err(CycleError::InsufficientHistory { recorded: 0 })
        );
    }

    #[test]
    fn test_history_newest_first() {
        let today = date(2024, 3, 1);
        let mut history = CycleHistory::new();
        for d in [date(2024, 1, 1), date(2024, 1, 29)] {
            history = dispatch(Command::Register(d), &history, today)
                .unwrap()
                .updated
                .unwrap();
        }

        let response = dispatch(Command::History, &history, today).unwrap();
        assert_eq!(
            response.outcome,
            Outcome::History(vec![
                CycleRecord::new(date(2024, 1, 29)),
                CycleRecord::new(date(2024, 1, 1)),
            ])
        );
    }
}
