//! Interactive numbered menu.
//!
//! Reads choices line by line and dispatches them to the core. End of
//! input behaves like choosing "exit".

use crate::render;
use chrono::NaiveDate;
use cycle_core::{dispatch, parse_date, Command, CycleRecord, Error, Outcome, RecordStore, Result};
use std::io::{BufRead, Write};

const MENU: &str = "
========================================
CYCLE TRACKER - MAIN MENU
========================================
1. Current cycle day
2. Estimate next menstruation
3. Estimate fertile window
4. Register new cycle
5. Cycle history
0. Exit";

pub struct Menu<'a, R, W> {
    store: &'a RecordStore,
    today: NaiveDate,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(store: &'a RecordStore, today: NaiveDate, input: R, output: W) -> Self {
        Self {
            store,
            today,
            input,
            output,
        }
    }

    /// Run until the user exits or input ends
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{}", MENU)?;
            let Some(choice) = self.prompt("\nChoose an option: ")? else {
                return Ok(());
            };

            let command = match choice.as_str() {
                "1" => Command::CurrentDay,
                "2" => Command::NextStart,
                "3" => Command::FertileWindow,
                "5" => Command::History,
                "4" => {
                    if !self.register()? {
                        return Ok(());
                    }
                    continue;
                }
                "0" => {
                    writeln!(self.output, "\nGoodbye! Take care of your health.")?;
                    return Ok(());
                }
                _ => {
                    writeln!(self.output, "Invalid option. Try again.")?;
                    continue;
                }
            };

            let history = self.store.load();
            let text = match dispatch(command, &history, self.today) {
                Ok(response) => render::outcome(&response.outcome),
                Err(e) => render::error(&e),
            };
            writeln!(self.output, "{}", text)?;
        }
    }

    /// Prompt for a date until one is accepted. Returns false if input ended.
    fn register(&mut self) -> Result<bool> {
        loop {
            let Some(line) =
                self.prompt("Enter the first day of menstruation (DD/MM/YYYY): ")?
            else {
                return Ok(false);
            };

            let date = match parse_date(&line) {
                Ok(date) => date,
                Err(e) => {
                    writeln!(self.output, "{}", render::error(&e))?;
                    continue;
                }
            };

            match self.store.register(date, self.today) {
                Ok(_) => {
                    let registered = Outcome::Registered(CycleRecord::new(date));
                    writeln!(self.output, "{}", render::outcome(&registered))?;
                    return Ok(true);
                }
                Err(Error::Cycle(e)) => writeln!(self.output, "{}", render::error(&e))?,
                Err(e) => return Err(e),
            }
        }
    }

    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
