mod menu;
mod render;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cycle_core::*;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cyclelog")]
#[command(about = "Menstrual cycle tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Pin the current date (DD/MM/YYYY), for testing
    #[arg(long, global = true, hide = true, value_parser = parse_date_arg)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (default)
    Menu,

    /// Show the current cycle day
    Day,

    /// Estimate the next menstruation
    Next,

    /// Estimate the fertile window
    Fertile,

    /// Register the first day of a new cycle
    Register {
        /// Start date (DD/MM/YYYY)
        #[arg(value_parser = parse_date_arg)]
        date: NaiveDate,
    },

    /// List recorded cycles, most recent first
    History,

    /// Export the history as CSV
    Export {
        /// Destination file
        path: PathBuf,
    },
}

fn parse_date_arg(input: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(input).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    // Initialize logging
    cycle_core::logging::init();

    let cli = Cli::parse();

    // Determine history location
    let config = Config::load()?;
    let history_path = match &cli.data_dir {
        Some(dir) => config.history_path_in(dir),
        None => config.history_path(),
    };
    let store = RecordStore::new(history_path);
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    match cli.command {
        None | Some(Commands::Menu) => {
            let stdin = io::stdin();
            menu::Menu::new(&store, today, stdin.lock(), io::stdout()).run()
        }
        Some(Commands::Day) => cmd_show(&store, Command::CurrentDay, today),
        Some(Commands::Next) => cmd_show(&store, Command::NextStart, today),
        Some(Commands::Fertile) => cmd_show(&store, Command::FertileWindow, today),
        Some(Commands::History) => cmd_show(&store, Command::History, today),
        Some(Commands::Register { date }) => cmd_register(&store, date, today),
        Some(Commands::Export { path }) => cmd_export(&store, path),
    }
}

fn cmd_show(store: &RecordStore, command: Command, today: NaiveDate) -> Result<()> {
    let (history, status) = store.load_with_status();
    if let LoadStatus::Corrupted(reason) = status {
        tracing::debug!("Continuing with empty history: {}", reason);
    }

    // Missing data is informational, not a failure
    match dispatch(command, &history, today) {
        Ok(response) => println!("{}", render::outcome(&response.outcome)),
        Err(e) => println!("{}", render::error(&e)),
    }
    Ok(())
}

fn cmd_register(store: &RecordStore, date: NaiveDate, today: NaiveDate) -> Result<()> {
    match store.register(date, today) {
        Ok(_) => {
            println!(
                "{}",
                render::outcome(&Outcome::Registered(CycleRecord::new(date)))
            );
            Ok(())
        }
        Err(Error::Cycle(e)) => {
            eprintln!("{}", render::error(&e));
            Err(Error::Cycle(e))
        }
        Err(e) => Err(e),
    }
}

fn cmd_export(store: &RecordStore, path: PathBuf) -> Result<()> {
    let history = store.load();
    let count = write_csv(&history, &path)?;

    println!("✓ Exported {} cycles", count);
    println!("  CSV: {}", path.display());
    Ok(())
}
