//! CSV export of the cycle history.
//!
//! One row per recorded cycle, oldest first. `length_days` is the gap to
//! the following start and stays empty for the cycle still running.

use crate::{engine, store::write_atomically, CycleHistory, Result};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    cycle: usize,
    start_date: String,
    length_days: Option<i64>,
}

/// Write the history to `path` as CSV, returning the number of rows written
pub fn write_csv(history: &CycleHistory, path: &Path) -> Result<usize> {
    let lengths = engine::cycle_lengths(history);
    let rows: Vec<CsvRow> = history
        .iter()
        .enumerate()
        .map(|(i, record)| CsvRow {
            cycle: i + 1,
            start_date: record.to_string(),
            length_days: lengths.get(i).copied(),
        })
        .collect();

    write_atomically(path, |writer| {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut *writer);
        csv_writer.write_record(["cycle", "start_date", "length_days"])?;
        for row in &rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    })?;

    tracing::info!("Exported {} cycles to {:?}", rows.len(), path);
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CycleRecord;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_export_rows_and_lengths() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cycles.csv");
        let history = CycleHistory::from_records(vec![
            CycleRecord::new(date(2024, 1, 1)),
            CycleRecord::new(date(2024, 1, 29)),
            CycleRecord::new(date(2024, 2, 27)),
        ])
        .unwrap();

        let count = write_csv(&history, &path).unwrap();
        assert_eq!(count, 3);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "cycle,start_date,length_days",
                "1,01/01/2024,28",
                "2,29/01/2024,29",
                "3,27/02/2024,",
            ]
        );
    }

    #[test]
    fn test_export_empty_history_writes_header() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cycles.csv");

        let count = write_csv(&CycleHistory::new(), &path).unwrap();
        assert_eq!(count, 0);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap().trim(),
            "cycle,start_date,length_days"
        );
    }
}
