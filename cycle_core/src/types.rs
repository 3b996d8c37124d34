//! Core domain types for cycle tracking.
//!
//! - `CycleRecord`: one menstruation start date
//! - `CycleHistory`: the ascending, duplicate-free list of records
//! - `FertileWindow`: derived fertile-window estimate

use crate::CycleError;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// `chrono` format string for dates entered and stored as `DD/MM/YYYY`
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Human-readable form of [`DATE_FORMAT`]
pub const DATE_FORMAT_HINT: &str = "DD/MM/YYYY";

/// Parse a `DD/MM/YYYY` string into a calendar date
pub fn parse_date(input: &str) -> Result<NaiveDate, CycleError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| CycleError::Parse {
        input: input.trim().to_string(),
    })
}

/// Format a calendar date as `DD/MM/YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// ============================================================================
// Records
// ============================================================================

/// First day of menstruation for one cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleRecord(NaiveDate);

impl CycleRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Parse a record from `DD/MM/YYYY`
    pub fn parse(input: &str) -> Result<Self, CycleError> {
        parse_date(input).map(Self)
    }
}

impl From<NaiveDate> for CycleRecord {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CycleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl Serialize for CycleRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CycleRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// History
// ============================================================================

/// Every recorded cycle start, strictly ascending.
///
/// The ordering invariant holds for every value of this type: the only ways
/// to obtain one are [`CycleHistory::from_records`] (which rejects unordered
/// input), [`CycleHistory::normalized`] (which sorts it), deserialization
/// (which goes through `from_records`) and
/// [`crate::engine::validate_and_append`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CycleRecord>", into = "Vec<CycleRecord>")]
pub struct CycleHistory {
    pub(crate) records: Vec<CycleRecord>,
}

impl CycleHistory {
    /// Empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from records that are already strictly ascending.
    ///
    /// Out-of-order or duplicate records are rejected, never reordered.
    pub fn from_records(records: Vec<CycleRecord>) -> Result<Self, CycleError> {
        if let Some(pair) = records.windows(2).find(|w| w[1] <= w[0]) {
            return Err(CycleError::NonMonotonic {
                date: pair[1].date(),
                last: pair[0].date(),
            });
        }
        Ok(Self { records })
    }

    /// Build a history from records in any order, sorting them and dropping
    /// repeated dates. The flag is true when the input had to be changed.
    pub fn normalized(mut records: Vec<CycleRecord>) -> (Self, bool) {
        let ordered = records.windows(2).all(|w| w[0] < w[1]);
        if !ordered {
            records.sort();
            records.dedup();
        }
        (Self { records }, !ordered)
    }

    pub fn records(&self) -> &[CycleRecord] {
        &self.records
    }

    /// Most recent record, if any
    pub fn last(&self) -> Option<CycleRecord> {
        self.records.last().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CycleRecord> {
        self.records.iter()
    }
}

impl TryFrom<Vec<CycleRecord>> for CycleHistory {
    type Error = CycleError;

    fn try_from(records: Vec<CycleRecord>) -> Result<Self, Self::Error> {
        Self::from_records(records)
    }
}

impl From<CycleHistory> for Vec<CycleRecord> {
    fn from(history: CycleHistory) -> Self {
        history.records
    }
}

// ============================================================================
// Derived values
// ============================================================================

/// Estimated fertile window of the current cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FertileWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Average cycle length, or the 28-day default when fewer than two
    /// cycles are recorded. Reported only; the window uses fixed offsets.
    pub reference_cycle_length: i64,
}
