pub mod cache;
pub mod encoding;
pub mod layout;
pub mod loader;
pub mod source;

use crate::types::{ColumnRole, Metric};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

pub use layout::ColumnLayout;

/// A row as read from the source file, before any derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub line: u64,
    pub date: NaiveDate,
    pub index_value: f64,
    pub night_futures: f64,
    pub day_futures: f64,
    pub day_spot: f64,
}

/// Output of the loader: parsed rows in file order plus the encoding that decoded them.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub records: Vec<RawRecord>,
    pub encoding: &'static str,
}

/// One trading day joined with the following trading day's values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub index_value: f64,
    pub night_futures: f64,
    pub day_futures: f64,
    pub day_spot: f64,
    pub next_index_value: f64,
    pub next_day_futures: f64,
    pub next_day_spot: f64,
    pub index_change_pct: f64,
}

impl DailyRecord {
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::NextDayFutures => self.next_day_futures,
            Metric::NextDaySpot => self.next_day_spot,
            Metric::IndexChangePct => self.index_change_pct,
        }
    }
}

/// Inclusive date window. Unbounded ends are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }
}

/// Immutable, date-sorted record set used for analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    records: Vec<DailyRecord>,
}

impl Dataset {
    pub(crate) fn new(records: Vec<DailyRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Records whose date falls inside `range`. Records are sorted, so this is a contiguous slice.
    pub fn window(&self, range: &DateRange) -> &[DailyRecord] {
        let lo = match range.start {
            Some(start) => self.records.partition_point(|r| r.date < start),
            None => 0,
        };
        let hi = match range.end {
            Some(end) => self.records.partition_point(|r| r.date <= end),
            None => self.records.len(),
        };
        if lo >= hi {
            &[]
        } else {
            &self.records[lo..hi]
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("line {line}, column {column}: cannot parse {value:?} as a number")]
    InvalidNumber {
        line: u64,
        column: ColumnRole,
        value: String,
    },
    #[error("line {line}, column {column}: cannot parse {value:?} as a date")]
    InvalidDate {
        line: u64,
        column: ColumnRole,
        value: String,
    },
    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("duplicate date {0}")]
    DuplicateDate(NaiveDate),
    #[error("invalid column layout: {0}")]
    InvalidLayout(String),
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("could not decode input with any of the encodings: {}", attempted.join(", "))]
    Encoding { attempted: Vec<String> },
    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fetch error: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("fetching {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("{url} exceeds the {limit}-byte fetch limit")]
    TooLarge { url: String, limit: u64 },
}

pub type Result<T> = std::result::Result<T, DataError>;
