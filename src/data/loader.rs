use super::{encoding, ColumnLayout, LoadedTable, RawRecord, Result, ValidationError};
use crate::types::ColumnRole;
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// How raw bytes are turned into rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOptions {
    pub layout: ColumnLayout,
    pub encodings: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            layout: ColumnLayout::default(),
            encodings: encoding::DEFAULT_ENCODINGS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

pub struct DataLoader;

impl DataLoader {
    pub fn load_path<P: AsRef<Path>>(path: P, options: &IngestOptions) -> Result<LoadedTable> {
        let bytes = fs::read(&path)?;
        Self::load_bytes(&bytes, options)
    }

    pub fn load_bytes(bytes: &[u8], options: &IngestOptions) -> Result<LoadedTable> {
        options.layout.validate()?;
        let (text, encoding) = encoding::decode(bytes, &options.encodings)?;
        let records = Self::parse_records(&text, &options.layout)?;

        info!(rows = records.len(), encoding, "loaded input table");
        Ok(LoadedTable { records, encoding })
    }

    fn parse_records(text: &str, layout: &ColumnLayout) -> Result<Vec<RawRecord>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        // Column names are replaced positionally; only the width of the header matters.
        let headers = rdr.headers()?;
        if headers.len() != layout.width() {
            return Err(ValidationError::ColumnCount {
                line: 1,
                expected: layout.width(),
                found: headers.len(),
            }
            .into());
        }

        let mut records = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let row = result?;
            let line = row.position().map_or(i as u64 + 2, |p| p.line());

            if i == 0 && layout.unit_row {
                debug!(line, "dropping unit row");
                continue;
            }

            if row.len() != layout.width() {
                return Err(ValidationError::ColumnCount {
                    line,
                    expected: layout.width(),
                    found: row.len(),
                }
                .into());
            }

            records.push(Self::parse_row(&row, layout, line)?);
        }

        Ok(records)
    }

    fn parse_row(row: &StringRecord, layout: &ColumnLayout, line: u64) -> Result<RawRecord> {
        let number = |role: ColumnRole| -> std::result::Result<f64, ValidationError> {
            let raw = field(row, layout, role);
            parse_number(raw).ok_or_else(|| ValidationError::InvalidNumber {
                line,
                column: role,
                value: raw.to_string(),
            })
        };

        let raw_date = field(row, layout, ColumnRole::Date);
        let date = parse_date(raw_date).ok_or_else(|| ValidationError::InvalidDate {
            line,
            column: ColumnRole::Date,
            value: raw_date.to_string(),
        })?;

        Ok(RawRecord {
            line,
            date,
            index_value: number(ColumnRole::IndexValue)?,
            night_futures: number(ColumnRole::NightFutures)?,
            day_futures: number(ColumnRole::DayFutures)?,
            day_spot: number(ColumnRole::DaySpot)?,
        })
    }
}

fn field<'a>(row: &'a StringRecord, layout: &ColumnLayout, role: ColumnRole) -> &'a str {
    layout
        .position(role)
        .and_then(|idx| row.get(idx))
        .unwrap_or("")
}

/// Parses a number that may carry thousands separators. Non-finite values are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}
